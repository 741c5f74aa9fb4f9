/// Casement build script.
///
/// The library (state machine, registry, theming logic) builds and tests on
/// any host; only the runner binary needs Windows.  Warn instead of failing so
/// `cargo test` keeps working on non-Windows development machines.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=casement's runner only works on Windows \
             (CARGO_CFG_TARGET_OS = {target_os:?}); the binary will exit at startup"
        );
    }

    println!("cargo:rerun-if-changed=build.rs");
}
