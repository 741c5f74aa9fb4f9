// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden in the runner; all Win32 FFI lives in
// `casement::platform::win32`.
#![deny(unsafe_code)]
// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use casement::Result;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Startup failed before or during the message loop.
            log::error!("{e}");
            report(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Build the host, open the main window, and pump messages until it closes.
#[cfg(windows)]
fn run() -> Result<i32> {
    use casement::{
        platform::win32::{self, dpi, UxThemeProbe, Win32Platform, Win32ThemeEnvironment},
        Host, LaunchArgs, ShellConfig, Window,
    };

    // Startup benchmark harness, only compiled in debug builds.
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    dpi::init();

    let args = LaunchArgs::from_os_args(std::env::args_os().skip(1));
    if !args.forwarded.is_empty() {
        log::debug!("forwarding {} argument(s) to content", args.forwarded.len());
    }
    let config = ShellConfig::resolve(&args)?;

    let host = Host::new(Win32Platform::new()?, Win32ThemeEnvironment);
    host.theme().initialize(&UxThemeProbe);
    host.theme().enable_for_app();

    let window = Window::new(&host);
    window.set_quit_on_close(config.quit_on_close);
    window.create(&config.title, config.origin, config.size)?;
    window.show();

    #[cfg(debug_assertions)]
    log::debug!("window visible in {:.1} ms", t0.elapsed().as_secs_f64() * 1000.0);

    let code = win32::run_message_loop()?;
    log::info!("message loop exited ({code})");
    Ok(code)
}

#[cfg(not(windows))]
fn run() -> Result<i32> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "casement needs Windows to open a window",
    )
    .into())
}

/// The only reliable output path for a release GUI build.
#[cfg(windows)]
fn report(message: &str) {
    casement::platform::win32::show_error_dialog(message);
}

#[cfg(not(windows))]
fn report(message: &str) {
    eprintln!("casement: {message}");
}
