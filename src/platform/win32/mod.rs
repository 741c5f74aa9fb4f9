// ── Win32 platform implementation ─────────────────────────────────────────────
//
// The only module in the crate where `unsafe` code is permitted.  Every
// `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub mod dpi; // per-monitor DPI v2 helpers
pub mod theme; // uxtheme ordinals, DWM title bar, high contrast
pub mod window; // window class, WndProc, message loop

pub use theme::{UxThemeProbe, Win32ThemeEnvironment};
pub use window::{run_message_loop, show_error_dialog, Win32Platform};

use windows::Win32::Foundation::{GetLastError, HWND};

use crate::{error::ShellError, platform::NativeHandle};

// ── Handle conversion ─────────────────────────────────────────────────────────

fn to_hwnd(handle: NativeHandle) -> HWND {
    HWND(handle.as_raw() as *mut core::ffi::c_void)
}

fn from_hwnd(hwnd: HWND) -> Option<NativeHandle> {
    NativeHandle::from_raw(hwnd.0 as isize)
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `ShellError`.
///
/// Call immediately after a Win32 function that signals failure; `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> ShellError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    ShellError::Win32 {
        function,
        code: code.0,
    }
}
