use windows::Win32::{
    Foundation::{HWND, POINT},
    Graphics::Gdi::{MonitorFromPoint, MONITOR_DEFAULTTONEAREST},
    UI::HiDpi::{
        EnableNonClientDpiScaling, GetDpiForMonitor, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, MDT_EFFECTIVE_DPI,
    },
};

use crate::geometry::{Point, BASE_DPI};

/// Opt into Per-Monitor v2 DPI awareness.
/// MUST be called before any window is created on the calling thread.
pub fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    // Failure means awareness was already set (manifest or earlier call).
    if let Err(e) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        log::debug!("dpi: awareness context unchanged ({e})");
    }
}

/// Effective DPI of the monitor nearest to `point` (device coordinates).
/// Falls back to BASE_DPI (96) on failure.
pub(crate) fn for_point(point: Point) -> u32 {
    let pt = POINT {
        x: point.x,
        y: point.y,
    };
    // SAFETY: MonitorFromPoint with MONITOR_DEFAULTTONEAREST always returns a
    // valid monitor handle; it takes the point by value.
    let monitor = unsafe { MonitorFromPoint(pt, MONITOR_DEFAULTTONEAREST) };

    let (mut dpi_x, mut dpi_y) = (0u32, 0u32);
    // SAFETY: monitor is valid (see above); both out-pointers refer to live
    // stack locals for the duration of the call.
    match unsafe { GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y) } {
        Ok(()) if dpi_x != 0 => dpi_x,
        _ => BASE_DPI,
    }
}

/// Let Windows scale the non-client area (title bar, borders) of `hwnd`.
/// Only valid while handling WM_NCCREATE.
pub(crate) fn enable_non_client_scaling(hwnd: HWND) {
    // SAFETY: hwnd is the window currently receiving WM_NCCREATE.
    if let Err(e) = unsafe { EnableNonClientDpiScaling(hwnd) } {
        log::debug!("dpi: non-client scaling unavailable ({e})");
    }
}
