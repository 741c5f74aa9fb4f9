// ── Native windows ────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • `Win32Platform`: the `Platform` seam over user32.
//   • `wnd_proc`: attach the `Frame` on WM_NCCREATE, decode, hand to
//     `window::dispatch`.
//   • Run the Win32 message loop.
//   • Expose a safe error-dialog helper for use by main().

use core::ffi::c_void;

use windows::{
    core::{w, HSTRING, PCWSTR},
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::HBRUSH,
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Input::KeyboardAndMouse::SetFocus,
            WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
                GetClientRect, GetMessageW, GetWindowLongPtrW, LoadCursorW, LoadIconW,
                MessageBoxW, PostQuitMessage, RegisterClassExW, SetParent, SetWindowLongPtrW,
                SetWindowPos, ShowWindow, TranslateMessage, UnregisterClassW, CREATESTRUCTW,
                CS_HREDRAW, CS_VREDRAW, GWLP_USERDATA, IDC_ARROW, IDI_APPLICATION, MB_ICONERROR,
                MB_OK, MSG, SWP_NOACTIVATE, SWP_NOZORDER, SW_HIDE, SW_SHOWNORMAL,
                WINDOW_EX_STYLE, WM_ACTIVATE, WM_CLOSE, WM_DESTROY, WM_DPICHANGED, WM_NCCREATE,
                WM_SETTINGCHANGE, WM_SIZE, WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
            },
        },
    },
};

use super::{dpi, from_hwnd, last_error, to_hwnd};
use crate::{
    error::{Result, ShellError},
    geometry::{Point, Rect},
    platform::{ClassToken, CreateRequest, Message, NativeHandle, Outcome, Platform},
    window::{self, Frame},
};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name of the class shared by every Casement window.
const CLASS_NAME: PCWSTR = w!("CasementWindow");

/// Sent to top-level windows when the DWM accent colour changes.
const WM_DWMCOLORIZATIONCOLORCHANGED: u32 = 0x0320;

/// Low word of WM_ACTIVATE's wparam when the window is being deactivated.
const WA_INACTIVE: u32 = 0;

// ── Platform ──────────────────────────────────────────────────────────────────

/// `Platform` backed by user32 for the current module.
pub struct Win32Platform {
    hinstance: HINSTANCE,
}

impl Win32Platform {
    pub fn new() -> Result<Self> {
        // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
        // always valid for the process lifetime and never fails in practice.
        let hmodule = unsafe { GetModuleHandleW(None) }?;

        // HINSTANCE and HMODULE carry the same value for the running module.
        Ok(Self {
            hinstance: HINSTANCE(hmodule.0),
        })
    }
}

impl Platform for Win32Platform {
    fn register_class(&self) -> Result<ClassToken> {
        // SAFETY: LoadIconW with IDI_APPLICATION always succeeds; it loads the
        // built-in application icon resource, which exists on all Windows versions.
        let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }?;

        // SAFETY: LoadCursorW with IDC_ARROW always succeeds; the arrow cursor is
        // a built-in resource guaranteed to exist on all Windows versions.
        let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }?;

        let wndclass = WNDCLASSEXW {
            // WNDCLASSEXW is ~80 bytes; the cast to u32 is always lossless.
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: self.hinstance,
            hIcon: icon,
            hCursor: cursor,
            // No background brush; the child content paints the client area.
            hbrBackground: HBRUSH::default(),
            lpszMenuName: PCWSTR::null(),
            lpszClassName: CLASS_NAME,
            hIconSm: icon,
        };

        // SAFETY: wndclass is fully initialised with valid handles;
        // CLASS_NAME is a valid null-terminated UTF-16 string literal.
        let atom = unsafe { RegisterClassExW(&wndclass) };
        if atom == 0 {
            return Err(last_error("RegisterClassExW"));
        }
        Ok(ClassToken(atom))
    }

    fn unregister_class(&self, _token: ClassToken) {
        // SAFETY: CLASS_NAME was registered against this hinstance and no
        // window of the class is alive any more (the registry count is zero).
        if let Err(e) = unsafe { UnregisterClassW(CLASS_NAME, Some(self.hinstance)) } {
            log::warn!("UnregisterClassW failed: {e}");
        }
    }

    fn dpi_for_point(&self, point: Point) -> u32 {
        dpi::for_point(point)
    }

    fn create_window(&self, request: &CreateRequest<'_>) -> Result<NativeHandle> {
        let bounds = request.bounds;
        let title = HSTRING::from(request.title);

        // SAFETY: CLASS_NAME is registered (the caller holds a registry
        // reference). `request.owner` points at a boxed Frame that outlives the
        // native window; wnd_proc stores it on WM_NCCREATE.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                CLASS_NAME,
                &title,
                WS_OVERLAPPEDWINDOW,
                bounds.left,
                bounds.top,
                bounds.width(),
                bounds.height(),
                None,
                None,
                Some(self.hinstance),
                Some(request.owner.cast::<c_void>()),
            )
        }
        .map_err(|e| ShellError::Win32 {
            function: "CreateWindowExW",
            code: e.code().0 as u32,
        })?;

        from_hwnd(hwnd).ok_or_else(|| last_error("CreateWindowExW"))
    }

    fn destroy_window(&self, handle: NativeHandle) {
        // SAFETY: handle is a window this thread created; DestroyWindow sends
        // WM_DESTROY synchronously through wnd_proc.
        if let Err(e) = unsafe { DestroyWindow(to_hwnd(handle)) } {
            log::warn!("DestroyWindow({handle:?}) failed: {e}");
        }
    }

    fn show_window(&self, handle: NativeHandle) {
        // SAFETY: handle is a live window owned by this thread. The return
        // value is the previous visibility state, not an error.
        let _ = unsafe { ShowWindow(to_hwnd(handle), SW_SHOWNORMAL) };
    }

    fn hide_window(&self, handle: NativeHandle) {
        // SAFETY: as for show_window.
        let _ = unsafe { ShowWindow(to_hwnd(handle), SW_HIDE) };
    }

    fn client_area(&self, handle: NativeHandle) -> Rect {
        let mut rc = RECT::default();
        // SAFETY: handle is a live window; rc is a valid out-pointer.
        match unsafe { GetClientRect(to_hwnd(handle), &mut rc) } {
            Ok(()) => Rect::new(rc.left, rc.top, rc.right, rc.bottom),
            Err(e) => {
                log::warn!("GetClientRect({handle:?}) failed: {e}");
                Rect::default()
            }
        }
    }

    fn set_parent(&self, child: NativeHandle, parent: NativeHandle) {
        // SAFETY: both handles are live windows; the child's lifetime is the
        // embedder's responsibility.
        if let Err(e) = unsafe { SetParent(to_hwnd(child), Some(to_hwnd(parent))) } {
            log::warn!("SetParent({child:?}) failed: {e}");
        }
    }

    fn set_bounds(&self, handle: NativeHandle, bounds: Rect) {
        // SAFETY: handle is a live window; no z-order or activation change.
        let moved = unsafe {
            SetWindowPos(
                to_hwnd(handle),
                None,
                bounds.left,
                bounds.top,
                bounds.width(),
                bounds.height(),
                SWP_NOZORDER | SWP_NOACTIVATE,
            )
        };
        if let Err(e) = moved {
            log::warn!("SetWindowPos({handle:?}) failed: {e}");
        }
    }

    fn focus(&self, handle: NativeHandle) {
        // SAFETY: handle is a live window attached to this thread's input
        // queue. The previous focus window is not needed.
        let _ = unsafe { SetFocus(Some(to_hwnd(handle))) };
    }

    fn post_quit(&self, exit_code: i32) {
        // SAFETY: PostQuitMessage only posts WM_QUIT to this thread's queue.
        unsafe { PostQuitMessage(exit_code) };
    }
}

// ── Message loop ──────────────────────────────────────────────────────────────

/// Pump messages for this thread until WM_QUIT; returns its exit code.
pub fn run_message_loop() -> Result<i32> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; None retrieves messages for
        // all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => return Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved: exit the loop cleanly.
            0 => break,
            _ => {
                // SAFETY: msg was populated by a successful GetMessageW call.
                // TranslateMessage's and DispatchMessageW's results are unused.
                unsafe {
                    let _ = TranslateMessage(&msg);
                    let _ = DispatchMessageW(&msg);
                }
            }
        }
    }

    // WM_QUIT carries PostQuitMessage's exit code in wParam.
    Ok(msg.wParam.0 as i32)
}

/// Show a modal error dialog with the given message.
///
/// Used by `main()` when startup fails.
pub fn show_error_dialog(message: &str) {
    let text = HSTRING::from(message);

    // SAFETY: text and the title literal are valid null-terminated UTF-16
    // strings that outlive the call. No owner window.
    unsafe {
        let _ = MessageBoxW(None, &text, w!("Casement - Fatal Error"), MB_OK | MB_ICONERROR);
    }
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call.  GWLP_USERDATA holds either 0 or a pointer to the
// boxed `Frame` that created the window; the frame outlives the window.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        dpi::enable_non_client_scaling(hwnd);

        // SAFETY: for WM_NCCREATE lparam points at the CREATESTRUCTW built by
        // CreateWindowExW; lpCreateParams is the `owner` passed there.
        let owner = unsafe { (*(lparam.0 as *const CREATESTRUCTW)).lpCreateParams } as *const Frame;
        // SAFETY: hwnd is the window being created; storing a pointer-sized
        // value in its user data has no other effect.
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, owner as isize) };

        // SAFETY: owner is null or the live boxed Frame (see above).
        if let (Some(frame), Some(handle)) = (unsafe { owner.as_ref() }, from_hwnd(hwnd)) {
            frame.attach(handle);
        }
    }

    // SAFETY: user data is 0 or the attached Frame, which outlives hwnd.
    let frame = unsafe { (GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const Frame).as_ref() };
    // SAFETY: the parameters come straight from Windows for this msg.
    let message = unsafe { decode(msg, wparam, lparam) };

    let outcome = window::dispatch(frame, &message);

    if msg == WM_DESTROY {
        // SAFETY: hwnd is still valid during WM_DESTROY; later messages
        // (WM_NCDESTROY) must not reach the frame.
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };
    }

    match outcome {
        Outcome::Handled(result) => LRESULT(result),
        // SAFETY: hwnd and message parameters are valid, provided by Windows.
        Outcome::Default => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decode a raw message, reading through `lparam` where the message makes it
/// a pointer.
///
/// # Safety
///
/// `wparam`/`lparam` must be the parameters Windows delivered with `msg`.
unsafe fn decode(msg: u32, wparam: WPARAM, lparam: LPARAM) -> Message {
    match msg {
        WM_DPICHANGED => {
            // SAFETY: for WM_DPICHANGED lparam points at the suggested RECT.
            let rc = unsafe { *(lparam.0 as *const RECT) };
            Message::DpiChanged {
                dpi: hiword(wparam.0),
                suggested: Rect::new(rc.left, rc.top, rc.right, rc.bottom),
            }
        }
        WM_SETTINGCHANGE => {
            let setting = if lparam.0 == 0 {
                None
            } else {
                // SAFETY: a non-null WM_SETTINGCHANGE lparam is a
                // null-terminated UTF-16 section name.
                unsafe { PCWSTR(lparam.0 as *const u16).to_string() }.ok()
            };
            Message::SettingChange { setting }
        }
        _ => decode_plain(msg, wparam.0, lparam.0),
    }
}

/// Decode the messages whose parameters are plain values.
fn decode_plain(msg: u32, wparam: usize, lparam: isize) -> Message {
    match msg {
        WM_NCCREATE => Message::Create,
        WM_CLOSE => Message::Close,
        WM_DESTROY => Message::Destroy,
        WM_DWMCOLORIZATIONCOLORCHANGED => Message::ColorizationChanged,
        WM_SIZE => Message::Size {
            width: loword(lparam as usize),
            height: hiword(lparam as usize),
        },
        WM_ACTIVATE => Message::Activate {
            active: loword(wparam) != WA_INACTIVE,
        },
        _ => Message::Other,
    }
}

fn loword(v: usize) -> u32 {
    (v & 0xFFFF) as u32
}

fn hiword(v: usize) -> u32 {
    ((v >> 16) & 0xFFFF) as u32
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_unpacks_client_dimensions() {
        let lparam = (720 << 16) | 1280;
        assert_eq!(
            decode_plain(WM_SIZE, 0, lparam),
            Message::Size { width: 1280, height: 720 }
        );
    }

    #[test]
    fn activate_reads_low_word_only() {
        assert_eq!(
            decode_plain(WM_ACTIVATE, 0x0001_0000, 0),
            Message::Activate { active: false }
        );
        assert_eq!(decode_plain(WM_ACTIVATE, 2, 0), Message::Activate { active: true });
    }

    #[test]
    fn lifecycle_messages() {
        assert_eq!(decode_plain(WM_NCCREATE, 0, 0), Message::Create);
        assert_eq!(decode_plain(WM_CLOSE, 0, 0), Message::Close);
        assert_eq!(decode_plain(WM_DESTROY, 0, 0), Message::Destroy);
        assert_eq!(
            decode_plain(WM_DWMCOLORIZATIONCOLORCHANGED, 0, 0),
            Message::ColorizationChanged
        );
        assert_eq!(decode_plain(0x000F, 0, 0), Message::Other);
    }

    #[test]
    fn dpi_change_reads_suggested_rect() {
        let rc = RECT {
            left: 1,
            top: 2,
            right: 3,
            bottom: 4,
        };
        // SAFETY: lparam points at a live RECT as WM_DPICHANGED requires.
        let m = unsafe { decode(WM_DPICHANGED, WPARAM(144 << 16 | 144), LPARAM(&rc as *const RECT as isize)) };
        assert_eq!(
            m,
            Message::DpiChanged {
                dpi: 144,
                suggested: Rect::new(1, 2, 3, 4)
            }
        );
    }

    #[test]
    fn setting_change_decodes_section_name() {
        let name = HSTRING::from("ImmersiveColorSet");
        // SAFETY: lparam is a null-terminated UTF-16 string or null.
        let named = unsafe { decode(WM_SETTINGCHANGE, WPARAM(0), LPARAM(name.as_ptr() as isize)) };
        let unnamed = unsafe { decode(WM_SETTINGCHANGE, WPARAM(0), LPARAM(0)) };
        assert_eq!(
            named,
            Message::SettingChange {
                setting: Some("ImmersiveColorSet".to_owned())
            }
        );
        assert_eq!(unnamed, Message::SettingChange { setting: None });
    }
}
