// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface that the rest of the codebase uses to talk
// to the OS windowing system.  No `unsafe` lives here; all Win32 FFI is
// confined to the `win32` sub-module and never leaks outward.

use std::num::NonZeroIsize;

use crate::{
    error::Result,
    geometry::{Point, Rect},
    window::Frame,
};

#[cfg(windows)]
pub mod win32;

// ── Handles ───────────────────────────────────────────────────────────────────

/// An opaque, non-null native window handle.
///
/// Casement never interprets the value; it only hands it back to the platform.
/// Child content handles come from the embedding collaborator and are not
/// owned by the window that hosts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(NonZeroIsize);

impl NativeHandle {
    /// Wrap a raw handle value.  Returns `None` for the null handle.
    pub fn from_raw(raw: isize) -> Option<Self> {
        NonZeroIsize::new(raw).map(Self)
    }

    pub fn as_raw(self) -> isize {
        self.0.get()
    }
}

/// Proof that the shared window class is registered (the class atom on Win32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassToken(pub u16);

// ── Creation request ──────────────────────────────────────────────────────────

/// Everything the platform needs to create one top-level window.
pub struct CreateRequest<'a> {
    pub title: &'a str,
    /// Outer window bounds in device pixels.
    pub bounds: Rect,
    /// The frame that will receive this window's messages.  The platform
    /// stores it in window-specific storage during the creation notification.
    pub owner: *const Frame,
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// A window message, decoded into the categories Casement routes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Earliest creation notification (`WM_NCCREATE`).  The OS-facing
    /// callback attaches the frame before routing it; the frame itself
    /// leaves it to the default handler.
    Create,
    /// The user asked to close the window.
    Close,
    /// The native window is being destroyed.
    Destroy,
    /// The window moved to a monitor with a different scale factor.
    DpiChanged { dpi: u32, suggested: Rect },
    /// A system setting changed; `setting` names it when the OS says which.
    SettingChange { setting: Option<String> },
    /// The DWM accent/colorization colour changed.
    ColorizationChanged,
    /// The client area was resized.
    Size { width: u32, height: u32 },
    /// The window was activated or deactivated.
    Activate { active: bool },
    /// Anything else; always forwarded to the default handler.
    Other,
}

/// Result of routing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The message was handled; return this value to the OS.
    Handled(isize),
    /// Let the platform's default window procedure handle it.
    Default,
}

// ── OS seam ───────────────────────────────────────────────────────────────────

/// The native windowing surface Casement consumes.
///
/// Every method is called on the single UI thread that owns the windows.
/// Calls such as `create_window` and `destroy_window` may synchronously
/// re-enter the window procedure before they return.
pub trait Platform {
    /// Register the class shared by every Casement window.
    fn register_class(&self) -> Result<ClassToken>;

    fn unregister_class(&self, token: ClassToken);

    /// DPI of the monitor nearest to `point` (the default monitor for a new
    /// window placed there).
    fn dpi_for_point(&self, point: Point) -> u32;

    /// Create a hidden top-level window.  Fails when the OS returns no handle.
    fn create_window(&self, request: &CreateRequest<'_>) -> Result<NativeHandle>;

    fn destroy_window(&self, handle: NativeHandle);

    /// Show in the normal (restored) state.
    fn show_window(&self, handle: NativeHandle);

    fn hide_window(&self, handle: NativeHandle);

    /// Client rectangle, relative to the window's client origin.
    fn client_area(&self, handle: NativeHandle) -> Rect;

    fn set_parent(&self, child: NativeHandle, parent: NativeHandle);

    /// Move/resize `handle` to `bounds` (parent-relative for child windows).
    fn set_bounds(&self, handle: NativeHandle, bounds: Rect);

    fn focus(&self, handle: NativeHandle);

    /// Ask the message loop to terminate.
    fn post_quit(&self, exit_code: i32);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle_is_rejected() {
        assert_eq!(NativeHandle::from_raw(0), None);
    }

    #[test]
    fn handle_roundtrips_raw_value() {
        let h = NativeHandle::from_raw(0x1_0042).expect("non-null");
        assert_eq!(h.as_raw(), 0x1_0042);
    }
}
