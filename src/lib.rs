// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block there MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! A DPI-aware Win32 top-level window shell.
//!
//! A [`Window`] hosts one embedded content surface as a child window, follows
//! the system light/dark theme (on builds that expose the undocumented
//! immersive theming entry points), and ends the message loop when the last
//! window goes away.  Everything above [`platform::Platform`] is plain safe
//! Rust and is unit-tested against recording fakes.

pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod platform;
pub mod registry;
pub mod theme;
pub mod window;

#[cfg(test)]
mod testing;

pub use config::{LaunchArgs, ShellConfig};
pub use error::{Result, ShellError};
pub use geometry::{Point, Rect, Size};
pub use host::Host;
pub use platform::{NativeHandle, Platform};
pub use theme::Theme;
pub use window::{dispatch, Frame, Lifecycle, PassThrough, Window, WindowDelegate};
