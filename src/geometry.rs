// ── Logical / device geometry ─────────────────────────────────────────────────
//
// Pure Rust; no Win32 imports.  Callers pass logical coordinates (96-DPI
// units); the window layer converts them to device pixels once, at creation.

use serde::{Deserialize, Serialize};

/// The DPI at which one logical unit equals one device pixel.
pub const BASE_DPI: u32 = 96;

/// Scale a pixel value defined at 96 DPI to `dpi`.
pub fn scale(px: i32, dpi: u32) -> i32 {
    (i64::from(px) * i64::from(dpi) / i64::from(BASE_DPI)) as i32
}

/// Top-left corner of a window, in logical units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Outer width and height of a window, in logical units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A rectangle in device pixels, edges exclusive on the right/bottom
/// (same convention as Win32 `RECT`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Convert a logical origin and size into a device-pixel rectangle.
    pub fn from_logical(origin: Point, size: Size, dpi: u32) -> Self {
        let left = scale(origin.x, dpi);
        let top = scale(origin.y, dpi);
        let width = scale(i32::try_from(size.width).unwrap_or(i32::MAX), dpi);
        let height = scale(i32::try_from(size.height).unwrap_or(i32::MAX), dpi);
        Self {
            left,
            top,
            right: left.saturating_add(width),
            bottom: top.saturating_add(height),
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_identity_at_base_dpi() {
        assert_eq!(scale(1280, BASE_DPI), 1280);
    }

    #[test]
    fn scale_at_150_percent() {
        assert_eq!(scale(1280, 144), 1920);
        assert_eq!(scale(10, 144), 15);
    }

    #[test]
    fn scale_truncates_fractions() {
        // 7 * 120 / 96 = 8.75
        assert_eq!(scale(7, 120), 8);
    }

    #[test]
    fn logical_rect_at_200_percent() {
        let r = Rect::from_logical(Point::new(10, 20), Size::new(640, 480), 192);
        assert_eq!(r, Rect::new(20, 40, 1300, 1000));
        assert_eq!(r.width(), 1280);
        assert_eq!(r.height(), 960);
    }

    #[test]
    fn default_rect_is_empty() {
        assert!(Rect::default().is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }
}
