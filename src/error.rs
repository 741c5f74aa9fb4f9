// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Casement return `error::Result<T>`.  Unsupported
// theming is never an error (it degrades to the light theme); only resource
// acquisition and configuration failures surface here.

use thiserror::Error;

/// Every error that Casement can produce.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// The window delegate's `on_create` hook refused the new window.
    #[error("window delegate rejected creation")]
    CreateRejected,

    /// A standard I/O error (config file read, …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The launch configuration file is not valid JSON for `ShellConfig`.
    #[error("invalid shell configuration: {0}")]
    Config(#[from] serde_json::Error),
}

// Convert a windows-crate error (HRESULT) directly into a ShellError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for ShellError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShellError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_error_formats_code_as_hex() {
        let e = ShellError::Win32 {
            function: "RegisterClassExW",
            code: 1410,
        };
        assert_eq!(e.to_string(), "RegisterClassExW failed (error 0x00000582)");
    }

    #[test]
    fn io_error_keeps_source() {
        let e = ShellError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().starts_with("I/O error"));
    }
}
