// ── Per-window customisation hooks ────────────────────────────────────────────

use crate::platform::Message;

use super::Frame;

/// Hooks a concrete window type implements to customise its frame.
///
/// Every method has a pass-through default, so implementors override only the
/// parts they care about.  Hooks run on the UI thread from inside the window
/// procedure; a hook that re-enters the window (for example by destroying it)
/// will not see the nested messages.
pub trait WindowDelegate {
    /// Runs once the native window exists and has been themed.  Return
    /// `false` to abort creation; the window is destroyed again.
    fn on_create(&mut self, _frame: &Frame) -> bool {
        true
    }

    /// Runs on the destroy notification, before the frame releases its class
    /// reference.  `frame.handle()` is already `None`.
    fn on_destroy(&mut self, _frame: &Frame) {}

    /// First look at every routed message.  Return `Some(result)` to consume
    /// it; `None` continues with the frame's own routing.
    fn handle_message(&mut self, _frame: &Frame, _message: &Message) -> Option<isize> {
        None
    }
}

/// A delegate that customises nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl WindowDelegate for PassThrough {}
