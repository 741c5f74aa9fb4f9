// ── Top-level window state machine ────────────────────────────────────────────
//
//   Unrealized ──create──▶ Created ──show──▶ Visible
//        ▲                    │   ◀──close──┘   │
//        └──(create failed)   └──destroy──▶ Destroyed ◀┘
//                                           │
//                                           └──create──▶ Created
//
// `Frame` holds the per-window state.  It lives in a `Box` owned by `Window`
// so its address never changes; the OS callback finds it through the
// window's user-data slot.  The OS re-enters the window procedure
// synchronously from inside `create`/`destroy`, so every field uses interior
// mutability and no borrow is held across a platform call.

use std::{
    cell::{Cell, RefCell},
    fmt,
    ops::Deref,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

use crate::{
    error::{Result, ShellError},
    geometry::{Point, Rect, Size},
    host::Host,
    platform::{CreateRequest, Message, NativeHandle, Outcome},
};

mod delegate;

pub use delegate::{PassThrough, WindowDelegate};

/// Where a frame is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed; no native window yet.
    Unrealized,
    /// Native window exists and is hidden.
    Created,
    /// Native window is shown.
    Visible,
    /// Native window has been destroyed.  `create` may start over.
    Destroyed,
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// The state and operations of one top-level window.
pub struct Frame {
    host: Rc<Host>,
    handle: Cell<Option<NativeHandle>>,
    /// Hosted content; owned by whoever embedded it.
    child_content: Cell<Option<NativeHandle>>,
    quit_on_close: Cell<bool>,
    /// Set between a successful class acquire and the matching release.
    class_held: Cell<bool>,
    /// Set while `create` tears down a window it is about to replace or
    /// reject; that teardown never ends the message loop.
    replacing: Cell<bool>,
    lifecycle: Cell<Lifecycle>,
    delegate: RefCell<Box<dyn WindowDelegate>>,
}

impl Frame {
    fn new(host: &Rc<Host>, delegate: Box<dyn WindowDelegate>) -> Self {
        Self {
            host: Rc::clone(host),
            handle: Cell::new(None),
            child_content: Cell::new(None),
            quit_on_close: Cell::new(false),
            class_held: Cell::new(false),
            replacing: Cell::new(false),
            lifecycle: Cell::new(Lifecycle::Unrealized),
            delegate: RefCell::new(delegate),
        }
    }

    /// Create the native window, hidden, on the monitor nearest `origin`.
    ///
    /// `origin` and `size` are logical units, scaled by that monitor's DPI.
    /// Any previous native window owned by this frame is destroyed first.
    pub fn create(&self, title: &str, origin: Point, size: Size) -> Result<()> {
        self.discard();

        let platform = self.host.platform();
        let dpi = platform.dpi_for_point(origin);
        let bounds = Rect::from_logical(origin, size, dpi);

        if let Err(e) = self.host.acquire_class() {
            log::warn!("window class unavailable: {e}");
            self.lifecycle.set(Lifecycle::Unrealized);
            return Err(e);
        }
        self.class_held.set(true);

        let request = CreateRequest {
            title,
            bounds,
            owner: self as *const Frame,
        };
        let handle = match platform.create_window(&request) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("native window creation failed: {e}");
                self.handle.set(None);
                self.release_class();
                self.lifecycle.set(Lifecycle::Unrealized);
                return Err(e);
            }
        };

        self.handle.set(Some(handle));
        self.lifecycle.set(Lifecycle::Created);
        log::debug!("window {handle:?} created at {bounds:?} ({dpi} dpi)");

        self.host.theme().enable_for_window(Some(handle));

        if !self.with_delegate(|d| d.on_create(self)).unwrap_or(true) {
            log::warn!("window {handle:?} rejected by its delegate");
            self.discard();
            return Err(ShellError::CreateRejected);
        }
        Ok(())
    }

    /// Show the window in its normal state.  `false` when there is no window.
    pub fn show(&self) -> bool {
        let Some(handle) = self.handle.get() else {
            return false;
        };
        self.host.platform().show_window(handle);
        self.lifecycle.set(Lifecycle::Visible);
        true
    }

    /// Host `content` as a child filling the client area and give it focus.
    ///
    /// A previously hosted child is forgotten but not destroyed.
    pub fn set_child_content(&self, content: NativeHandle) {
        let Some(handle) = self.handle.get() else {
            log::warn!("set_child_content({content:?}) without a native window");
            return;
        };
        self.child_content.set(Some(content));

        let platform = self.host.platform();
        platform.set_parent(content, handle);
        platform.set_bounds(content, platform.client_area(handle));
        platform.focus(content);
    }

    /// Destroy the native window, if any, and drop the class reference taken
    /// by `create`.  Safe to call repeatedly.
    pub fn destroy(&self) {
        if let Some(handle) = self.handle.take() {
            log::debug!("destroying window {handle:?}");
            self.host.platform().destroy_window(handle);
        }
        self.teardown();
    }

    /// `destroy` on behalf of `create`.
    fn discard(&self) {
        self.replacing.set(true);
        self.destroy();
        self.replacing.set(false);
    }

    pub fn handle(&self) -> Option<NativeHandle> {
        self.handle.get()
    }

    pub fn child_content(&self) -> Option<NativeHandle> {
        self.child_content.get()
    }

    /// Client rectangle; empty when there is no native window.
    pub fn client_area(&self) -> Rect {
        self.handle
            .get()
            .map_or_else(Rect::default, |h| self.host.platform().client_area(h))
    }

    /// Whether closing the window ends the message loop (`true`) or just
    /// hides it (`false`, the default).
    pub fn set_quit_on_close(&self, quit_on_close: bool) {
        self.quit_on_close.set(quit_on_close);
    }

    pub fn quit_on_close(&self) -> bool {
        self.quit_on_close.get()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    pub fn host(&self) -> &Rc<Host> {
        &self.host
    }

    /// Record the native handle as soon as the OS reports it, which is
    /// before `create_window` returns.
    pub(crate) fn attach(&self, handle: NativeHandle) {
        if self.handle.get().is_none() {
            self.handle.set(Some(handle));
        }
    }

    // ── Message routing ───────────────────────────────────────────────────────

    /// Route one message.  The delegate sees it first.
    pub fn route(&self, message: &Message) -> Outcome {
        if let Some(Some(result)) = self.with_delegate(|d| d.handle_message(self, message)) {
            return Outcome::Handled(result);
        }

        let platform = self.host.platform();
        let theme = self.host.theme();

        match message {
            Message::Close => {
                if self.quit_on_close.get() {
                    platform.post_quit(0);
                } else if let Some(handle) = self.handle.get() {
                    platform.hide_window(handle);
                    self.lifecycle.set(Lifecycle::Created);
                }
                Outcome::Handled(0)
            }

            Message::Destroy => {
                self.destroyed();
                Outcome::Handled(0)
            }

            Message::DpiChanged { suggested, .. } => {
                if let Some(handle) = self.handle.get() {
                    platform.set_bounds(handle, *suggested);
                }
                Outcome::Handled(0)
            }

            Message::SettingChange { setting } => {
                if theme.handle_theme_change(setting.as_deref()) {
                    theme.enable_for_window(self.handle.get());
                }
                Outcome::Handled(0)
            }

            Message::ColorizationChanged => {
                theme.enable_for_window(self.handle.get());
                Outcome::Handled(0)
            }

            Message::Size { .. } => {
                if let Some(child) = self.child_content.get() {
                    platform.set_bounds(child, self.client_area());
                }
                Outcome::Handled(0)
            }

            Message::Activate { active } => {
                if let (true, Some(child)) = (*active, self.child_content.get()) {
                    platform.focus(child);
                }
                Outcome::Handled(0)
            }

            Message::Create | Message::Other => Outcome::Default,
        }
    }

    /// The OS is destroying the window (either via `destroy` or from outside).
    fn destroyed(&self) {
        let realized = matches!(self.lifecycle.get(), Lifecycle::Created | Lifecycle::Visible);
        self.handle.set(None);
        self.with_delegate(|d| d.on_destroy(self));
        self.teardown();

        if realized && !self.replacing.get() && self.host.live_windows() == 0 {
            log::debug!("last window destroyed, ending message loop");
            self.host.platform().post_quit(0);
        }
    }

    fn teardown(&self) {
        self.release_class();
        if matches!(self.lifecycle.get(), Lifecycle::Created | Lifecycle::Visible) {
            self.lifecycle.set(Lifecycle::Destroyed);
        }
    }

    fn release_class(&self) {
        if self.class_held.replace(false) {
            self.host.release_class();
        }
    }

    /// Run `f` on the delegate unless it is already running further up the
    /// stack (a re-entrant message).
    fn with_delegate<R>(&self, f: impl FnOnce(&mut dyn WindowDelegate) -> R) -> Option<R> {
        let mut delegate = self.delegate.try_borrow_mut().ok()?;
        Some(f(&mut **delegate))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("handle", &self.handle.get())
            .field("child_content", &self.child_content.get())
            .field("quit_on_close", &self.quit_on_close.get())
            .field("lifecycle", &self.lifecycle.get())
            .finish_non_exhaustive()
    }
}

/// Entry point for the OS callback.
///
/// `frame` is `None` while the window has no associated frame yet (or any
/// more); such messages get default handling.  A panic while routing is
/// contained here and also falls back to default handling.
pub fn dispatch(frame: Option<&Frame>, message: &Message) -> Outcome {
    let Some(frame) = frame else {
        return Outcome::Default;
    };
    match panic::catch_unwind(AssertUnwindSafe(|| frame.route(message))) {
        Ok(outcome) => outcome,
        Err(_) => {
            log::error!("panic while routing {message:?}; falling back to default handling");
            Outcome::Default
        }
    }
}

// ── Window ────────────────────────────────────────────────────────────────────

/// Owner of a `Frame`.  Dropping it destroys the native window.
pub struct Window {
    frame: Box<Frame>,
}

impl Window {
    pub fn new(host: &Rc<Host>) -> Self {
        Self::with_delegate(host, Box::new(PassThrough))
    }

    pub fn with_delegate(host: &Rc<Host>, delegate: Box<dyn WindowDelegate>) -> Self {
        Self {
            frame: Box::new(Frame::new(host, delegate)),
        }
    }
}

impl Deref for Window {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.frame
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.frame.destroy();
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.frame.fmt(f)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
