// ── Test doubles ──────────────────────────────────────────────────────────────
//
// Recording fakes for the OS seams.  Each fake is cheaply cloneable and shares
// its log, so a test can hand one clone to the code under test and inspect
// the other.

use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    rc::Rc,
};

use crate::{
    error::{Result, ShellError},
    geometry::{Point, Rect, BASE_DPI},
    platform::{ClassToken, CreateRequest, Message, NativeHandle, Platform},
    theme::{
        EntryPoint, EntryTable, ImmersiveTheming, OsVersion, PreferredAppMode, ThemeEnvironment,
        ThemeLibrary, ThemeProbe,
    },
    window::{self, Frame},
};

// ── Platform ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct PlatformState {
    pub(crate) register_calls: usize,
    pub(crate) unregister_calls: usize,
    pub(crate) fail_register: bool,
    pub(crate) fail_create: bool,
    pub(crate) dpi: u32,
    pub(crate) client: Rect,
    next_handle: isize,
    /// Frame behind each live fake window, as the user-data slot would hold it.
    owners: Vec<(NativeHandle, *const Frame)>,
    pub(crate) created: Vec<(String, Rect)>,
    pub(crate) destroyed: Vec<NativeHandle>,
    pub(crate) shown: Vec<NativeHandle>,
    pub(crate) hidden: Vec<NativeHandle>,
    pub(crate) parents: Vec<(NativeHandle, NativeHandle)>,
    pub(crate) bounds: Vec<(NativeHandle, Rect)>,
    pub(crate) focused: Vec<NativeHandle>,
    pub(crate) quits: Vec<i32>,
}

#[derive(Clone)]
pub(crate) struct FakePlatform(Rc<RefCell<PlatformState>>);

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self(Rc::new(RefCell::new(PlatformState {
            register_calls: 0,
            unregister_calls: 0,
            fail_register: false,
            fail_create: false,
            dpi: BASE_DPI,
            client: Rect::new(0, 0, 800, 600),
            next_handle: 0x100,
            owners: Vec::new(),
            created: Vec::new(),
            destroyed: Vec::new(),
            shown: Vec::new(),
            hidden: Vec::new(),
            parents: Vec::new(),
            bounds: Vec::new(),
            focused: Vec::new(),
            quits: Vec::new(),
        })))
    }

    pub(crate) fn state(&self) -> Ref<'_, PlatformState> {
        self.0.borrow()
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, PlatformState> {
        self.0.borrow_mut()
    }
}

impl Platform for FakePlatform {
    fn register_class(&self) -> Result<ClassToken> {
        let mut s = self.0.borrow_mut();
        if s.fail_register {
            return Err(ShellError::Win32 {
                function: "RegisterClassExW",
                code: 1410,
            });
        }
        s.register_calls += 1;
        Ok(ClassToken(0xC001))
    }

    fn unregister_class(&self, _token: ClassToken) {
        self.0.borrow_mut().unregister_calls += 1;
    }

    fn dpi_for_point(&self, _point: Point) -> u32 {
        self.0.borrow().dpi
    }

    fn create_window(&self, request: &CreateRequest<'_>) -> Result<NativeHandle> {
        let mut s = self.0.borrow_mut();
        if s.fail_create {
            return Err(ShellError::Win32 {
                function: "CreateWindowExW",
                code: 8,
            });
        }
        let raw = s.next_handle;
        s.next_handle += 0x10;
        s.created.push((request.title.to_owned(), request.bounds));
        let handle = NativeHandle::from_raw(raw).ok_or(ShellError::Win32 {
            function: "CreateWindowExW",
            code: 0,
        })?;
        s.owners.push((handle, request.owner));
        Ok(handle)
    }

    /// Delivers `Message::Destroy` to the owning frame before returning, the
    /// way `DestroyWindow` sends WM_DESTROY.
    #[allow(unsafe_code)]
    fn destroy_window(&self, handle: NativeHandle) {
        let owner = {
            let mut s = self.0.borrow_mut();
            s.destroyed.push(handle);
            let slot = s.owners.iter().position(|(h, _)| *h == handle);
            slot.map(|i| s.owners.remove(i).1)
        };
        // SAFETY: `owner` came from a `CreateRequest`, so it is the boxed Frame
        // of a live `Window`; `Window` destroys its native window before the
        // box is freed.
        let frame = owner.and_then(|p| unsafe { p.as_ref() });
        window::dispatch(frame, &Message::Destroy);
    }

    fn show_window(&self, handle: NativeHandle) {
        self.0.borrow_mut().shown.push(handle);
    }

    fn hide_window(&self, handle: NativeHandle) {
        self.0.borrow_mut().hidden.push(handle);
    }

    fn client_area(&self, _handle: NativeHandle) -> Rect {
        self.0.borrow().client
    }

    fn set_parent(&self, child: NativeHandle, parent: NativeHandle) {
        self.0.borrow_mut().parents.push((child, parent));
    }

    fn set_bounds(&self, handle: NativeHandle, bounds: Rect) {
        self.0.borrow_mut().bounds.push((handle, bounds));
    }

    fn focus(&self, handle: NativeHandle) {
        self.0.borrow_mut().focused.push(handle);
    }

    fn post_quit(&self, exit_code: i32) {
        self.0.borrow_mut().quits.push(exit_code);
    }
}

// ── Theming ───────────────────────────────────────────────────────────────────

/// One call into the undocumented entry points.  Queries are not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ThemeCall {
    SetPreferredAppMode(PreferredAppMode),
    RefreshColorPolicy,
    FlushMenuThemes,
    AllowDarkForWindow(NativeHandle, bool),
}

type CallLog = Rc<RefCell<Vec<ThemeCall>>>;

pub(crate) struct FakeProbe {
    version: Option<OsVersion>,
    library: bool,
    missing: Vec<u16>,
    prefers_dark: Rc<Cell<bool>>,
    calls: CallLog,
    version_queries: Cell<usize>,
    library_opens: Cell<usize>,
}

impl FakeProbe {
    /// Windows 10.0 at `build`, with every ordinal exported.
    pub(crate) fn windows(build: u32) -> Self {
        Self {
            version: Some(OsVersion::from_raw(10, 0, build)),
            library: true,
            missing: Vec::new(),
            prefers_dark: Rc::new(Cell::new(false)),
            calls: CallLog::default(),
            version_queries: Cell::new(0),
            library_opens: Cell::new(0),
        }
    }

    pub(crate) fn without_version_query() -> Self {
        Self {
            version: None,
            ..Self::windows(0)
        }
    }

    pub(crate) fn without_library(mut self) -> Self {
        self.library = false;
        self
    }

    pub(crate) fn missing(mut self, ordinal: u16) -> Self {
        self.missing.push(ordinal);
        self
    }

    pub(crate) fn prefers_dark(self, dark: bool) -> Self {
        self.prefers_dark.set(dark);
        self
    }

    pub(crate) fn set_prefers_dark(&self, dark: bool) {
        self.prefers_dark.set(dark);
    }

    pub(crate) fn calls(&self) -> Vec<ThemeCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn version_queries(&self) -> usize {
        self.version_queries.get()
    }

    pub(crate) fn library_opens(&self) -> usize {
        self.library_opens.get()
    }
}

impl ThemeProbe for FakeProbe {
    fn os_version(&self) -> Option<OsVersion> {
        self.version_queries.set(self.version_queries.get() + 1);
        self.version
    }

    fn open_library(&self) -> Option<Box<dyn ThemeLibrary>> {
        self.library_opens.set(self.library_opens.get() + 1);
        if !self.library {
            return None;
        }
        Some(Box::new(FakeLibrary {
            missing: self.missing.clone(),
            prefers_dark: Rc::clone(&self.prefers_dark),
            calls: Rc::clone(&self.calls),
        }))
    }
}

struct FakeLibrary {
    missing: Vec<u16>,
    prefers_dark: Rc<Cell<bool>>,
    calls: CallLog,
}

impl ThemeLibrary for FakeLibrary {
    fn resolve(&self, ordinal: u16) -> Option<EntryPoint> {
        if self.missing.contains(&ordinal) {
            None
        } else {
            EntryPoint::from_addr(usize::from(ordinal))
        }
    }

    fn bind(self: Box<Self>, _entries: EntryTable) -> Box<dyn ImmersiveTheming> {
        Box::new(FakeTheming {
            prefers_dark: self.prefers_dark,
            calls: self.calls,
        })
    }
}

struct FakeTheming {
    prefers_dark: Rc<Cell<bool>>,
    calls: CallLog,
}

impl ImmersiveTheming for FakeTheming {
    fn set_preferred_app_mode(&self, mode: PreferredAppMode) {
        self.calls.borrow_mut().push(ThemeCall::SetPreferredAppMode(mode));
    }

    fn flush_menu_themes(&self) {
        self.calls.borrow_mut().push(ThemeCall::FlushMenuThemes);
    }

    fn refresh_immersive_color_policy_state(&self) {
        self.calls.borrow_mut().push(ThemeCall::RefreshColorPolicy);
    }

    fn should_apps_use_dark_mode(&self) -> bool {
        self.prefers_dark.get()
    }

    fn allow_dark_mode_for_window(&self, handle: NativeHandle, allow: bool) {
        self.calls
            .borrow_mut()
            .push(ThemeCall::AllowDarkForWindow(handle, allow));
    }
}

#[derive(Clone)]
pub(crate) struct FakeEnvironment {
    high_contrast: Rc<Cell<bool>>,
    titlebar: Rc<RefCell<Vec<(NativeHandle, bool)>>>,
}

impl FakeEnvironment {
    pub(crate) fn new(high_contrast: bool) -> Self {
        Self {
            high_contrast: Rc::new(Cell::new(high_contrast)),
            titlebar: Rc::default(),
        }
    }

    pub(crate) fn set_high_contrast(&self, on: bool) {
        self.high_contrast.set(on);
    }

    pub(crate) fn titlebar_calls(&self) -> Vec<(NativeHandle, bool)> {
        self.titlebar.borrow().clone()
    }
}

impl ThemeEnvironment for FakeEnvironment {
    fn high_contrast_active(&self) -> bool {
        self.high_contrast.get()
    }

    fn set_immersive_dark_titlebar(&self, handle: NativeHandle, dark: bool) {
        self.titlebar.borrow_mut().push((handle, dark));
    }
}
