// ── Process-wide shell context ────────────────────────────────────────────────
//
// A `Host` bundles the state every window shares: the OS seam, the window
// class registry, and the theme capability.  Build one per UI thread, before
// the first window, and share it by `Rc`.  All mutation happens on that one
// thread, so plain `RefCell` is enough.

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::Result,
    platform::Platform,
    registry::ClassRegistry,
    theme::{Theme, ThemeEnvironment},
};

pub struct Host {
    platform: Box<dyn Platform>,
    classes: RefCell<ClassRegistry>,
    theme: Theme,
}

impl Host {
    pub fn new(
        platform: impl Platform + 'static,
        environment: impl ThemeEnvironment + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            platform: Box::new(platform),
            classes: RefCell::new(ClassRegistry::new()),
            theme: Theme::new(environment),
        })
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Windows currently holding a reference on the shared class.
    pub fn live_windows(&self) -> usize {
        self.classes.borrow().live()
    }

    pub fn class_registered(&self) -> bool {
        self.classes.borrow().is_registered()
    }

    pub(crate) fn acquire_class(&self) -> Result<()> {
        self.classes.borrow_mut().acquire(self.platform())
    }

    pub(crate) fn release_class(&self) {
        self.classes.borrow_mut().release(self.platform());
    }
}
