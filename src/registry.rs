// ── Window class registry ─────────────────────────────────────────────────────
//
// One native window class is shared by every Casement window.  The class is
// registered when the first window is created and unregistered when the last
// one goes away.  Invariant: `token.is_some() == (live > 0)`.

use crate::{
    error::Result,
    platform::{ClassToken, Platform},
};

/// Refcounted registration state for the shared window class.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    token: Option<ClassToken>,
    live: usize,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one reference on the class, registering it if this is the first.
    ///
    /// On registration failure the counter is left unchanged.
    pub fn acquire(&mut self, platform: &dyn Platform) -> Result<()> {
        if self.token.is_none() {
            let token = platform.register_class()?;
            log::debug!("window class registered ({token:?})");
            self.token = Some(token);
        }
        self.live += 1;
        Ok(())
    }

    /// Drop one reference; the class is unregistered when none remain.
    /// Releasing with no outstanding references is a no-op.
    pub fn release(&mut self, platform: &dyn Platform) {
        if self.live == 0 {
            return;
        }
        self.live -= 1;
        if self.live == 0 {
            if let Some(token) = self.token.take() {
                platform.unregister_class(token);
                log::debug!("window class unregistered ({token:?})");
            }
        }
    }

    /// Number of windows currently holding the class.
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn is_registered(&self) -> bool {
        self.token.is_some()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
