// ── System light/dark theme tracking ──────────────────────────────────────────
//
// `Theme` owns the detected capability (write-once) and applies it:
//   • app-wide: opt the process into dark mode and refresh menu themes,
//   • per window: dark non-client hints + dark title bar,
//   • on WM_SETTINGCHANGE: refresh, and tell the caller whether to re-apply.
//
// When the capability is absent every operation is a no-op and the shell stays
// on the light theme.  Nothing here is ever reported as an error.

use std::cell::OnceCell;

use crate::platform::NativeHandle;

pub mod capability;

pub use capability::{
    ordinal, EntryPoint, EntryTable, ImmersiveTheming, OsVersion, PreferredAppMode,
    ThemeEnvironment, ThemeLibrary, ThemeProbe, ThemeSupport, MIN_DARK_MODE_BUILD,
};

/// `WM_SETTINGCHANGE` payload naming a colour-scheme change.
pub const IMMERSIVE_COLOR_SET: &str = "ImmersiveColorSet";

/// Theme capability state and the operations built on it.
pub struct Theme {
    support: OnceCell<ThemeSupport>,
    environment: Box<dyn ThemeEnvironment>,
}

impl Theme {
    pub fn new(environment: impl ThemeEnvironment + 'static) -> Self {
        Self {
            support: OnceCell::new(),
            environment: Box::new(environment),
        }
    }

    /// Detect the capability.  Call once before the first window is created;
    /// later calls keep the first result.
    pub fn initialize(&self, probe: &dyn ThemeProbe) {
        if self.support.get().is_some() {
            log::debug!("dark mode: already initialised");
            return;
        }
        let support = self.support.get_or_init(|| ThemeSupport::detect(probe));
        log::info!(
            "dark mode {} (build {})",
            if support.is_supported() { "available" } else { "unavailable" },
            support.build_number()
        );
    }

    pub fn is_supported(&self) -> bool {
        self.support.get().is_some_and(ThemeSupport::is_supported)
    }

    /// OS build number seen at detection; 0 before `initialize` or when the
    /// version query was unavailable.
    pub fn build_number(&self) -> u32 {
        self.support.get().map_or(0, ThemeSupport::build_number)
    }

    fn api(&self) -> Option<&dyn ImmersiveTheming> {
        self.support.get().and_then(ThemeSupport::api)
    }

    /// Opt the whole process into dark mode.  Menus cache their theme apart
    /// from windows, so their cache is flushed here too.
    pub fn enable_for_app(&self) {
        let Some(api) = self.api() else { return };
        api.set_preferred_app_mode(PreferredAppMode::AllowDark);
        api.refresh_immersive_color_policy_state();
        api.flush_menu_themes();
        log::debug!("dark mode: enabled for app");
    }

    /// Apply the current system preference to one window's chrome.
    ///
    /// High contrast always wins over dark mode.
    pub fn enable_for_window(&self, handle: Option<NativeHandle>) {
        let (Some(api), Some(handle)) = (self.api(), handle) else {
            return;
        };
        let dark = api.should_apps_use_dark_mode() && !self.is_high_contrast_active();
        api.allow_dark_mode_for_window(handle, dark);
        self.environment.set_immersive_dark_titlebar(handle, dark);
        log::debug!("dark mode: window {handle:?} dark={dark}");
    }

    /// React to a settings-change notification.
    ///
    /// Returns `true` only for a colour-scheme change, in which case the
    /// caller must re-apply `enable_for_window`.
    pub fn handle_theme_change(&self, setting: Option<&str>) -> bool {
        let Some(api) = self.api() else { return false };
        let color_scheme_changed = setting == Some(IMMERSIVE_COLOR_SET);

        api.refresh_immersive_color_policy_state();
        if color_scheme_changed {
            api.flush_menu_themes();
            log::debug!("dark mode: system colour scheme changed");
        }
        color_scheme_changed
    }

    pub fn is_high_contrast_active(&self) -> bool {
        self.environment.high_contrast_active()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
