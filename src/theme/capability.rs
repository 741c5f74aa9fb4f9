// ── Dark-mode capability detection ────────────────────────────────────────────
//
// Immersive dark mode relies on five undocumented uxtheme.dll exports that have
// no names, only ordinals.  They appeared in Windows 10 1809 (build 17763).
// Detection is all-or-nothing: either every entry point resolves and the
// bound table is kept, or the process stays on the light theme.
//
// The OS-facing half (version query, LoadLibraryExW, GetProcAddress) sits
// behind `ThemeProbe` / `ThemeLibrary`; the Win32 implementation lives in
// `platform::win32::theme`.

use std::{fmt, num::NonZeroUsize};

use crate::platform::NativeHandle;

/// uxtheme.dll export ordinals.  These are a de-facto contract with the OS,
/// not a public API; the values must not change.
pub mod ordinal {
    pub const REFRESH_IMMERSIVE_COLOR_POLICY_STATE: u16 = 104;
    pub const SHOULD_APPS_USE_DARK_MODE: u16 = 132;
    pub const ALLOW_DARK_MODE_FOR_WINDOW: u16 = 133;
    pub const SET_PREFERRED_APP_MODE: u16 = 135;
    pub const FLUSH_MENU_THEMES: u16 = 136;
}

/// Windows 10 1809, the first build exporting all five entry points.
pub const MIN_DARK_MODE_BUILD: u32 = 17763;

// ── OS version ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
}

impl OsVersion {
    /// Build a version from the raw kernel query.  The top nibble of the raw
    /// build number carries flags (`0xF` on free builds) and is cleared.
    pub fn from_raw(major: u32, minor: u32, raw_build: u32) -> Self {
        Self {
            major,
            minor,
            build: raw_build & !0xF000_0000,
        }
    }

    /// Windows 10.0 at or after build 17763.  Anything else, including a
    /// future major version, is treated as unsupported.
    pub fn supports_immersive_dark(&self) -> bool {
        self.major == 10 && self.minor == 0 && self.build >= MIN_DARK_MODE_BUILD
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// `SetPreferredAppMode` argument.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredAppMode {
    Default = 0,
    AllowDark = 1,
    ForceDark = 2,
    ForceLight = 3,
}

/// Address of one resolved export.  Never null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint(NonZeroUsize);

impl EntryPoint {
    pub fn from_addr(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    pub fn addr(self) -> usize {
        self.0.get()
    }
}

/// The complete set of resolved entry points.  `resolve` refuses to build a
/// partial table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTable {
    pub refresh_immersive_color_policy_state: EntryPoint,
    pub should_apps_use_dark_mode: EntryPoint,
    pub allow_dark_mode_for_window: EntryPoint,
    pub set_preferred_app_mode: EntryPoint,
    pub flush_menu_themes: EntryPoint,
}

impl EntryTable {
    /// Look up every ordinal; `None` if any one is missing.
    pub fn resolve(lookup: impl Fn(u16) -> Option<EntryPoint>) -> Option<Self> {
        let find = |ordinal: u16| {
            let entry = lookup(ordinal);
            if entry.is_none() {
                log::debug!("uxtheme ordinal {ordinal} is not exported on this build");
            }
            entry
        };

        // Resolve all five before deciding so the log lists every gap.
        let refresh = find(ordinal::REFRESH_IMMERSIVE_COLOR_POLICY_STATE);
        let should_use_dark = find(ordinal::SHOULD_APPS_USE_DARK_MODE);
        let allow_for_window = find(ordinal::ALLOW_DARK_MODE_FOR_WINDOW);
        let set_preferred = find(ordinal::SET_PREFERRED_APP_MODE);
        let flush_menus = find(ordinal::FLUSH_MENU_THEMES);

        Some(Self {
            refresh_immersive_color_policy_state: refresh?,
            should_apps_use_dark_mode: should_use_dark?,
            allow_dark_mode_for_window: allow_for_window?,
            set_preferred_app_mode: set_preferred?,
            flush_menu_themes: flush_menus?,
        })
    }
}

// ── OS seams ──────────────────────────────────────────────────────────────────

/// The five undocumented calls, bound and ready to invoke.
pub trait ImmersiveTheming {
    fn set_preferred_app_mode(&self, mode: PreferredAppMode);
    fn flush_menu_themes(&self);
    fn refresh_immersive_color_policy_state(&self);
    fn should_apps_use_dark_mode(&self) -> bool;
    fn allow_dark_mode_for_window(&self, handle: NativeHandle, allow: bool);
}

/// A loaded theming library.
pub trait ThemeLibrary {
    fn resolve(&self, ordinal: u16) -> Option<EntryPoint>;

    /// Turn a complete table into callable entry points.  The library stays
    /// loaded for the rest of the process.
    fn bind(self: Box<Self>, entries: EntryTable) -> Box<dyn ImmersiveTheming>;
}

/// Version query and library loading.  Any failure means "not available".
pub trait ThemeProbe {
    fn os_version(&self) -> Option<OsVersion>;

    /// Load the theming library from the system directory only.
    fn open_library(&self) -> Option<Box<dyn ThemeLibrary>>;
}

/// Documented OS calls used next to the undocumented ones.
pub trait ThemeEnvironment {
    /// Current accessibility high-contrast state; never cached.
    fn high_contrast_active(&self) -> bool;

    /// `DWMWA_USE_IMMERSIVE_DARK_MODE` (attribute 20) on the title bar.
    fn set_immersive_dark_titlebar(&self, handle: NativeHandle, dark: bool);
}

// ── Detected state ────────────────────────────────────────────────────────────

/// Process-wide theme capability: the OS build and, when supported, the bound
/// entry points.  Read-only once detected.
pub struct ThemeSupport {
    build: u32,
    api: Option<Box<dyn ImmersiveTheming>>,
}

impl ThemeSupport {
    pub fn unsupported(build: u32) -> Self {
        Self { build, api: None }
    }

    /// Run the full detection sequence against `probe`.
    pub fn detect(probe: &dyn ThemeProbe) -> Self {
        let Some(version) = probe.os_version() else {
            log::debug!("dark mode: OS version query unavailable");
            return Self::unsupported(0);
        };

        if !version.supports_immersive_dark() {
            log::debug!(
                "dark mode: Windows {}.{}.{} is not supported",
                version.major,
                version.minor,
                version.build
            );
            return Self::unsupported(version.build);
        }

        let Some(library) = probe.open_library() else {
            log::debug!("dark mode: uxtheme.dll could not be loaded");
            return Self::unsupported(version.build);
        };

        match EntryTable::resolve(|ordinal| library.resolve(ordinal)) {
            Some(entries) => {
                log::debug!("dark mode: supported on build {}", version.build);
                Self {
                    build: version.build,
                    api: Some(library.bind(entries)),
                }
            }
            None => {
                log::debug!("dark mode: incomplete uxtheme exports, staying light");
                Self::unsupported(version.build)
            }
        }
    }

    pub fn is_supported(&self) -> bool {
        self.api.is_some()
    }

    pub fn build_number(&self) -> u32 {
        self.build
    }

    pub(crate) fn api(&self) -> Option<&dyn ImmersiveTheming> {
        self.api.as_deref()
    }
}

impl fmt::Debug for ThemeSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeSupport")
            .field("build", &self.build)
            .field("supported", &self.is_supported())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProbe;

    #[test]
    fn build_flags_are_masked() {
        let v = OsVersion::from_raw(10, 0, 0xF000_4A61);
        assert_eq!(v.build, 19041);
    }

    #[test]
    fn version_gate() {
        assert!(OsVersion::from_raw(10, 0, 17763).supports_immersive_dark());
        assert!(OsVersion::from_raw(10, 0, 22631).supports_immersive_dark());
        assert!(!OsVersion::from_raw(10, 0, 17762).supports_immersive_dark());
        assert!(!OsVersion::from_raw(6, 3, 9600).supports_immersive_dark());
        assert!(!OsVersion::from_raw(11, 0, 30000).supports_immersive_dark());
    }

    #[test]
    fn table_requires_every_ordinal() {
        let all = |_: u16| EntryPoint::from_addr(0x1000);
        assert!(EntryTable::resolve(all).is_some());

        for missing in [
            ordinal::REFRESH_IMMERSIVE_COLOR_POLICY_STATE,
            ordinal::SHOULD_APPS_USE_DARK_MODE,
            ordinal::ALLOW_DARK_MODE_FOR_WINDOW,
            ordinal::SET_PREFERRED_APP_MODE,
            ordinal::FLUSH_MENU_THEMES,
        ] {
            let lookup = |o: u16| {
                if o == missing {
                    None
                } else {
                    EntryPoint::from_addr(usize::from(o))
                }
            };
            assert!(EntryTable::resolve(lookup).is_none(), "ordinal {missing}");
        }
    }

    #[test]
    fn table_maps_ordinals_to_fields() {
        let t = EntryTable::resolve(|o| EntryPoint::from_addr(usize::from(o))).expect("complete");
        assert_eq!(t.refresh_immersive_color_policy_state.addr(), 104);
        assert_eq!(t.should_apps_use_dark_mode.addr(), 132);
        assert_eq!(t.allow_dark_mode_for_window.addr(), 133);
        assert_eq!(t.set_preferred_app_mode.addr(), 135);
        assert_eq!(t.flush_menu_themes.addr(), 136);
    }

    #[test]
    fn build_17762_is_unsupported() {
        let probe = FakeProbe::windows(17762);
        let s = ThemeSupport::detect(&probe);
        assert!(!s.is_supported());
        assert_eq!(s.build_number(), 17762);
        assert_eq!(probe.library_opens(), 0, "library must not be loaded");
    }

    #[test]
    fn build_19041_with_all_ordinals_is_supported() {
        let probe = FakeProbe::windows(19041);
        let s = ThemeSupport::detect(&probe);
        assert!(s.is_supported());
        assert_eq!(s.build_number(), 19041);
    }

    #[test]
    fn missing_version_query_disables_support() {
        let probe = FakeProbe::without_version_query();
        let s = ThemeSupport::detect(&probe);
        assert!(!s.is_supported());
        assert_eq!(s.build_number(), 0);
    }

    #[test]
    fn library_load_failure_disables_support() {
        let probe = FakeProbe::windows(19041).without_library();
        assert!(!ThemeSupport::detect(&probe).is_supported());
    }

    #[test]
    fn one_missing_ordinal_disables_support() {
        let probe = FakeProbe::windows(19041).missing(ordinal::FLUSH_MENU_THEMES);
        assert!(!ThemeSupport::detect(&probe).is_supported());
    }
}
