// ── Immersive dark mode over uxtheme / DWM ────────────────────────────────────
//
// The five uxtheme entry points are exported by ordinal only.  They are
// resolved once, turned into typed function pointers, and kept for the life
// of the process; uxtheme.dll is never unloaded.

use core::ffi::c_void;

use windows::{
    core::{s, w, PCSTR},
    Win32::{
        Foundation::{HMODULE, HWND},
        Graphics::Dwm::{DwmSetWindowAttribute, DWMWINDOWATTRIBUTE},
        System::LibraryLoader::{
            GetModuleHandleW, GetProcAddress, LoadLibraryExW, LOAD_LIBRARY_SEARCH_SYSTEM32,
        },
        UI::{
            Accessibility::{HCF_HIGHCONTRASTON, HIGHCONTRASTW},
            WindowsAndMessaging::{
                SystemParametersInfoW, SPI_GETHIGHCONTRAST, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
            },
        },
    },
};

use super::to_hwnd;
use crate::{
    platform::NativeHandle,
    theme::{
        EntryPoint, EntryTable, ImmersiveTheming, OsVersion, PreferredAppMode, ThemeEnvironment,
        ThemeLibrary, ThemeProbe,
    },
};

/// `DWMWA_USE_IMMERSIVE_DARK_MODE`.
const DWMWA_USE_IMMERSIVE_DARK_MODE: DWMWINDOWATTRIBUTE = DWMWINDOWATTRIBUTE(20);

type RtlGetNtVersionNumbersFn = unsafe extern "system" fn(*mut u32, *mut u32, *mut u32);
type SetPreferredAppModeFn = unsafe extern "system" fn(i32) -> i32;
type FlushMenuThemesFn = unsafe extern "system" fn();
type RefreshImmersiveColorPolicyStateFn = unsafe extern "system" fn();
// C++ `bool`: one byte.
type ShouldAppsUseDarkModeFn = unsafe extern "system" fn() -> u8;
type AllowDarkModeForWindowFn = unsafe extern "system" fn(HWND, u8) -> u8;

// ── Probe ─────────────────────────────────────────────────────────────────────

/// Queries the real OS: ntdll for the version, system32 for uxtheme.
#[derive(Debug, Default, Clone, Copy)]
pub struct UxThemeProbe;

impl ThemeProbe for UxThemeProbe {
    fn os_version(&self) -> Option<OsVersion> {
        // SAFETY: ntdll.dll is mapped into every process; the name is a valid
        // null-terminated literal.
        let ntdll = unsafe { GetModuleHandleW(w!("ntdll.dll")) }.ok()?;
        // SAFETY: ntdll is a valid module handle; the symbol name is a literal.
        let entry = unsafe { GetProcAddress(ntdll, s!("RtlGetNtVersionNumbers")) }?;
        // SAFETY: RtlGetNtVersionNumbers has had this signature since NT 5.1.
        let query = unsafe {
            std::mem::transmute::<unsafe extern "system" fn() -> isize, RtlGetNtVersionNumbersFn>(entry)
        };

        let (mut major, mut minor, mut build) = (0u32, 0u32, 0u32);
        // SAFETY: all three out-pointers refer to live stack locals.
        unsafe { query(&mut major, &mut minor, &mut build) };
        Some(OsVersion::from_raw(major, minor, build))
    }

    fn open_library(&self) -> Option<Box<dyn ThemeLibrary>> {
        // SAFETY: literal library name; LOAD_LIBRARY_SEARCH_SYSTEM32 keeps the
        // application directory out of the search path.
        match unsafe { LoadLibraryExW(w!("uxtheme.dll"), None, LOAD_LIBRARY_SEARCH_SYSTEM32) } {
            Ok(module) => Some(Box::new(UxThemeLibrary(module))),
            Err(e) => {
                log::debug!("dark mode: LoadLibraryExW(uxtheme.dll) failed: {e}");
                None
            }
        }
    }
}

/// A loaded uxtheme.dll.  Never freed.
struct UxThemeLibrary(HMODULE);

impl ThemeLibrary for UxThemeLibrary {
    fn resolve(&self, ordinal: u16) -> Option<EntryPoint> {
        // SAFETY: self.0 is a loaded module; a PCSTR whose value is below
        // 0x10000 is interpreted by GetProcAddress as an ordinal, not a name.
        let entry = unsafe { GetProcAddress(self.0, PCSTR(usize::from(ordinal) as *const u8)) }?;
        EntryPoint::from_addr(entry as usize)
    }

    fn bind(self: Box<Self>, entries: EntryTable) -> Box<dyn ImmersiveTheming> {
        // SAFETY: every address was resolved from uxtheme.dll, which stays
        // loaded for the process lifetime, and each ordinal has the signature
        // declared by its type alias on every build that passes the version
        // gate.
        unsafe {
            Box::new(UxTheme {
                set_preferred_app_mode: std::mem::transmute::<usize, SetPreferredAppModeFn>(
                    entries.set_preferred_app_mode.addr(),
                ),
                flush_menu_themes: std::mem::transmute::<usize, FlushMenuThemesFn>(
                    entries.flush_menu_themes.addr(),
                ),
                refresh_immersive_color_policy_state: std::mem::transmute::<
                    usize,
                    RefreshImmersiveColorPolicyStateFn,
                >(
                    entries.refresh_immersive_color_policy_state.addr()
                ),
                should_apps_use_dark_mode: std::mem::transmute::<usize, ShouldAppsUseDarkModeFn>(
                    entries.should_apps_use_dark_mode.addr(),
                ),
                allow_dark_mode_for_window: std::mem::transmute::<usize, AllowDarkModeForWindowFn>(
                    entries.allow_dark_mode_for_window.addr(),
                ),
            })
        }
    }
}

// ── Bound entry points ────────────────────────────────────────────────────────

struct UxTheme {
    set_preferred_app_mode: SetPreferredAppModeFn,
    flush_menu_themes: FlushMenuThemesFn,
    refresh_immersive_color_policy_state: RefreshImmersiveColorPolicyStateFn,
    should_apps_use_dark_mode: ShouldAppsUseDarkModeFn,
    allow_dark_mode_for_window: AllowDarkModeForWindowFn,
}

impl ImmersiveTheming for UxTheme {
    fn set_preferred_app_mode(&self, mode: PreferredAppMode) {
        // SAFETY: bound from ordinal 135 (see `bind`). Returns the previous mode.
        let _ = unsafe { (self.set_preferred_app_mode)(mode as i32) };
    }

    fn flush_menu_themes(&self) {
        // SAFETY: bound from ordinal 136; takes no arguments.
        unsafe { (self.flush_menu_themes)() };
    }

    fn refresh_immersive_color_policy_state(&self) {
        // SAFETY: bound from ordinal 104; takes no arguments.
        unsafe { (self.refresh_immersive_color_policy_state)() };
    }

    fn should_apps_use_dark_mode(&self) -> bool {
        // SAFETY: bound from ordinal 132; takes no arguments.
        unsafe { (self.should_apps_use_dark_mode)() != 0 }
    }

    fn allow_dark_mode_for_window(&self, handle: NativeHandle, allow: bool) {
        // SAFETY: bound from ordinal 133; handle is a live window owned by
        // this thread.
        let _ = unsafe { (self.allow_dark_mode_for_window)(to_hwnd(handle), u8::from(allow)) };
    }
}

// ── Documented APIs ───────────────────────────────────────────────────────────

/// High contrast through `SystemParametersInfoW`, title bar through DWM.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32ThemeEnvironment;

impl ThemeEnvironment for Win32ThemeEnvironment {
    fn high_contrast_active(&self) -> bool {
        let mut hc = HIGHCONTRASTW {
            cbSize: std::mem::size_of::<HIGHCONTRASTW>() as u32,
            ..Default::default()
        };
        // SAFETY: hc is a properly sized HIGHCONTRASTW that outlives the call;
        // cbSize matches the buffer handed over.
        let queried = unsafe {
            SystemParametersInfoW(
                SPI_GETHIGHCONTRAST,
                hc.cbSize,
                Some((&mut hc as *mut HIGHCONTRASTW).cast::<c_void>()),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
        };
        queried.is_ok() && hc.dwFlags.0 & HCF_HIGHCONTRASTON.0 != 0
    }

    fn set_immersive_dark_titlebar(&self, handle: NativeHandle, dark: bool) {
        let value = i32::from(dark);
        // SAFETY: handle is a live top-level window; value is a BOOL-sized
        // local that outlives the call.
        let set = unsafe {
            DwmSetWindowAttribute(
                to_hwnd(handle),
                DWMWA_USE_IMMERSIVE_DARK_MODE,
                (&value as *const i32).cast::<c_void>(),
                std::mem::size_of::<i32>() as u32,
            )
        };
        if let Err(e) = set {
            log::debug!("dark mode: DWMWA_USE_IMMERSIVE_DARK_MODE on {handle:?} failed: {e}");
        }
    }
}
