// ── Launch configuration ──────────────────────────────────────────────────────
//
// Reads `%APPDATA%\Casement\shell.json` (or the file named by `--config`).
// Every field is optional; a missing default file just means defaults.  The
// shell never writes this file.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    geometry::{Point, Size},
};

/// Initial window placement and behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub title: String,
    /// Logical origin of the main window.
    pub origin: Point,
    /// Logical outer size of the main window.
    pub size: Size,
    /// Closing the main window ends the process.
    pub quit_on_close: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: "Casement".to_owned(),
            origin: Point::new(10, 10),
            size: Size::new(1280, 720),
            quit_on_close: true,
        }
    }
}

impl ShellConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Pick the configuration for this launch.
    ///
    /// An explicit `--config` path must exist.  The default location is
    /// optional.
    pub fn resolve(args: &LaunchArgs) -> Result<Self> {
        if let Some(path) = &args.config_path {
            log::info!("config: {}", path.display());
            return Self::load_from(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                log::info!("config: {}", path.display());
                Self::load_from(&path)
            }
            _ => {
                log::debug!("config: defaults");
                Ok(Self::default())
            }
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// `%APPDATA%\Casement\shell.json`, or `None` if `APPDATA` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("Casement");
    p.push("shell.json");
    Some(p)
}

// ── Arguments ─────────────────────────────────────────────────────────────────

/// Command-line arguments, split into the shell's own and the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    pub config_path: Option<PathBuf>,
    /// Everything else, in order, for the hosted content.
    pub forwarded: Vec<String>,
}

impl LaunchArgs {
    /// Accepts `--config <path>` and `--config=<path>`; the last one wins.
    /// A trailing `--config` with no value is forwarded unchanged.
    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            if let Some(path) = arg.strip_prefix("--config=") {
                parsed.config_path = Some(PathBuf::from(path));
            } else if arg == "--config" {
                match args.next() {
                    Some(path) => parsed.config_path = Some(PathBuf::from(path)),
                    None => parsed.forwarded.push(arg),
                }
            } else {
                parsed.forwarded.push(arg);
            }
        }
        parsed
    }

    /// `parse` over raw process arguments.  Anything that is not valid
    /// Unicode is converted lossily instead of rejected.
    pub fn from_os_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::parse(args.into_iter().map(|arg| arg.to_string_lossy().into_owned()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
