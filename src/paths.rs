//! Path resolution for the settings file.
//!
//! Uses env vars when set, otherwise XDG defaults.

use std::path::{Path, PathBuf};

pub const SETTINGS_PATH_ENV: &str = "PLEXCONF_SETTINGS_PATH";

/// Resolved paths for plexconf files.
#[derive(Debug, Clone)]
pub struct Paths {
    pub settings_file: PathBuf,
}

impl Paths {
    /// Resolve paths from environment, falling back to XDG/defaults.
    pub fn resolve() -> Self {
        let settings_file = resolve_path(
            SETTINGS_PATH_ENV,
            dirs::config_dir().map(|p| p.join("plexconf/plex.json")),
            "~/.config/plexconf/plex.json",
        );

        Self { settings_file }
    }

    /// Settings document (server records).
    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }
}

fn resolve_path(env_var: &str, xdg_default: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(val) = crate::config::env_value(env_var) {
        return expand_tilde(&val);
    }
    xdg_default.unwrap_or_else(|| expand_tilde(fallback))
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}
