//! Wake configuration.
//!
//! Loaded from `~/.wake/config.toml`. Every field has a default, so a
//! missing file is a valid configuration.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Wake configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Overrides the session storage root (`~/.wake/sessions`).
    pub session_root: Option<PathBuf>,
}

impl Config {
    /// Load config from `~/.wake/config.toml`.
    /// A missing file yields the defaults; an unreadable or invalid file is
    /// an error.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.wake/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".wake").join("config.toml"))
    }
}
