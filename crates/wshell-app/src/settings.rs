//! Optional shell settings file
//!
//! `~/.config/wallet-shell/settings.toml`, entirely optional: a missing or
//! unparsable file falls back to defaults and is never fatal.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use wshell_core::prelude::*;

const SETTINGS_FILENAME: &str = "settings.toml";
const SETTINGS_DIR: &str = "wallet-shell";

/// Window geometry and chrome
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            background_color: "#000000".to_string(),
            title: "Wallet Shell".to_string(),
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShellSettings {
    pub window: WindowSettings,
    /// Development server origin used with `--dev`
    pub dev_server_url: Option<String>,
}

impl ShellSettings {
    /// Load from the conventional location, falling back to defaults on any
    /// problem.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring invalid settings file {}: {:?}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and parse an explicit settings file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| Error::config_invalid(e.to_string()))
    }

    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILENAME))
    }
}
