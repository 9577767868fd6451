//! Persisted application settings.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub static PROJECT_DIRS: once_cell::sync::Lazy<Option<ProjectDirs>> =
    once_cell::sync::Lazy::new(|| ProjectDirs::from("org", "synce", "synce-cab-manager"));

/// Settings remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory the package picker opens in.
    pub last_cab_dir: Option<PathBuf>,
    /// Initial state of the "delete after install" checkbox.
    pub delete_cab_default: bool,
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new() -> Result<Self> {
        let dirs = PROJECT_DIRS
            .as_ref()
            .context("could not determine a configuration directory")?;
        Ok(Self::at(dirs.config_dir().join("settings.toml")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load(&self) -> Settings {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings file at {}", self.path.display());
                return Settings::default();
            }
            Err(e) => {
                warn!("could not read {}: {e}", self.path.display());
                return Settings::default();
            }
        };

        match toml::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring malformed {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(settings).context("serializing settings")?;
        fs::write(&self.path, text).with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
