use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SettingsError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Backend origin the `/api/...` paths are joined onto.
    pub base_url: String,
    pub prefill_debounce_ms: u64,
    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            prefill_debounce_ms: 500,
            log_level: "warn".to_string(),
        }
    }
}

impl AppSettings {
    pub fn prefill_delay(&self) -> Duration {
        Duration::from_millis(self.prefill_debounce_ms)
    }

    /// Reads the settings file; `Ok(None)` when it does not exist yet.
    pub fn load_from(path: &Path) -> Result<Option<Self>, SettingsError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "settings loaded");
        Ok(Some(settings))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Loads the settings, writing the defaults on first use.
    pub fn load_or_init(path: &Path) -> Result<Self, SettingsError> {
        match Self::load_from(path)? {
            Some(settings) => Ok(settings),
            None => {
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
        }
    }
}

/// `settings.toml` in the platform config dir, or the working directory
/// when no home directory can be determined.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "emergency-leak-service", "leak-intake")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
        .unwrap_or_else(|| PathBuf::from("settings.toml"))
}
