//! CLI configuration file.
//!
//! Stored as TOML at `<config_dir>/docent/config.toml` unless `--config`
//! (or `DOCENT_CONFIG`) names another file. A missing file means defaults.

use std::path::{Path, PathBuf};

use docent_core::{Error, Result};
use docent_loader::{LoaderConfig, ServiceWorkerScript};
use docent_storage::StorageConfig;
use serde::{Deserialize, Serialize};

/// Name used for the config directory and in messages.
pub const PROJECT_NAME: &str = "docent";

/// Everything the CLI reads from its config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocentConfig {
    /// Content loading, parsing, and search.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// User preference storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Service worker generation.
    #[serde(default)]
    pub service_worker: ServiceWorkerScript,
}

impl DocentConfig {
    /// Platform default location.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// `explicit` if given, otherwise the platform default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        explicit.map(PathBuf::from).or_else(Self::default_config_path)
    }

    /// Load the resolved config file, or defaults when there is none.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(config_path) {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                log::debug!("No config at {}; using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse the TOML file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}
