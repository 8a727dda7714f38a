//! Namespaced, typed storage adapter.
//!
//! [`Storage`] prefixes every key and JSON-encodes every value before it
//! reaches the backend, so all backends share one set of semantics:
//!
//! ```rust
//! use docent_storage::{MemoryBackend, Storage};
//!
//! let storage = Storage::new(MemoryBackend::new(), "help:");
//! storage.set("theme", &"dark").unwrap();
//!
//! assert_eq!(storage.get::<String>("theme").unwrap().as_deref(), Some("dark"));
//! assert_eq!(storage.keys().unwrap(), vec!["theme"]);
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{MemoryBackend, StorageBackend};
use crate::cookie::{CookieAttributes, CookieBackend};
use crate::error::{Error, Result};
use crate::file::FileBackend;

/// Which backend [`Storage::from_config`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-lifetime map.
    #[default]
    Memory,
    /// Per-session map (in-memory).
    Session,
    /// JSON file at [`StorageConfig::path`].
    File,
    /// Cookie jar.
    Cookie,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Prefix prepended to every key.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Backend to use.
    #[serde(default)]
    pub backend: BackendKind,

    /// Backing file for [`BackendKind::File`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Attributes for [`BackendKind::Cookie`].
    #[serde(default)]
    pub cookie: CookieAttributes,
}

fn default_prefix() -> String {
    "docent:".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            backend: BackendKind::default(),
            path: None,
            cookie: CookieAttributes::default(),
        }
    }
}

/// Prefix-namespaced JSON view over a [`StorageBackend`].
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
    prefix: String,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend.name())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Storage {
    /// Wrap `backend`, namespacing keys with `prefix`.
    pub fn new(backend: impl StorageBackend + 'static, prefix: impl Into<String>) -> Self {
        Self::from_backend(Arc::new(backend), prefix)
    }

    /// Wrap an already shared backend.
    pub fn from_backend(backend: Arc<dyn StorageBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    /// In-memory storage with the default prefix.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), default_prefix())
    }

    /// Build the backend described by `config`.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let backend: Arc<dyn StorageBackend> = match config.backend {
            BackendKind::Memory | BackendKind::Session => Arc::new(MemoryBackend::new()),
            BackendKind::File => {
                let path = config.path.as_ref().ok_or_else(|| {
                    docent_core::Error::config("file storage requires a `path`")
                })?;
                Arc::new(FileBackend::open(path)?)
            }
            BackendKind::Cookie => Arc::new(CookieBackend::with_attributes(config.cookie.clone())),
        };
        log::debug!(
            "Storage backend '{}' with prefix '{}'",
            backend.name(),
            config.prefix
        );
        Ok(Self::from_backend(backend, config.prefix.clone()))
    }

    /// Key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Underlying backend name.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Decoded value for `key`.
    ///
    /// A stored value that does not decode as `T` reads as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(&self.full_key(key))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Ignoring unreadable stored value for '{key}': {e}");
                Ok(None)
            }
        }
    }

    /// Encode and store `value` under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| Error::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(&self.full_key(key), raw)
    }

    /// Delete `key`.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(&self.full_key(key))
    }

    /// Whether `key` is stored.
    pub fn has(&self, key: &str) -> Result<bool> {
        self.backend.contains(&self.full_key(key))
    }

    /// Keys under this prefix, with the prefix removed.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
            .collect())
    }

    /// Delete every key under this prefix. Other namespaces are untouched.
    pub fn clear(&self) -> Result<()> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
