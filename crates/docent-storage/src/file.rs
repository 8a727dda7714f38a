//! JSON-file backend.
//!
//! The whole map is kept in memory and rewritten to disk after every
//! change, the way a browser persists local storage for an origin.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::backend::{read, write, StorageBackend};
use crate::error::{Error, Result};

/// Persistent backend stored as a flat JSON object.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file starts empty. A file that is not a JSON object of
    /// strings is an error rather than being silently overwritten.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| docent_core::Error::io_with_path(e, &path))?;
            if json.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&json).map_err(|e| Error::file(&path, e))?
            }
        } else {
            BTreeMap::new()
        };

        log::debug!(
            "Opened file storage: {} key(s) from {}",
            entries.len(),
            path.display()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| docent_core::Error::io_with_path(e, parent))?;
            }
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| Error::file(&self.path, e))?;
        std::fs::write(&self.path, json)
            .map_err(|e| docent_core::Error::io_with_path(e, &self.path))?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(read(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = write(&self.entries);
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = write(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(read(&self.entries).keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/store.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.set("docent:theme", "\"dark\"".to_string()).unwrap();
        drop(backend);

        let reopened = FileBackend::open(&path).unwrap();
        assert_eq!(
            reopened.get("docent:theme").unwrap().as_deref(),
            Some("\"dark\"")
        );
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        backend.set("k", "v".to_string()).unwrap();
        backend.remove("k").unwrap();

        let reopened = FileBackend::open(&path).unwrap();
        assert!(reopened.keys().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = FileBackend::open(&path).unwrap_err();
        assert!(matches!(err, Error::File { .. }));
    }

    #[test]
    fn test_empty_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "").unwrap();

        let backend = FileBackend::open(&path).unwrap();
        assert!(backend.keys().unwrap().is_empty());
        assert_eq!(backend.name(), "file");
    }
}
