//! Storage backend trait and the in-memory implementation.
//!
//! Backends deal in raw string keys and values. Namespacing and JSON
//! encoding live one level up, in [`Storage`](crate::Storage), so every
//! backend behaves the same from the caller's side.
//!
//! # Backends
//!
//! - [`MemoryBackend`]: process-lifetime map (also used for session storage)
//! - [`FileBackend`](crate::FileBackend): JSON file, the persistent "local storage"
//! - [`CookieBackend`](crate::CookieBackend): cookie jar with `Cookie` header import/export

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::Result;

/// Raw key-value store.
///
/// Methods take `&self`; implementations use interior mutability so a
/// backend can be shared behind an `Arc`.
pub trait StorageBackend: Send + Sync {
    /// Get the backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Raw value for `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Whether `key` is present.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

// Lock helpers; a poisoned lock still holds a usable map.
pub(crate) fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-memory backend.
///
/// Contents last as long as the value, which makes it a session store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        read(&self.entries).is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(read(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        write(&self.entries).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        write(&self.entries).remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(read(&self.entries).keys().cloned().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
