//! # docent-storage
//!
//! Key-value storage for user preferences.
//!
//! This crate provides:
//! - The [`StorageBackend`] trait over raw string keys and values
//! - Memory, JSON-file, and cookie-jar backends
//! - [`Storage`], a prefix-namespaced adapter with typed JSON values
//! - [`Preferences`]: bookmarks, history, recent searches, and settings

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod cookie;
pub mod error;
pub mod file;
pub mod preferences;
pub mod storage;

pub use backend::{MemoryBackend, StorageBackend};
pub use cookie::{CookieAttributes, CookieBackend};
pub use error::{Error, Result};
pub use file::FileBackend;
pub use preferences::{HistoryEntry, Preferences, Theme, UserSettings};
pub use storage::{BackendKind, Storage, StorageConfig};
