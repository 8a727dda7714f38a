//! Error types for docent-storage

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for docent-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in docent-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from docent-core
    #[error("Core error: {0}")]
    Core(#[from] docent_core::Error),

    /// A value could not be encoded.
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        /// Unprefixed key.
        key: String,
        /// Serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// The backing file could not be read or written.
    #[error("Storage file {}: {message}", path.display())]
    File {
        /// Backing file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The backend refused the operation.
    #[error("{backend} backend: {message}")]
    Backend {
        /// Backend name.
        backend: &'static str,
        /// What went wrong.
        message: String,
    },
}

impl Error {
    /// Creates a backend error.
    pub fn backend(backend: &'static str, message: impl Into<String>) -> Self {
        Error::Backend {
            backend,
            message: message.into(),
        }
    }

    /// Creates a file error.
    pub fn file(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::File {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
