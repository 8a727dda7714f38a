//! Error types for docent-core.
//!
//! A single error enum is shared by the content, search, and loader crates.
//! Parser failures carry the name of the offending file so they can be
//! reported by the loader without losing context.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for docent operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur across the docent pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O failure, optionally tied to a path.
    #[error("I/O error{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    Io {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Path being accessed, if known.
        path: Option<PathBuf>,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Content could not be parsed.
    #[error("Failed to parse {file}: {message}")]
    Parse {
        /// File (or article id) that failed to parse.
        file: String,
        /// What went wrong.
        message: String,
    },

    /// No parser is registered for the content.
    #[error("Unsupported content format for {file}")]
    UnsupportedFormat {
        /// File (or article id) that could not be matched.
        file: String,
    },

    /// A requested item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Fetching a manifest or article failed.
    #[error("Failed to fetch {path}: {message}")]
    Fetch {
        /// Path or URL that was requested.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Creates a parse error for the given file.
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported-format error for the given file.
    pub fn unsupported(file: impl Into<String>) -> Self {
        Error::UnsupportedFormat { file: file.into() }
    }

    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    /// Creates a fetch error.
    pub fn fetch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Fetch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(message.into())
    }

    /// Wraps an I/O error with the path that was being accessed.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            source,
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Returns `true` for errors raised while parsing content.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. } | Error::UnsupportedFormat { .. } | Error::Yaml(_)
        )
    }

    /// Returns `true` for errors raised while loading content.
    pub fn is_load(&self) -> bool {
        matches!(self, Error::Fetch { .. } | Error::NotFound(_) | Error::Io { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source, path: None }
    }
}
