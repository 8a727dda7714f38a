//! Content fetchers.
//!
//! A [`ContentFetcher`] turns a relative path (`manifest.json`,
//! `articles/intro.md`) into raw text. Any failure is a
//! [`Error::Fetch`](docent_core::Error::Fetch); nothing is retried.
//!
//! # Fetchers
//!
//! - [`FsFetcher`]: files under a root directory
//! - [`MemoryFetcher`]: fixed in-memory files (tests, embedded content)
//! - `HttpFetcher`: paths under a base URL (requires the `http` feature)

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use docent_core::{Error, Result};
use tokio::sync::RwLock;

/// Source of raw manifest and article text.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the text at `path`.
    async fn fetch(&self, path: &str) -> Result<String>;

    /// Get the fetcher name for diagnostics.
    fn name(&self) -> &str;
}

// ============================================================================
// FsFetcher
// ============================================================================

/// Reads files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Fetch from files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(Error::fetch(path, "path escapes the content root"));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentFetcher for FsFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| Error::fetch(full.display().to_string(), e.to_string()))
    }

    fn name(&self) -> &str {
        "fs"
    }
}

// ============================================================================
// MemoryFetcher
// ============================================================================

/// Serves files from memory.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: RwLock<HashMap<String, String>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher serving `files`.
    pub fn with_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            files: RwLock::new(
                files
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Add or replace a file.
    pub async fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files.write().await.insert(path.into(), content.into());
    }

    /// Remove a file.
    pub async fn remove(&self, path: &str) -> bool {
        self.files.write().await.remove(path).is_some()
    }
}

#[async_trait]
impl ContentFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| Error::fetch(path, "no such file"))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// HttpFetcher
// ============================================================================

/// Fetches paths relative to a base URL.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Fetch from `base_url` (a trailing slash is optional).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use an existing client.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// URL requested for `path`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::fetch(&url, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::fetch(&url, format!("HTTP {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(&url, format!("reading body failed: {e}")))
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_fetcher_reads_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("articles")).unwrap();
        std::fs::write(dir.path().join("articles/a1.md"), "# Intro").unwrap();

        let fetcher = FsFetcher::new(dir.path());
        assert_eq!(fetcher.fetch("articles/a1.md").await.unwrap(), "# Intro");
        assert_eq!(fetcher.fetch("/articles/a1.md").await.unwrap(), "# Intro");
        assert_eq!(fetcher.root(), dir.path());
    }

    #[tokio::test]
    async fn test_fs_fetcher_missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let err = FsFetcher::new(dir.path()).fetch("nope.md").await.unwrap_err();
        assert!(err.is_load());
    }

    #[tokio::test]
    async fn test_fs_fetcher_rejects_parent_dir() {
        let dir = TempDir::new().unwrap();
        let err = FsFetcher::new(dir.path())
            .fetch("../etc/passwd")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("escapes"));
    }

    #[tokio::test]
    async fn test_memory_fetcher() {
        let fetcher = MemoryFetcher::with_files([("a.md", "A")]);
        fetcher.insert("b.md", "B").await;

        assert_eq!(fetcher.fetch("a.md").await.unwrap(), "A");
        assert_eq!(fetcher.fetch("b.md").await.unwrap(), "B");
        assert!(fetcher.remove("a.md").await);
        assert!(fetcher.fetch("a.md").await.unwrap_err().is_load());
        assert_eq!(fetcher.name(), "memory");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_url_for() {
        let fetcher = HttpFetcher::new("https://help.example.com/content/");
        assert_eq!(
            fetcher.url_for("/articles/a1.md"),
            "https://help.example.com/content/articles/a1.md"
        );
    }
}
