//! Loader configuration.

use std::time::Duration;

use docent_content::ParserSettings;
use docent_search::SearchConfig;
use serde::{Deserialize, Serialize};

/// Where content lives and how long the registry stays fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory (or URL path) holding article files.
    #[serde(default = "default_articles_path")]
    pub articles_path: String,

    /// Manifest location, relative to the fetcher root.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    /// Prepended to every slug when building article filenames.
    #[serde(default)]
    pub file_prefix: String,

    /// Extensions probed, in order, when a manifest entry has no filename.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Registry time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-format parser options.
    #[serde(default)]
    pub parsers: ParserSettings,

    /// Search tuning.
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_articles_path() -> String {
    "articles".to_string()
}

fn default_manifest_path() -> String {
    "manifest.json".to_string()
}

fn default_extensions() -> Vec<String> {
    ["md", "mdx", "json", "csv"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            articles_path: default_articles_path(),
            manifest_path: default_manifest_path(),
            file_prefix: String::new(),
            extensions: default_extensions(),
            cache_ttl_secs: default_cache_ttl_secs(),
            parsers: ParserSettings::default(),
            search: SearchConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Registry time-to-live.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Candidate paths for `slug`, in probe order.
    ///
    /// An explicit `filename` bypasses extension probing.
    pub fn article_paths(&self, slug: &str, filename: Option<&str>) -> Vec<String> {
        let join = |file: &str| {
            let dir = self.articles_path.trim_end_matches('/');
            if dir.is_empty() {
                file.to_string()
            } else {
                format!("{dir}/{file}")
            }
        };

        match filename {
            Some(file) => vec![join(file)],
            None => self
                .extensions
                .iter()
                .map(|ext| {
                    join(&format!(
                        "{}{slug}.{}",
                        self.file_prefix,
                        ext.trim_start_matches('.')
                    ))
                })
                .collect(),
        }
    }
}
