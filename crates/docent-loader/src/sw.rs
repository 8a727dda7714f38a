//! Service worker script generation.
//!
//! The script is a fixed template with three JSON-encoded values spliced
//! in: the cache name, the pre-cache URL list, and an optional offline
//! fallback page.

use docent_core::Result;
use serde::{Deserialize, Serialize};

/// Service worker template (embedded at compile time)
const SERVICE_WORKER_TEMPLATE: &str = include_str!("embed/service-worker.js");

/// Settings baked into the generated service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceWorkerScript {
    /// Name of the live cache. Caches with any other name are purged on
    /// activation, so bump it to invalidate old content.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// URLs cached at install time.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Page served for failed navigations while offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline_fallback: Option<String>,
}

fn default_cache_name() -> String {
    "docent-v1".to_string()
}

fn default_precache_urls() -> Vec<String> {
    vec!["/".to_string(), "/manifest.json".to_string()]
}

impl Default for ServiceWorkerScript {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            precache_urls: default_precache_urls(),
            offline_fallback: None,
        }
    }
}

impl ServiceWorkerScript {
    /// Script using `cache_name` and the default pre-cache list.
    pub fn new(cache_name: impl Into<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            ..Default::default()
        }
    }

    /// Add URLs to the pre-cache list, skipping duplicates.
    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for url in urls {
            let url = url.into();
            if !self.precache_urls.contains(&url) {
                self.precache_urls.push(url);
            }
        }
        self
    }

    /// Serve `url` for navigations that fail offline.
    pub fn with_offline_fallback(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self = self.with_urls([url.clone()]);
        self.offline_fallback = Some(url);
        self
    }

    /// Render the JavaScript source.
    pub fn render(&self) -> Result<String> {
        Ok(SERVICE_WORKER_TEMPLATE
            .replace("{version}", env!("CARGO_PKG_VERSION"))
            .replace("{cache_name}", &serde_json::to_string(&self.cache_name)?)
            .replace("{precache_urls}", &serde_json::to_string(&self.precache_urls)?)
            .replace(
                "{offline_fallback}",
                &serde_json::to_string(&self.offline_fallback)?,
            ))
    }
}
