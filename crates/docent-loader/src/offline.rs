//! Offline content cache.
//!
//! [`OfflineCache`] mirrors the browser cache model the generated service
//! worker relies on: named caches of url → body, one of which is current.
//! [`CachingFetcher`] puts it in front of any [`ContentFetcher`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use docent_core::Result;
use tokio::sync::RwLock;

use crate::fetch::ContentFetcher;

type Entries = HashMap<String, String>;

/// Named response caches.
#[derive(Debug)]
pub struct OfflineCache {
    current: String,
    caches: RwLock<BTreeMap<String, Entries>>,
}

impl OfflineCache {
    /// Cache set whose live cache is `current`.
    pub fn new(current: impl Into<String>) -> Self {
        let current = current.into();
        let mut caches = BTreeMap::new();
        caches.insert(current.clone(), Entries::new());
        Self {
            current,
            caches: RwLock::new(caches),
        }
    }

    /// Name of the live cache.
    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// Names of every cache, sorted.
    pub async fn cache_names(&self) -> Vec<String> {
        self.caches.read().await.keys().cloned().collect()
    }

    /// Store `body` for `url` in the live cache.
    pub async fn put(&self, url: &str, body: impl Into<String>) {
        self.put_in(&self.current, url, body).await;
    }

    /// Store `body` for `url` in cache `name`, creating it if needed.
    pub async fn put_in(&self, name: &str, url: &str, body: impl Into<String>) {
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(url.to_string(), body.into());
    }

    /// Look `url` up in the live cache, then in the others by name.
    pub async fn get(&self, url: &str) -> Option<String> {
        let caches = self.caches.read().await;
        caches
            .get(&self.current)
            .and_then(|c| c.get(url))
            .or_else(|| caches.values().find_map(|c| c.get(url)))
            .cloned()
    }

    /// Remove `url` from every cache.
    pub async fn evict(&self, url: &str) -> bool {
        let mut removed = false;
        for entries in self.caches.write().await.values_mut() {
            removed |= entries.remove(url).is_some();
        }
        removed
    }

    /// Fetch every url and store them all in the live cache.
    ///
    /// Nothing is stored unless every fetch succeeds.
    pub async fn precache<I, S>(&self, urls: I, fetcher: &dyn ContentFetcher) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fetched = Vec::new();
        for url in urls {
            let url = url.as_ref();
            fetched.push((url.to_string(), fetcher.fetch(url).await?));
        }

        let count = fetched.len();
        let mut caches = self.caches.write().await;
        let live = caches.entry(self.current.clone()).or_default();
        live.extend(fetched);
        log::debug!("Pre-cached {count} url(s) into '{}'", self.current);
        Ok(count)
    }

    /// Delete every cache except the live one. Returns the deleted names.
    pub async fn activate(&self) -> Vec<String> {
        let mut caches = self.caches.write().await;
        let stale: Vec<String> = caches
            .keys()
            .filter(|name| **name != self.current)
            .cloned()
            .collect();
        for name in &stale {
            caches.remove(name);
            log::info!("Purged offline cache '{name}'");
        }
        caches.entry(self.current.clone()).or_default();
        stale
    }

    /// Delete cache `name`.
    pub async fn delete(&self, name: &str) -> bool {
        self.caches.write().await.remove(name).is_some()
    }

    /// Number of urls in the live cache.
    pub async fn len(&self) -> usize {
        self.caches
            .read()
            .await
            .get(&self.current)
            .map_or(0, HashMap::len)
    }

    /// Whether the live cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Total bytes of cached bodies across all caches.
    pub async fn usage_bytes(&self) -> usize {
        self.caches
            .read()
            .await
            .values()
            .flat_map(|c| c.values())
            .map(String::len)
            .sum()
    }
}

/// Cache-first fetcher with network fallback.
///
/// Successful fetches are written back to the live cache; failures are
/// never cached.
#[derive(Clone)]
pub struct CachingFetcher {
    inner: Arc<dyn ContentFetcher>,
    cache: Arc<OfflineCache>,
}

impl CachingFetcher {
    /// Serve `inner` through `cache`.
    pub fn new(inner: Arc<dyn ContentFetcher>, cache: Arc<OfflineCache>) -> Self {
        Self { inner, cache }
    }

    /// The cache in front of the network.
    pub fn cache(&self) -> &Arc<OfflineCache> {
        &self.cache
    }
}

#[async_trait]
impl ContentFetcher for CachingFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        if let Some(body) = self.cache.get(path).await {
            log::trace!("offline cache hit: {path}");
            return Ok(body);
        }

        let body = self.inner.fetch(path).await?;
        self.cache.put(path, body.clone()).await;
        Ok(body)
    }

    fn name(&self) -> &str {
        "caching"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = OfflineCache::new("v1");
        cache.put("/a", "A").await;

        assert_eq!(cache.get("/a").await.as_deref(), Some("A"));
        assert!(cache.get("/b").await.is_none());
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.usage_bytes().await, 1);
    }

    #[tokio::test]
    async fn test_get_prefers_live_cache() {
        let cache = OfflineCache::new("v2");
        cache.put_in("v1", "/a", "old").await;
        assert_eq!(cache.get("/a").await.as_deref(), Some("old"));

        cache.put("/a", "new").await;
        assert_eq!(cache.get("/a").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_activate_purges_other_caches() {
        let cache = OfflineCache::new("v2");
        cache.put_in("v0", "/x", "x").await;
        cache.put_in("v1", "/y", "y").await;
        cache.put("/z", "z").await;

        let purged = cache.activate().await;
        assert_eq!(purged, vec!["v0", "v1"]);
        assert_eq!(cache.cache_names().await, vec!["v2"]);
        assert!(cache.get("/x").await.is_none());
        assert_eq!(cache.get("/z").await.as_deref(), Some("z"));
    }

    #[tokio::test]
    async fn test_precache_is_all_or_nothing() {
        let fetcher = MemoryFetcher::with_files([("/a", "A"), ("/b", "B")]);
        let cache = OfflineCache::new("v1");

        assert_eq!(cache.precache(["/a", "/b"], &fetcher).await.unwrap(), 2);
        assert_eq!(cache.len().await, 2);

        let fresh = OfflineCache::new("v1");
        assert!(fresh.precache(["/a", "/missing"], &fetcher).await.is_err());
        assert!(fresh.is_empty().await);
    }

    #[tokio::test]
    async fn test_caching_fetcher_serves_from_cache_when_offline() {
        let network = Arc::new(MemoryFetcher::with_files([("manifest.json", "{}")]));
        let cache = Arc::new(OfflineCache::new("v1"));
        let fetcher = CachingFetcher::new(network.clone(), cache.clone());

        assert_eq!(fetcher.fetch("manifest.json").await.unwrap(), "{}");
        assert_eq!(cache.len().await, 1);

        // network gone
        network.remove("manifest.json").await;
        assert_eq!(fetcher.fetch("manifest.json").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_caching_fetcher_does_not_cache_failures() {
        let network = Arc::new(MemoryFetcher::new());
        let cache = Arc::new(OfflineCache::new("v1"));
        let fetcher = CachingFetcher::new(network.clone(), cache.clone());

        assert!(fetcher.fetch("nope").await.unwrap_err().is_load());
        assert!(cache.is_empty().await);

        network.insert("nope", "now here").await;
        assert_eq!(fetcher.fetch("nope").await.unwrap(), "now here");
    }

    #[tokio::test]
    async fn test_evict() {
        let cache = OfflineCache::new("v1");
        cache.put("/a", "A").await;
        cache.put_in("v0", "/a", "A0").await;

        assert!(cache.evict("/a").await);
        assert!(cache.get("/a").await.is_none());
        assert!(!cache.evict("/a").await);
    }
}
