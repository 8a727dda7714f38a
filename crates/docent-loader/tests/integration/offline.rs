//! Loading through the offline cache.

use std::sync::Arc;

use docent_loader::{
    CachingFetcher, ContentFetcher, LoaderConfig, MemoryFetcher, OfflineCache, StaticContentLoader,
};

use crate::common::mixed_files;

#[tokio::test]
async fn test_manifest_loads_offline_after_first_visit() {
    let network = Arc::new(MemoryFetcher::with_files(mixed_files()));
    let cache = Arc::new(OfflineCache::new("docent-v1"));
    let fetcher: Arc<dyn ContentFetcher> =
        Arc::new(CachingFetcher::new(network.clone(), cache.clone()));

    let mut online = StaticContentLoader::new(LoaderConfig::default()).with_fetcher(fetcher.clone());
    let first = online.load_manifest().await.unwrap();

    for (path, _) in mixed_files() {
        network.remove(path).await;
    }

    let mut offline = StaticContentLoader::new(LoaderConfig::default()).with_fetcher(fetcher);
    let second = offline.load_manifest().await.unwrap();

    assert_eq!(first.loaded, second.loaded);
    assert!(cache.usage_bytes().await > 0);
}

#[tokio::test]
async fn test_new_cache_version_purges_old_content() {
    let cache = OfflineCache::new("docent-v2");
    cache.put_in("docent-v1", "articles/old.md", "# Old").await;
    cache.put("articles/new.md", "# New").await;

    assert_eq!(cache.activate().await, vec!["docent-v1"]);
    assert!(cache.get("articles/old.md").await.is_none());
    assert_eq!(cache.get("articles/new.md").await.as_deref(), Some("# New"));
}
