//! Reactive help context.
//!
//! [`HelpContext`] is what a host UI holds on to. It owns the loader,
//! publishes [`ContentState`] transitions and search results on watch
//! channels, and records history and recent searches when a
//! [`Preferences`] store is attached.
//!
//! Loads are tagged with a generation number; when two `load_article`
//! calls overlap, only the newer one may publish its result.

use std::sync::Arc;

use docent_core::i18n::Translations;
use docent_core::{Article, ContentState, Result, StateHandle};
use docent_search::{Debouncer, SearchResult, Suggestion};
use docent_storage::Preferences;
use tokio::sync::{watch, RwLock};

use crate::loader::{LoadReport, StaticContentLoader};

/// Message key for a missing article. Placeholder: `{id}`.
pub const NOT_FOUND_KEY: &str = "error.notFound";

const NOT_FOUND_DEFAULT: &str = "Article '{id}' not found";

/// Built-in English messages.
pub fn default_translations() -> Translations {
    let mut translations = Translations::new("en");
    translations.register("en", [(NOT_FOUND_KEY, NOT_FOUND_DEFAULT)]);
    translations
}

/// Shared content state for a help UI.
pub struct HelpContext {
    loader: Arc<RwLock<StaticContentLoader>>,
    state: StateHandle,
    translations: Arc<Translations>,
    locale: String,
    preferences: Option<Preferences>,
    debouncer: Debouncer,
    results: Arc<watch::Sender<Vec<SearchResult>>>,
}

impl std::fmt::Debug for HelpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelpContext")
            .field("state", &self.state.state())
            .field("locale", &self.locale)
            .field("preferences", &self.preferences.is_some())
            .finish()
    }
}

impl HelpContext {
    /// Wrap `loader` with English messages and no preferences.
    pub fn new(loader: StaticContentLoader) -> Self {
        let debouncer = Debouncer::from_config(&loader.config().search);
        let translations = default_translations();
        let (results, _rx) = watch::channel(Vec::new());

        Self {
            loader: Arc::new(RwLock::new(loader)),
            state: StateHandle::new(),
            locale: translations.base_locale().to_string(),
            translations: Arc::new(translations),
            preferences: None,
            debouncer,
            results: Arc::new(results),
        }
    }

    /// Use `translations` for user-visible messages.
    pub fn with_translations(mut self, translations: Arc<Translations>) -> Self {
        self.translations = translations;
        self
    }

    /// Display messages in `locale`.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Record history and searches in `preferences`.
    ///
    /// A locale saved in the user's settings replaces the current one.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        match preferences.settings() {
            Ok(settings) => {
                if let Some(locale) = settings.locale {
                    self.locale = locale;
                }
            }
            Err(e) => log::warn!("Could not read user settings: {e}"),
        }
        self.preferences = Some(preferences);
        self
    }

    /// Active locale.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Attached preferences.
    pub fn preferences(&self) -> Option<&Preferences> {
        self.preferences.as_ref()
    }

    /// Shared loader.
    pub fn loader(&self) -> Arc<RwLock<StaticContentLoader>> {
        self.loader.clone()
    }

    /// State handle.
    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Subscribe to content state changes.
    pub fn subscribe(&self) -> watch::Receiver<ContentState> {
        self.state.subscribe()
    }

    /// Subscribe to published search results.
    pub fn subscribe_search(&self) -> watch::Receiver<Vec<SearchResult>> {
        self.results.subscribe()
    }

    /// Load everything listed in the manifest.
    pub async fn load_manifest(&self) -> Result<LoadReport> {
        self.loader.write().await.load_manifest().await
    }

    /// Open article `id`.
    ///
    /// Publishes `Loading`, then `Ready` with navigation or `Error` with a
    /// translated message. When the registry has gone stale and a fetcher
    /// is configured, the manifest is reloaded once before giving up.
    pub async fn load_article(&self, id: &str) -> Option<Arc<Article>> {
        let generation = self.state.begin_load(id);

        let found = {
            let mut loader = self.loader.write().await;
            let mut article = loader.load_article(id).await;

            if article.is_none() && !loader.is_cache_valid() && loader.has_fetcher() {
                log::debug!("Registry stale; reloading manifest for '{id}'");
                match loader.load_manifest().await {
                    Ok(_) => article = loader.get_article_by_id(id),
                    Err(e) => log::warn!("Manifest reload failed: {e}"),
                }
            }

            article.map(|a| {
                let navigation = loader.navigation(&a.id).unwrap_or_default();
                (a, navigation)
            })
        };

        match found {
            Some((article, navigation)) => {
                if self.state.complete(generation, article.clone(), navigation) {
                    self.record_visit(&article);
                }
                Some(article)
            }
            None => {
                let message = self.translations.format(
                    &self.locale,
                    NOT_FOUND_KEY,
                    NOT_FOUND_DEFAULT,
                    &[("id", id)],
                );
                self.state.fail(generation, id, message);
                None
            }
        }
    }

    fn record_visit(&self, article: &Article) {
        if let Some(prefs) = &self.preferences {
            if let Err(e) = prefs.record_visit(&article.id, &article.title) {
                log::warn!("Could not record visit to '{}': {e}", article.id);
            }
        }
    }

    /// Search now and publish the results.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        run_search(&self.loader, &self.results, self.preferences.as_ref(), query).await
    }

    /// Search after the debounce delay, replacing any search still waiting.
    ///
    /// Results arrive through [`subscribe_search`](Self::subscribe_search).
    pub fn search_debounced(&self, query: impl Into<String>) {
        let query = query.into();
        let loader = self.loader.clone();
        let results = self.results.clone();
        let preferences = self.preferences.clone();

        self.debouncer.call(async move {
            run_search(&loader, &results, preferences.as_ref(), &query).await;
        });
    }

    /// Drop a waiting debounced search.
    pub fn cancel_search(&self) -> bool {
        self.debouncer.cancel()
    }

    /// Fuzzy title suggestions.
    pub async fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.loader.read().await.suggest(query, limit)
    }
}

async fn run_search(
    loader: &RwLock<StaticContentLoader>,
    results: &watch::Sender<Vec<SearchResult>>,
    preferences: Option<&Preferences>,
    query: &str,
) -> Vec<SearchResult> {
    let (found, searchable) = {
        let loader = loader.read().await;
        let min = loader.config().search.min_query_length;
        (loader.search(query), query.trim().chars().count() >= min)
    };

    if searchable {
        if let Some(prefs) = preferences {
            if let Err(e) = prefs.record_search(query) {
                log::warn!("Could not record search: {e}");
            }
        }
    }

    results.send_replace(found.clone());
    found
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use crate::fetch::MemoryFetcher;
    use crate::loader::ParseRequest;
    use docent_storage::{Storage, UserSettings};
    use std::time::Duration;

    fn context() -> HelpContext {
        let mut loader = StaticContentLoader::default();
        loader.parse_content(ParseRequest::new("a", "# Alpha\nfirst").filename("a.md").order(Some(1)));
        loader.parse_content(ParseRequest::new("b", "# Beta\nsecond").filename("b.md").order(Some(2)));
        HelpContext::new(loader)
    }

    #[tokio::test]
    async fn test_load_article_ready_with_navigation() {
        let ctx = context();
        let article = ctx.load_article("a").await.unwrap();
        assert_eq!(article.title, "Alpha");

        match ctx.state().state() {
            ContentState::Ready { article, navigation } => {
                assert_eq!(article.id, "a");
                assert_eq!(navigation.next.unwrap().id, "b");
            }
            other => panic!("unexpected state {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_article_publishes_translated_error() {
        let mut translations = default_translations();
        translations.register("fr", [(NOT_FOUND_KEY, "Article « {id} » introuvable")]);
        let ctx = context()
            .with_translations(Arc::new(translations))
            .with_locale("fr-CA");

        assert!(ctx.load_article("zzz").await.is_none());
        assert_eq!(ctx.state().state().error(), Some("Article « zzz » introuvable"));
    }

    #[tokio::test]
    async fn test_default_not_found_message() {
        let ctx = context();
        ctx.load_article("zzz").await;
        assert_eq!(ctx.state().state().error(), Some("Article 'zzz' not found"));
    }

    #[tokio::test]
    async fn test_history_and_recent_searches_recorded() {
        let prefs = Preferences::new(Storage::in_memory());
        let ctx = context().with_preferences(prefs.clone());

        ctx.load_article("b").await;
        ctx.load_article("a").await;
        let ids: Vec<String> = prefs.history().unwrap().into_iter().map(|h| h.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        ctx.search("alpha").await;
        ctx.search("x").await;
        assert_eq!(prefs.recent_searches().unwrap(), vec!["alpha"]);
    }

    #[tokio::test]
    async fn test_locale_from_settings() {
        let prefs = Preferences::new(Storage::in_memory());
        prefs
            .set_settings(&UserSettings {
                locale: Some("de".to_string()),
                ..Default::default()
            })
            .unwrap();

        let ctx = context().with_preferences(prefs);
        assert_eq!(ctx.locale(), "de");
    }

    #[tokio::test]
    async fn test_search_publishes_results() {
        let ctx = context();
        let mut rx = ctx.subscribe_search();

        let results = ctx.search("beta").await;
        assert_eq!(results[0].id, "b");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update()[0].id, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_keeps_last_query() {
        let ctx = context();
        let mut rx = ctx.subscribe_search();

        ctx.search_debounced("alpha");
        tokio::time::sleep(Duration::from_millis(100)).await;
        ctx.search_debounced("beta");

        tokio::time::sleep(Duration::from_millis(400)).await;
        rx.changed().await.unwrap();
        let results = rx.borrow().clone();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "b");
        assert!(!ctx.cancel_search());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_registry_reloads_manifest() {
        let fetcher = MemoryFetcher::with_files([
            (
                "manifest.json",
                r#"{"categories":[{"id":"c","title":"C","articles":[{"slug":"fresh"}]}]}"#,
            ),
            ("articles/fresh.md", "# Fresh"),
        ]);
        let config = LoaderConfig {
            cache_ttl_secs: 1,
            ..Default::default()
        };
        let loader = StaticContentLoader::new(config).with_fetcher(Arc::new(fetcher));
        let ctx = HelpContext::new(loader);

        let article = ctx.load_article("fresh").await.unwrap();
        assert_eq!(article.title, "Fresh");

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(ctx.load_article("fresh").await.is_some());
        assert!(ctx.state().state().is_ready());
    }

    #[tokio::test]
    async fn test_breadcrumbs_in_ready_state() {
        let fetcher = MemoryFetcher::with_files([
            (
                "manifest.json",
                r#"{"categories":[
                    {"id":"root","title":"Root","order":1},
                    {"id":"leaf","title":"Leaf","order":2,"parentId":"root","articles":[{"slug":"x"}]}
                ]}"#,
            ),
            ("articles/x.md", "# X"),
        ]);
        let loader = StaticContentLoader::default().with_fetcher(Arc::new(fetcher));
        let ctx = HelpContext::new(loader);
        ctx.load_manifest().await.unwrap();

        ctx.load_article("x").await;
        let state = ctx.state().state();
        let labels: Vec<&str> = state
            .navigation()
            .unwrap()
            .breadcrumbs
            .iter()
            .map(|b| b.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Root", "Leaf", "X"]);
    }
}
