//! The static content loader.
//!
//! [`StaticContentLoader`] owns the article/category registry and the
//! search index. Nothing else mutates them: parsers produce values, the
//! loader stores them.
//!
//! # Lifecycle
//!
//! ```text
//! manifest.json ──fetch──▶ categories ──▶ for each article:
//!                                           probe {prefix}{slug}.{ext}
//!                                           select parser ─▶ parse
//!                                           resolve title / description
//!                                           upsert registry + index
//! ```
//!
//! Failures below the loader boundary never escape `parse_content` or
//! `load_from_manifest`: they are logged and the article is skipped.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use docent_content::markdown::first_h1;
use docent_content::{default_parsers, ContentFormatDetector, ContentParser, ParseContext};
use docent_core::{Article, Category, ContentFormat, Error, NavigationState, Result};
use docent_search::{ContentIndexEntry, SearchIndex, SearchResult, Suggestion};
use serde::Serialize;
use tokio::time::Instant;

use crate::config::LoaderConfig;
use crate::fetch::ContentFetcher;
use crate::manifest::{Manifest, ManifestArticle};
use crate::navigation::derive_navigation;

/// Fallback for articles the registry cannot serve.
///
/// Consulted by [`StaticContentLoader::load_article`] when the registry is
/// stale or does not hold the id.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Produce the article for `id`, or `None` if it does not exist.
    async fn load_article(&self, id: &str) -> Result<Option<Article>>;
}

/// Raw content plus the caller-provided facts about it.
#[derive(Debug, Clone, Default)]
pub struct ParseRequest {
    /// Article id.
    pub id: String,
    /// Raw source text.
    pub content: String,
    /// Source filename, used for parser selection and error messages.
    pub filename: Option<String>,
    /// Category override.
    pub category_id: Option<String>,
    /// Order override.
    pub order: Option<i64>,
    /// Title override.
    pub title: Option<String>,
    /// Description override.
    pub description: Option<String>,
}

impl ParseRequest {
    /// Request to parse `content` as article `id`.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the source filename.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the category.
    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Set the order.
    pub fn order(mut self, order: Option<i64>) -> Self {
        self.order = order;
        self
    }

    /// Set the title.
    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or(&self.id)
    }
}

/// An article that could not be loaded from a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    /// Manifest slug.
    pub slug: String,
    /// Why it was skipped.
    pub message: String,
}

/// Outcome of a manifest load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Ids registered, in manifest order.
    pub loaded: Vec<String>,
    /// Entries that were skipped.
    pub failed: Vec<LoadFailure>,
}

/// Registry of parsed articles and categories.
pub struct StaticContentLoader {
    config: LoaderConfig,
    parsers: Vec<Arc<dyn ContentParser>>,
    detector: ContentFormatDetector,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    source: Option<Arc<dyn ArticleSource>>,
    articles: HashMap<String, Arc<Article>>,
    categories: HashMap<String, Category>,
    index: SearchIndex,
    manifest: Option<Manifest>,
    loaded_at: Option<Instant>,
}

impl std::fmt::Debug for StaticContentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticContentLoader")
            .field("parsers", &self.parser_names())
            .field("fetcher", &self.fetcher.as_ref().map(|f| f.name().to_string()))
            .field("articles", &self.articles.len())
            .field("categories", &self.categories.len())
            .finish()
    }
}

impl Default for StaticContentLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl StaticContentLoader {
    /// Empty loader with the built-in parsers.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            parsers: default_parsers(),
            detector: ContentFormatDetector::new(),
            fetcher: None,
            source: None,
            articles: HashMap::new(),
            categories: HashMap::new(),
            index: SearchIndex::new(),
            manifest: None,
            loaded_at: None,
        }
    }

    /// Fetch manifests and articles with `fetcher`.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Consult `source` for articles the registry cannot serve.
    pub fn with_source(mut self, source: Arc<dyn ArticleSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Whether a fetcher is configured.
    pub fn has_fetcher(&self) -> bool {
        self.fetcher.is_some()
    }

    // ------------------------------------------------------------------
    // Parsers
    // ------------------------------------------------------------------

    /// Add `parser`, replacing any parser for the same format.
    pub fn register_parser(&mut self, parser: Arc<dyn ContentParser>) {
        let format = parser.format();
        match self.parsers.iter_mut().find(|p| p.format() == format) {
            Some(slot) => {
                log::debug!("Replacing {format} parser '{}' with '{}'", slot.name(), parser.name());
                *slot = parser;
            }
            None => self.parsers.push(parser),
        }
    }

    /// Registered parser names, in selection order.
    pub fn parser_names(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    fn parser_for(&self, format: ContentFormat) -> Option<Arc<dyn ContentParser>> {
        self.parsers.iter().find(|p| p.format() == format).cloned()
    }

    /// Pick a parser: the filename's format, then the detected format,
    /// then the first parser whose `can_parse` accepts the content.
    pub fn select_parser(
        &self,
        content: &str,
        filename: Option<&str>,
    ) -> Option<Arc<dyn ContentParser>> {
        if let Some(parser) = filename
            .and_then(ContentFormat::from_filename)
            .and_then(|f| self.parser_for(f))
        {
            return Some(parser);
        }

        if let Some(parser) = self
            .detector
            .detect_from_content(content, None)
            .and_then(|d| self.parser_for(d.format))
        {
            return Some(parser);
        }

        self.parsers
            .iter()
            .find(|p| p.can_parse(content, filename))
            .cloned()
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    /// Parse and register an article, returning the error on failure.
    ///
    /// Re-parsing an id replaces the previous article and its index entry.
    pub fn try_parse_content(&mut self, request: ParseRequest) -> Result<Arc<Article>> {
        let name = request.display_name().to_string();
        let parser = self
            .select_parser(&request.content, request.filename.as_deref())
            .ok_or_else(|| Error::unsupported(&name))?;
        let format = parser.format();

        let mut ctx = ParseContext::new();
        if let Some(filename) = &request.filename {
            ctx = ctx.with_filename(filename);
        }
        if let Some(options) = self.config.parsers.options_for(format) {
            ctx = ctx.with_options(options);
        }

        let parsed = parser.parse(&request.content, &ctx)?;
        for warning in &parsed.warnings {
            log::warn!("{name}: {warning}");
        }

        let mut metadata = parsed.metadata;
        if request.category_id.is_some() {
            metadata.category = request.category_id;
        }
        if request.order.is_some() {
            metadata.order = request.order;
        }

        let title = non_empty(request.title)
            .or_else(|| metadata.custom_str("title").map(String::from))
            .or_else(|| match format {
                ContentFormat::Markdown | ContentFormat::Mdx => {
                    first_h1(&parsed.toc).map(String::from)
                }
                _ => None,
            })
            .unwrap_or_else(|| request.id.clone());
        let description = non_empty(request.description)
            .or_else(|| metadata.custom_str("description").map(String::from));

        let article = Article {
            id: request.id,
            title,
            description,
            content: request.content,
            rendered_content: parsed.html,
            metadata,
            format,
            toc: parsed.toc,
            assets: parsed.assets,
        };

        log::debug!("Parsed '{}' as {format} with '{}'", article.id, parser.name());
        let article = self.insert_article(article);
        self.loaded_at = Some(Instant::now());
        Ok(article)
    }

    /// Parse and register an article; failures are logged and yield `None`.
    pub fn parse_content(&mut self, request: ParseRequest) -> Option<Arc<Article>> {
        let name = request.display_name().to_string();
        match self.try_parse_content(request) {
            Ok(article) => Some(article),
            Err(e) => {
                log::warn!("Skipping {name}: {e}");
                None
            }
        }
    }

    /// Store `article`, replacing any article with the same id.
    ///
    /// Does not refresh the registry's TTL: only parsing and manifest loads
    /// make the registry fresh again.
    pub fn insert_article(&mut self, article: Article) -> Arc<Article> {
        let entry = self.index_entry(&article);
        self.index.upsert(entry);

        let article = Arc::new(article);
        if self
            .articles
            .insert(article.id.clone(), article.clone())
            .is_some()
        {
            log::debug!("Replaced article '{}'", article.id);
        }
        article
    }

    /// Index entry for `article`, labelled with its category's name when
    /// the category is registered.
    fn index_entry(&self, article: &Article) -> ContentIndexEntry {
        let mut entry = ContentIndexEntry::from_article(article);
        if let Some(category) = article.category().and_then(|id| self.categories.get(id)) {
            entry.category = Some(category.name.clone());
        }
        entry
    }

    /// Drop an article and its index entry.
    pub fn remove_article(&mut self, id: &str) -> bool {
        self.index.remove(id);
        self.articles.remove(id).is_some()
    }

    /// Add or replace a category and relabel the index entries of the
    /// articles already filed under it.
    pub fn register_category(&mut self, category: Category) {
        let id = category.id.clone();
        self.categories.insert(id.clone(), category);

        let members: Vec<Arc<Article>> = self
            .articles
            .values()
            .filter(|a| a.category() == Some(id.as_str()))
            .cloned()
            .collect();
        for article in members {
            let entry = self.index_entry(&article);
            self.index.upsert(entry);
        }
    }

    // ------------------------------------------------------------------
    // Manifest loading
    // ------------------------------------------------------------------

    /// Fetch `config.manifest_path` and load everything it lists.
    pub async fn load_manifest(&mut self) -> Result<LoadReport> {
        let fetcher = self.require_fetcher()?;
        let path = self.config.manifest_path.clone();
        let json = fetcher.fetch(&path).await?;
        let manifest = Manifest::from_json(&json, &path)?;
        self.load_from_manifest(&manifest).await
    }

    /// Register the manifest's categories, then fetch and parse each
    /// article.
    ///
    /// Articles that cannot be fetched or parsed are logged and left out;
    /// the rest of the manifest still loads.
    pub async fn load_from_manifest(&mut self, manifest: &Manifest) -> Result<LoadReport> {
        let fetcher = self.require_fetcher()?;
        let mut report = LoadReport::default();

        for entry in &manifest.categories {
            self.register_category(Category::from(entry));
        }

        for category in &manifest.categories {
            for entry in &category.articles {
                let outcome = match self.fetch_article(fetcher.as_ref(), entry).await {
                    Ok((path, content)) => {
                        let request = ParseRequest::new(&entry.slug, content)
                            .filename(path)
                            .category(&category.id)
                            .order(entry.order)
                            .title(entry.title.clone())
                            .description(entry.description.clone());
                        self.try_parse_content(request).map(|a| a.id.clone())
                    }
                    Err(e) => Err(e),
                };

                match outcome {
                    Ok(id) => report.loaded.push(id),
                    Err(e) => {
                        log::warn!("Skipping article '{}': {e}", entry.slug);
                        report.failed.push(LoadFailure {
                            slug: entry.slug.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        log::info!(
            "Loaded {} of {} article(s) from manifest",
            report.loaded.len(),
            manifest.article_count()
        );

        self.manifest = Some(manifest.clone());
        self.loaded_at = Some(Instant::now());
        Ok(report)
    }

    async fn fetch_article(
        &self,
        fetcher: &dyn ContentFetcher,
        entry: &ManifestArticle,
    ) -> Result<(String, String)> {
        let candidates = self
            .config
            .article_paths(&entry.slug, entry.filename.as_deref());
        let mut tried = Vec::with_capacity(candidates.len());

        for path in candidates {
            match fetcher.fetch(&path).await {
                Ok(content) => return Ok((path, content)),
                Err(e) => {
                    log::debug!("{e}");
                    tried.push(path);
                }
            }
        }

        Err(Error::fetch(
            &entry.slug,
            format!("no content found (tried {})", tried.join(", ")),
        ))
    }

    fn require_fetcher(&self) -> Result<Arc<dyn ContentFetcher>> {
        self.fetcher
            .clone()
            .ok_or_else(|| Error::config("no content fetcher configured"))
    }

    /// Last manifest loaded.
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    // ------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------

    /// Whether the registry was filled within the TTL.
    pub fn is_cache_valid(&self) -> bool {
        self.loaded_at
            .is_some_and(|at| at.elapsed() < self.config.cache_ttl())
    }

    /// Forget every article, category, and index entry.
    pub fn clear_cache(&mut self) {
        self.articles.clear();
        self.categories.clear();
        self.index.clear();
        self.manifest = None;
        self.loaded_at = None;
        log::debug!("Content cache cleared");
    }

    /// Serve `id` from the registry while it is fresh, otherwise ask the
    /// configured [`ArticleSource`].
    ///
    /// Returns `None` when neither can provide the article. A stale
    /// registry is bypassed, not emptied.
    pub async fn load_article(&mut self, id: &str) -> Option<Arc<Article>> {
        if self.is_cache_valid() {
            if let Some(article) = self.articles.get(id) {
                return Some(article.clone());
            }
        }

        let Some(source) = self.source.clone() else {
            log::debug!("No article source for '{id}'");
            return None;
        };

        match source.load_article(id).await {
            Ok(Some(article)) => Some(self.insert_article(article)),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Article source failed for '{id}': {e}");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Article by id, regardless of cache freshness.
    pub fn get_article_by_id(&self, id: &str) -> Option<Arc<Article>> {
        self.articles.get(id).cloned()
    }

    /// Every article, ordered by category order, article order, then id.
    pub fn get_all_articles(&self) -> Vec<Arc<Article>> {
        let mut articles: Vec<Arc<Article>> = self.articles.values().cloned().collect();
        articles.sort_by(|a, b| self.compare(a, b));
        articles
    }

    /// Published articles in reading order.
    pub fn published_articles(&self) -> Vec<Arc<Article>> {
        self.get_all_articles()
            .into_iter()
            .filter(|a| a.is_published())
            .collect()
    }

    fn compare(&self, a: &Article, b: &Article) -> Ordering {
        let category_rank = |article: &Article| {
            article
                .category()
                .and_then(|id| self.categories.get(id))
                .map_or(i64::MAX, |c| c.order)
        };
        category_rank(a)
            .cmp(&category_rank(b))
            .then_with(|| a.category().cmp(&b.category()))
            .then_with(|| {
                a.metadata
                    .order
                    .unwrap_or(i64::MAX)
                    .cmp(&b.metadata.order.unwrap_or(i64::MAX))
            })
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Categories ordered by rank, then id.
    pub fn get_categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        categories
    }

    /// Category by id.
    pub fn get_category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Articles in `category_id`, in reading order.
    pub fn articles_by_category(&self, category_id: &str) -> Vec<Arc<Article>> {
        self.get_all_articles()
            .into_iter()
            .filter(|a| a.category() == Some(category_id))
            .collect()
    }

    /// Articles tagged `tag` (case-insensitive), in reading order.
    pub fn articles_by_tag(&self, tag: &str) -> Vec<Arc<Article>> {
        self.get_all_articles()
            .into_iter()
            .filter(|a| a.metadata.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// The articles `id` lists as related, skipping unknown ids.
    pub fn related_articles(&self, id: &str) -> Vec<Arc<Article>> {
        let Some(article) = self.articles.get(id) else {
            return Vec::new();
        };
        article
            .metadata
            .related_articles
            .iter()
            .filter_map(|rel| self.articles.get(rel).cloned())
            .collect()
    }

    /// Ranked search over the content index.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.index.search(query, &self.config.search)
    }

    /// Fuzzy title suggestions.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.index.suggest(query, limit)
    }

    /// Content index (read-only).
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Navigation for `id`, derived from the published reading order.
    pub fn navigation(&self, id: &str) -> Option<NavigationState> {
        let current = self.articles.get(id)?;
        let ordered = self.published_articles();
        Some(derive_navigation(
            current,
            &ordered,
            &self.articles,
            &self.categories,
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use docent_content::{ParsedContent, ParserSettings};
    use std::time::Duration;

    fn loader() -> StaticContentLoader {
        StaticContentLoader::default()
    }

    #[test]
    fn test_markdown_title_from_first_h1() {
        let mut loader = loader();
        let article = loader
            .parse_content(ParseRequest::new("a1", "# Getting Started\n\nBody").filename("a1.md"))
            .unwrap();

        assert_eq!(article.title, "Getting Started");
        assert_eq!(article.format, ContentFormat::Markdown);
        assert!(article.rendered_content.contains(r#"<h1 id="getting-started">"#));
    }

    #[test]
    fn test_title_priority() {
        let mut loader = loader();
        let source = "---\ntitle: From Front Matter\ndescription: Desc\n---\n# Heading";

        let explicit = loader
            .parse_content(
                ParseRequest::new("x", source)
                    .filename("x.md")
                    .title(Some("Explicit".to_string())),
            )
            .unwrap();
        assert_eq!(explicit.title, "Explicit");
        assert_eq!(explicit.description.as_deref(), Some("Desc"));

        let metadata = loader
            .parse_content(ParseRequest::new("y", source).filename("y.md"))
            .unwrap();
        assert_eq!(metadata.title, "From Front Matter");

        let fallback = loader
            .parse_content(ParseRequest::new("z", "plain words").filename("z.md"))
            .unwrap();
        assert_eq!(fallback.title, "z");
    }

    #[test]
    fn test_json_title_does_not_use_headings() {
        let mut loader = loader();
        let json = r#"{"content":[{"type":"heading","level":1,"text":"Heading"}]}"#;
        let article = loader
            .parse_content(ParseRequest::new("j", json).filename("j.json"))
            .unwrap();
        assert_eq!(article.title, "j");
    }

    #[test]
    fn test_reparse_replaces() {
        let mut loader = loader();
        loader.parse_content(ParseRequest::new("a", "# One").filename("a.md"));
        loader.parse_content(ParseRequest::new("a", "# Two").filename("a.md"));

        assert_eq!(loader.get_all_articles().len(), 1);
        assert_eq!(loader.get_article_by_id("a").unwrap().title, "Two");
        assert_eq!(loader.index().len(), 1);
        assert!(loader.search("one").is_empty());
        assert_eq!(loader.search("two")[0].id, "a");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let mut loader = loader();
        let request = ParseRequest::new("a", "---\ntags: [x]\n---\n# Intro\nHello").filename("a.md");

        let first = loader.parse_content(request.clone()).unwrap();
        let second = loader.parse_content(request).unwrap();
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_invalid_json_is_none_but_try_is_err() {
        let mut loader = loader();
        assert!(
            loader
                .parse_content(ParseRequest::new("bad", "{oops").filename("bad.json"))
                .is_none()
        );

        let err = loader
            .try_parse_content(ParseRequest::new("bad", "{oops").filename("bad.json"))
            .unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("bad.json"));
        assert!(loader.get_article_by_id("bad").is_none());
    }

    #[test]
    fn test_select_parser_by_content() {
        let loader = loader();
        let parser = loader.select_parser("a,b\n1,2\n3,4", None).unwrap();
        assert_eq!(parser.format(), ContentFormat::Csv);

        let parser = loader.select_parser("{\"content\": \"<p>x</p>\"}", Some("x.txt")).unwrap();
        assert_eq!(parser.format(), ContentFormat::Json);
    }

    struct ShoutParser;

    impl ContentParser for ShoutParser {
        fn name(&self) -> &str {
            "shout"
        }
        fn format(&self) -> ContentFormat {
            ContentFormat::Markdown
        }
        fn can_parse(&self, _content: &str, _filename: Option<&str>) -> bool {
            true
        }
        fn parse(&self, content: &str, _ctx: &ParseContext) -> Result<ParsedContent> {
            Ok(ParsedContent {
                html: content.to_uppercase(),
                ..Default::default()
            })
        }
    }

    #[test]
    fn test_register_parser_replaces_same_format() {
        let mut loader = loader();
        loader.register_parser(Arc::new(ShoutParser));

        assert_eq!(loader.parser_names(), vec!["shout", "mdx", "json", "csv"]);
        let article = loader
            .parse_content(ParseRequest::new("a", "hi").filename("a.md"))
            .unwrap();
        assert_eq!(article.rendered_content, "HI");
    }

    #[test]
    fn test_parser_settings_flow_into_parsers() {
        let mut config = LoaderConfig::default();
        config.parsers = ParserSettings::default();
        config.parsers.csv.class_name = "kb-table".to_string();

        let mut loader = StaticContentLoader::new(config);
        let article = loader
            .parse_content(ParseRequest::new("t", "a,b\n1,2").filename("t.csv"))
            .unwrap();
        assert!(article.rendered_content.contains("kb-table"));
    }

    #[test]
    fn test_ordering_and_queries() {
        let mut loader = loader();
        loader.register_category(Category::new("later", "Later", 2));
        loader.register_category(Category::new("first", "First", 1));

        let md = |tags: &str, related: &str| {
            format!("---\ntags: [{tags}]\nrelatedArticles: [{related}]\n---\nbody")
        };
        loader.parse_content(
            ParseRequest::new("b", md("Setup", "a, ghost"))
                .filename("b.md")
                .category("first")
                .order(Some(2)),
        );
        loader.parse_content(
            ParseRequest::new("a", md("setup", ""))
                .filename("a.md")
                .category("first")
                .order(Some(1)),
        );
        loader.parse_content(
            ParseRequest::new("c", md("other", ""))
                .filename("c.md")
                .category("later")
                .order(Some(0)),
        );
        loader.parse_content(ParseRequest::new("orphan", md("", "")).filename("o.md"));

        let ids: Vec<String> = loader.get_all_articles().iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "orphan"]);

        let cats: Vec<String> = loader.get_categories().into_iter().map(|c| c.id).collect();
        assert_eq!(cats, vec!["first", "later"]);

        assert_eq!(loader.articles_by_category("first").len(), 2);
        assert_eq!(loader.articles_by_tag("SETUP").len(), 2);

        let related: Vec<String> = loader.related_articles("b").iter().map(|a| a.id.clone()).collect();
        assert_eq!(related, vec!["a"]);
    }

    #[test]
    fn test_navigation_skips_unpublished() {
        let mut loader = loader();
        loader.parse_content(ParseRequest::new("a", "# A").filename("a.md").order(Some(1)));
        loader.parse_content(
            ParseRequest::new("draft", "---\npublished: false\n---\n# D")
                .filename("draft.md")
                .order(Some(2)),
        );
        loader.parse_content(ParseRequest::new("c", "# C").filename("c.md").order(Some(3)));

        let nav = loader.navigation("a").unwrap();
        assert_eq!(nav.next.unwrap().id, "c");
        assert!(loader.navigation("missing").is_none());
    }

    #[test]
    fn test_search_uses_category_name() {
        let mut loader = loader();
        loader.register_category(Category::new("c1", "Billing", 1));
        loader.parse_content(ParseRequest::new("a", "# Refunds").filename("a.md").category("c1"));

        let results = loader.search("billing");
        assert_eq!(results[0].category.as_deref(), Some("Billing"));
    }

    #[test]
    fn test_category_registered_after_article_relabels_index() {
        let mut loader = loader();
        loader.parse_content(ParseRequest::new("a", "# Refunds").filename("a.md").category("c1"));
        assert!(loader.search("billing").is_empty());

        loader.register_category(Category::new("c1", "Billing", 1));
        let results = loader.search("billing");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category.as_deref(), Some("Billing"));

        loader.register_category(Category::new("c1", "Payments", 1));
        assert!(loader.search("billing").is_empty());
        assert_eq!(loader.search("payments")[0].id, "a");
    }

    #[tokio::test]
    async fn test_load_article_missing_returns_none() {
        let mut loader = loader();
        assert!(loader.load_article("missing").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_ttl_bypasses_registry() {
        let mut config = LoaderConfig::default();
        config.cache_ttl_secs = 10;
        let mut loader = StaticContentLoader::new(config);
        loader.parse_content(ParseRequest::new("a", "# A").filename("a.md"));

        assert!(loader.is_cache_valid());
        assert!(loader.load_article("a").await.is_some());

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(!loader.is_cache_valid());
        assert!(loader.load_article("a").await.is_none());
        // bypassed, not emptied
        assert!(loader.get_article_by_id("a").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_fallback_does_not_refresh_stale_registry() {
        let mut config = LoaderConfig::default();
        config.cache_ttl_secs = 10;
        let mut loader = StaticContentLoader::new(config).with_source(Arc::new(FixedSource));
        loader.parse_content(ParseRequest::new("a", "# A").filename("a.md"));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(loader.load_article("remote").await.is_some());

        assert!(!loader.is_cache_valid());
        assert!(loader.load_article("a").await.is_none());

        loader.parse_content(ParseRequest::new("b", "# B").filename("b.md"));
        assert!(loader.is_cache_valid());
        assert!(loader.load_article("a").await.is_some());
    }

    struct FixedSource;

    #[async_trait]
    impl ArticleSource for FixedSource {
        async fn load_article(&self, id: &str) -> Result<Option<Article>> {
            if id != "remote" {
                return Ok(None);
            }
            Ok(Some(Article {
                id: id.to_string(),
                title: "Remote".to_string(),
                description: None,
                content: String::new(),
                rendered_content: "<p>from elsewhere</p>".to_string(),
                metadata: Default::default(),
                format: ContentFormat::Html,
                toc: Vec::new(),
                assets: Vec::new(),
            }))
        }
    }

    #[tokio::test]
    async fn test_load_article_falls_through_to_source() {
        let mut loader = loader().with_source(Arc::new(FixedSource));

        let article = loader.load_article("remote").await.unwrap();
        assert_eq!(article.title, "Remote");
        assert_eq!(loader.search("elsewhere")[0].id, "remote");
        assert!(loader.load_article("other").await.is_none());
    }

    #[tokio::test]
    async fn test_load_from_manifest_skips_failures() {
        let fetcher = MemoryFetcher::with_files([
            ("articles/ok.mdx", "# Found via probing"),
            ("articles/custom/file.md", "# Explicit"),
            ("articles/broken.json", "{nope"),
        ]);
        let manifest = Manifest::from_json(
            r#"{"categories":[{"id":"c","title":"C","order":1,"articles":[
                {"slug":"ok","order":1},
                {"slug":"explicit","filename":"custom/file.md","order":2},
                {"slug":"missing","order":3},
                {"slug":"broken","order":4}
            ]}]}"#,
            "manifest.json",
        )
        .unwrap();

        let mut loader = loader().with_fetcher(Arc::new(fetcher));
        let report = loader.load_from_manifest(&manifest).await.unwrap();

        assert_eq!(report.loaded, vec!["ok", "explicit"]);
        let failed: Vec<&str> = report.failed.iter().map(|f| f.slug.as_str()).collect();
        assert_eq!(failed, vec!["missing", "broken"]);
        assert_eq!(loader.get_article_by_id("ok").unwrap().format, ContentFormat::Mdx);
        assert_eq!(loader.get_article_by_id("explicit").unwrap().title, "Explicit");
        assert!(loader.manifest().is_some());
    }

    #[tokio::test]
    async fn test_manifest_without_fetcher_is_config_error() {
        let mut loader = loader();
        let err = loader.load_manifest().await.unwrap_err();
        assert!(err.to_string().contains("fetcher"));
    }

    #[test]
    fn test_clear_cache() {
        let mut loader = loader();
        loader.register_category(Category::new("c", "C", 0));
        loader.parse_content(ParseRequest::new("a", "# A").filename("a.md"));

        loader.clear_cache();
        assert!(loader.get_all_articles().is_empty());
        assert!(loader.get_categories().is_empty());
        assert!(loader.index().is_empty());
        assert!(!loader.is_cache_valid());
    }

    #[test]
    fn test_remove_article() {
        let mut loader = loader();
        loader.parse_content(ParseRequest::new("a", "# A").filename("a.md"));
        assert!(loader.remove_article("a"));
        assert!(!loader.remove_article("a"));
        assert!(loader.index().is_empty());
    }
}
