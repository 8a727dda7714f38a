//! Articles and their metadata.
//!
//! An [`Article`] is produced once per successful parse and is never edited
//! in place: re-parsing the same id replaces the whole value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::format::ContentFormat;
use super::toc::TocEntry;

/// A parsed help article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique identifier, assigned by the caller.
    pub id: String,
    /// Resolved display title.
    pub title: String,
    /// Optional summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw source text as loaded.
    pub content: String,
    /// Markup produced by the parser.
    pub rendered_content: String,
    /// Structured metadata.
    #[serde(default)]
    pub metadata: ArticleMetadata,
    /// Format the content was parsed as.
    pub format: ContentFormat,
    /// Heading tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toc: Vec<TocEntry>,
    /// Images and links referenced by the content.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<Asset>,
}

impl Article {
    /// Whether the article should be listed and navigable.
    pub fn is_published(&self) -> bool {
        self.metadata.published
    }

    /// Category id, if assigned.
    pub fn category(&self) -> Option<&str> {
        self.metadata.category.as_deref()
    }
}

/// Optional structured fields attached to an article.
///
/// Keys outside the standard set are kept verbatim in `custom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    /// Content version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Display rank within the category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Explicit previous-article override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_article: Option<String>,
    /// Explicit next-article override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_article: Option<String>,
    /// ISO-8601 creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// ISO-8601 update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Owning category id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Tags, de-duplicated in first-seen order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Author name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Ids of related articles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_articles: Vec<String>,
    /// URL-safe identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Whether the article is published.
    #[serde(default = "default_published")]
    pub published: bool,
    /// Format-specific extensions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, Value>,
}

fn default_published() -> bool {
    true
}

impl Default for ArticleMetadata {
    fn default() -> Self {
        Self {
            version: None,
            order: None,
            prev_article: None,
            next_article: None,
            created_at: None,
            updated_at: None,
            category: None,
            tags: Vec::new(),
            author: None,
            related_articles: Vec::new(),
            slug: None,
            published: default_published(),
            custom: BTreeMap::new(),
        }
    }
}

impl ArticleMetadata {
    /// Map loosely-typed key/value pairs (front-matter, JSON metadata) onto
    /// the standard metadata shape.
    ///
    /// Both camelCase and snake_case spellings of the standard keys are
    /// accepted. Values of the wrong shape are coerced where unambiguous
    /// (numbers to version strings, comma strings to tag lists) and
    /// otherwise kept in `custom`.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut meta = ArticleMetadata::default();

        for (key, value) in map {
            let handled = match key.as_str() {
                "version" => set(&mut meta.version, scalar_string(&value)),
                "order" => set(&mut meta.order, integer(&value)),
                "prevArticle" | "prev_article" | "prev" => {
                    set(&mut meta.prev_article, scalar_string(&value))
                }
                "nextArticle" | "next_article" | "next" => {
                    set(&mut meta.next_article, scalar_string(&value))
                }
                "createdAt" | "created_at" | "date" => {
                    set(&mut meta.created_at, scalar_string(&value))
                }
                "updatedAt" | "updated_at" => set(&mut meta.updated_at, scalar_string(&value)),
                "category" => set(&mut meta.category, scalar_string(&value)),
                "tags" => string_list(&value).map(|tags| meta.tags = dedupe(tags)).is_some(),
                "author" => set(&mut meta.author, scalar_string(&value)),
                "relatedArticles" | "related_articles" | "related" => string_list(&value)
                    .map(|ids| meta.related_articles = dedupe(ids))
                    .is_some(),
                "slug" => set(&mut meta.slug, scalar_string(&value)),
                "published" => boolean(&value).map(|b| meta.published = b).is_some(),
                _ => false,
            };

            if !handled {
                meta.custom.insert(key, value);
            }
        }

        meta
    }

    /// A string value from `custom`.
    pub fn custom_str(&self, key: &str) -> Option<&str> {
        self.custom.get(key).and_then(Value::as_str)
    }
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(scalar_string).collect()),
        Value::String(s) => Some(
            s.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        ),
        _ => None,
    }
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Kind of referenced asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// An embedded image.
    Image,
    /// A hyperlink.
    Link,
}

/// A URL referenced by article content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// What kind of reference this is.
    pub kind: AssetKind,
    /// Target URL as written.
    pub url: String,
    /// Alt text (images) or title (links), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Asset {
    /// Whether the URL points off-site.
    pub fn is_external(&self) -> bool {
        is_external_url(&self.url)
    }
}

/// `http://` and `https://` URLs are external.
pub fn is_external_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
