//! Content index entries.
//!
//! A [`ContentIndexEntry`] is the flattened, HTML-stripped view of one
//! article that the scorer works against. Entries are rebuilt whenever the
//! article they mirror is (re)loaded.
//!
//! ```rust
//! use docent_search::ContentIndexEntry;
//!
//! let entry = ContentIndexEntry::builder()
//!     .id("getting-started")
//!     .title("Getting Started")
//!     .content("Install the tool, then run it.")
//!     .category("Basics")
//!     .build();
//!
//! assert_eq!(entry.score("getting"), 15);
//! ```

use docent_content::html::strip_html;
use docent_core::Article;
use serde::{Deserialize, Serialize};

/// Title contains the query.
pub const TITLE_MATCH: u32 = 10;
/// Title starts with the query (on top of [`TITLE_MATCH`]).
pub const TITLE_PREFIX: u32 = 5;
/// Body contains the query.
pub const BODY_MATCH: u32 = 5;
/// Any tag contains the query.
pub const TAG_MATCH: u32 = 3;
/// Category contains the query.
pub const CATEGORY_MATCH: u32 = 2;

/// One searchable article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentIndexEntry {
    /// Article id.
    pub id: String,
    /// Article title.
    pub title: String,
    /// Plain text body.
    pub content: String,
    /// Category label.
    pub category: Option<String>,
    /// Article tags.
    pub tags: Vec<String>,
}

impl ContentIndexEntry {
    /// Create a new entry builder.
    pub fn builder() -> ContentIndexEntryBuilder {
        ContentIndexEntryBuilder::default()
    }

    /// Build an entry from a parsed article.
    ///
    /// The body is the article's rendered markup with tags stripped; the
    /// category is the raw category id. Callers that know the category's
    /// display name overwrite `category` with it and re-upsert the entry
    /// whenever that name changes.
    pub fn from_article(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            content: strip_html(&article.rendered_content),
            category: article.metadata.category.clone(),
            tags: article.metadata.tags.clone(),
        }
    }

    /// Additive relevance score for `query` (case-insensitive).
    ///
    /// Zero means no field matched.
    pub fn score(&self, query: &str) -> u32 {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return 0;
        }

        let mut score = 0;

        let title = self.title.to_lowercase();
        if title.contains(&query) {
            score += TITLE_MATCH;
            if title.starts_with(&query) {
                score += TITLE_PREFIX;
            }
        }

        if self.content.to_lowercase().contains(&query) {
            score += BODY_MATCH;
        }

        if self.tags.iter().any(|t| t.to_lowercase().contains(&query)) {
            score += TAG_MATCH;
        }

        if self
            .category
            .as_ref()
            .is_some_and(|c| c.to_lowercase().contains(&query))
        {
            score += CATEGORY_MATCH;
        }

        score
    }

    /// A window of the body centered on the first occurrence of `query`.
    ///
    /// Falls back to the start of the body when only other fields matched.
    pub fn snippet(&self, query: &str, length: usize) -> String {
        extract_snippet(&self.content, query.trim(), length)
    }
}

/// Cut `length` characters out of `text` around the first case-insensitive
/// occurrence of `query`, adding `...` on each truncated side.
///
/// Whitespace runs are collapsed first. Operates on characters, so
/// multi-byte text is never split mid-codepoint.
pub fn extract_snippet(text: &str, query: &str, length: usize) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= length {
        return normalized;
    }

    let haystack: Vec<char> = chars.iter().copied().map(fold).collect();
    let needle: Vec<char> = query.chars().map(fold).collect();
    let pos = find(&haystack, &needle).unwrap_or(0);

    let lead = (length - needle.len().min(length)) / 2;
    let end = (pos.saturating_sub(lead) + length).min(chars.len());
    let start = end.saturating_sub(length);

    let mut snippet = String::with_capacity(length + 6);
    if start > 0 {
        snippet.push_str("...");
    }
    snippet.extend(&chars[start..end]);
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Builder for [`ContentIndexEntry`].
#[derive(Debug, Default)]
pub struct ContentIndexEntryBuilder {
    entry: ContentIndexEntry,
}

impl ContentIndexEntryBuilder {
    /// Set the article id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.entry.id = id.into();
        self
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.entry.title = title.into();
        self
    }

    /// Set the plain-text body.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.entry.content = content.into();
        self
    }

    /// Set the category label.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.entry.category = Some(category.into());
        self
    }

    /// Set the tags.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.entry.tags = tags;
        self
    }

    /// Build the entry.
    pub fn build(self) -> ContentIndexEntry {
        self.entry
    }
}

// ============================================================================
// Tests
// ============================================================================
