//! In-memory content index.
//!
//! Entries keep their insertion position: replacing an entry for an
//! existing id updates it in place, so ranking ties stay in index order
//! across reloads.

use crate::entry::ContentIndexEntry;
use crate::types::{SearchConfig, SearchResult, Suggestion};

/// Minimum similarity for a title to be offered as a suggestion.
pub const SUGGEST_THRESHOLD: f64 = 0.75;

/// Flat, ordered collection of [`ContentIndexEntry`] values.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<ContentIndexEntry>,
}

impl SearchIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry`, replacing any entry with the same id.
    pub fn upsert(&mut self, entry: ContentIndexEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove the entry for `id`. Returns whether one existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entry for `id`.
    pub fn get(&self, id: &str) -> Option<&ContentIndexEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries in index order.
    pub fn entries(&self) -> &[ContentIndexEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank entries against `query`.
    ///
    /// Queries shorter than `config.min_query_length` yield nothing. Only
    /// entries with a nonzero score are returned, highest first; equal
    /// scores keep index order.
    pub fn search(&self, query: &str, config: &SearchConfig) -> Vec<SearchResult> {
        let query = query.trim();
        if query.chars().count() < config.min_query_length {
            log::debug!("search query '{query}' below minimum length");
            return Vec::new();
        }

        let mut scored: Vec<(u32, &ContentIndexEntry)> = self
            .entries
            .iter()
            .filter_map(|e| {
                let score = e.score(query);
                (score > 0).then_some((score, e))
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(config.max_results);

        log::debug!("search '{query}': {} hit(s)", scored.len());

        scored
            .into_iter()
            .map(|(score, e)| SearchResult {
                id: e.id.clone(),
                title: e.title.clone(),
                category: e.category.clone(),
                snippet: e.snippet(query, config.snippet_length),
                score,
            })
            .collect()
    }

    /// Titles that look like `query`, for "did you mean" prompts.
    ///
    /// Compares the query against whole titles and individual title words
    /// with Jaro-Winkler similarity and keeps the best `limit` above
    /// [`SUGGEST_THRESHOLD`].
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut suggestions: Vec<Suggestion> = self
            .entries
            .iter()
            .filter_map(|e| {
                let title = e.title.to_lowercase();
                let similarity = title
                    .split_whitespace()
                    .map(|word| strsim::jaro_winkler(&query, word))
                    .fold(strsim::jaro_winkler(&query, &title), f64::max);
                (similarity >= SUGGEST_THRESHOLD).then(|| Suggestion {
                    id: e.id.clone(),
                    title: e.title.clone(),
                    similarity,
                })
            })
            .collect();

        suggestions.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        suggestions.truncate(limit);
        suggestions
    }
}

impl FromIterator<ContentIndexEntry> for SearchIndex {
    fn from_iter<T: IntoIterator<Item = ContentIndexEntry>>(iter: T) -> Self {
        let mut index = SearchIndex::new();
        for entry in iter {
            index.upsert(entry);
        }
        index
    }
}

// ============================================================================
// Tests
// ============================================================================
