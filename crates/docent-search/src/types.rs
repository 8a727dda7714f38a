//! Common search types.
//!
//! Configuration and result shapes shared by the index, the scorer, and the
//! debouncer.

use serde::{Deserialize, Serialize};

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters, after trimming) return
    /// no results.
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    /// Maximum results returned by a single query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Snippet window in characters.
    #[serde(default = "default_snippet_length")]
    pub snippet_length: usize,

    /// Quiet period before a debounced search fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_min_query_length() -> usize {
    2
}

fn default_max_results() -> usize {
    10
}

fn default_snippet_length() -> usize {
    150
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: default_min_query_length(),
            max_results: default_max_results(),
            snippet_length: default_snippet_length(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// A single ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Article id.
    pub id: String,

    /// Article title.
    pub title: String,

    /// Category label, if the article has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Text window around the first body match.
    pub snippet: String,

    /// Additive relevance score (higher is better).
    pub score: u32,
}

/// A fuzzy title match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Article id.
    pub id: String,

    /// Article title.
    pub title: String,

    /// Similarity in `0.0..=1.0`.
    pub similarity: f64,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_config_default() {
        let config = SearchConfig::default();
        assert_eq!(config.min_query_length, 2);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.snippet_length, 150);
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn test_search_config_serialization() {
        let config = SearchConfig {
            max_results: 25,
            ..Default::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"max_results\":25"));
        assert!(json.contains("\"debounce_ms\":300"));
    }

    #[test]
    fn test_search_config_deserialization_with_defaults() {
        let config: SearchConfig = serde_json::from_str(r#"{"min_query_length": 3}"#).unwrap();

        assert_eq!(config.min_query_length, 3);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.snippet_length, 150);
    }

    #[test]
    fn test_search_result_skips_missing_category() {
        let result = SearchResult {
            id: "a1".to_string(),
            title: "Intro".to_string(),
            category: None,
            snippet: "Hello".to_string(),
            score: 15,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"score\":15"));
        assert!(!json.contains("category"));
    }
}
