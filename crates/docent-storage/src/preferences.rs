//! Per-user help-center state: bookmarks, reading history, recent
//! searches, and display settings.
//!
//! All of it lives in a [`Storage`] namespace and is independent of the
//! content registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Storage;

const BOOKMARKS_KEY: &str = "bookmarks";
const HISTORY_KEY: &str = "history";
const RECENT_SEARCHES_KEY: &str = "recent-searches";
const SETTINGS_KEY: &str = "settings";

/// Maximum history entries kept.
pub const HISTORY_LIMIT: usize = 50;
/// Maximum recent searches kept.
pub const RECENT_SEARCH_LIMIT: usize = 10;

/// One visited article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Article id.
    pub id: String,
    /// Title at the time of the visit.
    pub title: String,
    /// When the article was opened.
    pub visited_at: DateTime<Utc>,
}

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the host.
    #[default]
    System,
    /// Light scheme.
    Light,
    /// Dark scheme.
    Dark,
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Preferred locale, e.g. `fr-CA`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Colour scheme.
    #[serde(default)]
    pub theme: Theme,

    /// Base font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: u8,

    /// Show the table of contents beside articles.
    #[serde(default = "default_true")]
    pub show_toc: bool,
}

fn default_font_size() -> u8 {
    16
}

fn default_true() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            locale: None,
            theme: Theme::default(),
            font_size: default_font_size(),
            show_toc: true,
        }
    }
}

/// Typed access to the user's stored preferences.
#[derive(Debug, Clone)]
pub struct Preferences {
    storage: Storage,
}

impl Preferences {
    /// Preferences stored in `storage`.
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Underlying storage.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // ------------------------------------------------------------------
    // Bookmarks
    // ------------------------------------------------------------------

    /// Bookmarked article ids, oldest first.
    pub fn bookmarks(&self) -> Result<Vec<String>> {
        Ok(self.storage.get(BOOKMARKS_KEY)?.unwrap_or_default())
    }

    /// Whether `id` is bookmarked.
    pub fn is_bookmarked(&self, id: &str) -> Result<bool> {
        Ok(self.bookmarks()?.iter().any(|b| b == id))
    }

    /// Flip the bookmark for `id` and return the new state.
    pub fn toggle_bookmark(&self, id: &str) -> Result<bool> {
        let mut bookmarks = self.bookmarks()?;
        let bookmarked = match bookmarks.iter().position(|b| b == id) {
            Some(pos) => {
                bookmarks.remove(pos);
                false
            }
            None => {
                bookmarks.push(id.to_string());
                true
            }
        };
        self.storage.set(BOOKMARKS_KEY, &bookmarks)?;
        Ok(bookmarked)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Visited articles, most recent first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.storage.get(HISTORY_KEY)?.unwrap_or_default())
    }

    /// Record a visit to `id` now.
    pub fn record_visit(&self, id: &str, title: &str) -> Result<()> {
        self.record_visit_at(id, title, Utc::now())
    }

    /// Record a visit at an explicit time.
    ///
    /// An earlier visit to the same article is moved to the front rather
    /// than duplicated.
    pub fn record_visit_at(&self, id: &str, title: &str, at: DateTime<Utc>) -> Result<()> {
        let mut history = self.history()?;
        history.retain(|h| h.id != id);
        history.insert(
            0,
            HistoryEntry {
                id: id.to_string(),
                title: title.to_string(),
                visited_at: at,
            },
        );
        history.truncate(HISTORY_LIMIT);
        self.storage.set(HISTORY_KEY, &history)
    }

    /// Forget all visits.
    pub fn clear_history(&self) -> Result<()> {
        self.storage.remove(HISTORY_KEY)
    }

    // ------------------------------------------------------------------
    // Recent searches
    // ------------------------------------------------------------------

    /// Recent queries, most recent first.
    pub fn recent_searches(&self) -> Result<Vec<String>> {
        Ok(self.storage.get(RECENT_SEARCHES_KEY)?.unwrap_or_default())
    }

    /// Remember `query`. Blank queries are ignored; repeats (ignoring
    /// case) move to the front.
    pub fn record_search(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let mut recent = self.recent_searches()?;
        let lowered = query.to_lowercase();
        recent.retain(|q| q.to_lowercase() != lowered);
        recent.insert(0, query.to_string());
        recent.truncate(RECENT_SEARCH_LIMIT);
        self.storage.set(RECENT_SEARCHES_KEY, &recent)
    }

    /// Forget all recent searches.
    pub fn clear_recent_searches(&self) -> Result<()> {
        self.storage.remove(RECENT_SEARCHES_KEY)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Stored settings, or defaults.
    pub fn settings(&self) -> Result<UserSettings> {
        Ok(self.storage.get(SETTINGS_KEY)?.unwrap_or_default())
    }

    /// Replace the stored settings.
    pub fn set_settings(&self, settings: &UserSettings) -> Result<()> {
        self.storage.set(SETTINGS_KEY, settings)
    }

    /// Read, modify, and store the settings.
    pub fn update_settings(&self, f: impl FnOnce(&mut UserSettings)) -> Result<UserSettings> {
        let mut settings = self.settings()?;
        f(&mut settings);
        self.set_settings(&settings)?;
        Ok(settings)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn prefs() -> Preferences {
        Preferences::new(Storage::in_memory())
    }

    #[test]
    fn test_toggle_bookmark() {
        let prefs = prefs();
        assert!(prefs.toggle_bookmark("a1").unwrap());
        assert!(prefs.toggle_bookmark("a2").unwrap());
        assert!(prefs.is_bookmarked("a1").unwrap());

        assert!(!prefs.toggle_bookmark("a1").unwrap());
        assert_eq!(prefs.bookmarks().unwrap(), vec!["a2"]);
    }

    #[test]
    fn test_history_most_recent_first_without_duplicates() {
        let prefs = prefs();
        let t = |s| Utc.timestamp_opt(s, 0).unwrap();

        prefs.record_visit_at("a", "A", t(1)).unwrap();
        prefs.record_visit_at("b", "B", t(2)).unwrap();
        prefs.record_visit_at("a", "A again", t(3)).unwrap();

        let history = prefs.history().unwrap();
        let ids: Vec<&str> = history.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(history[0].title, "A again");
        assert_eq!(history[0].visited_at, t(3));
    }

    #[test]
    fn test_history_capped() {
        let prefs = prefs();
        for i in 0..(HISTORY_LIMIT + 5) {
            prefs.record_visit(&format!("a{i}"), "t").unwrap();
        }

        let history = prefs.history().unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].id, format!("a{}", HISTORY_LIMIT + 4));

        prefs.clear_history().unwrap();
        assert!(prefs.history().unwrap().is_empty());
    }

    #[test]
    fn test_recent_searches() {
        let prefs = prefs();
        prefs.record_search("install").unwrap();
        prefs.record_search("   ").unwrap();
        prefs.record_search("billing").unwrap();
        prefs.record_search(" Install ").unwrap();

        assert_eq!(prefs.recent_searches().unwrap(), vec!["Install", "billing"]);

        for i in 0..20 {
            prefs.record_search(&format!("q{i}")).unwrap();
        }
        let recent = prefs.recent_searches().unwrap();
        assert_eq!(recent.len(), RECENT_SEARCH_LIMIT);
        assert_eq!(recent[0], "q19");

        prefs.clear_recent_searches().unwrap();
        assert!(prefs.recent_searches().unwrap().is_empty());
    }

    #[test]
    fn test_settings_default_and_update() {
        let prefs = prefs();
        assert_eq!(prefs.settings().unwrap(), UserSettings::default());

        let updated = prefs
            .update_settings(|s| {
                s.theme = Theme::Dark;
                s.locale = Some("fr-CA".to_string());
            })
            .unwrap();
        assert_eq!(updated.theme, Theme::Dark);
        assert_eq!(prefs.settings().unwrap().locale.as_deref(), Some("fr-CA"));
        assert_eq!(prefs.settings().unwrap().font_size, 16);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let storage = Storage::in_memory();
        storage
            .set("settings", &serde_json::json!({"theme": "light"}))
            .unwrap();

        let settings = Preferences::new(storage).settings().unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert!(settings.show_toc);
    }
}
