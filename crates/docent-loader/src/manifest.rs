//! The `manifest.json` model.
//!
//! ```json
//! {
//!   "title": "Help Center",
//!   "version": "1.0",
//!   "categories": [
//!     {
//!       "id": "c1", "title": "Basics", "order": 1,
//!       "articles": [{ "slug": "a1", "title": "Intro", "order": 1 }]
//!     }
//!   ]
//! }
//! ```

use docent_core::{Category, Error, Result};
use serde::{Deserialize, Serialize};

/// Top-level content index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Site title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Site description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Categories with their articles.
    #[serde(default)]
    pub categories: Vec<ManifestCategory>,
}

/// A category entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestCategory {
    /// Category id.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Optional summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display rank.
    #[serde(default)]
    pub order: i64,

    /// Parent category id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Icon name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Articles in this category.
    #[serde(default)]
    pub articles: Vec<ManifestArticle>,
}

/// An article entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestArticle {
    /// Article id and filename stem.
    pub slug: String,

    /// Title override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Exact file to load, skipping extension probing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Display rank within the category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Manifest {
    /// Parse manifest JSON; `source` names the file in errors.
    pub fn from_json(json: &str, source: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::parse(source, e.to_string()))
    }

    /// Total number of article entries.
    pub fn article_count(&self) -> usize {
        self.categories.iter().map(|c| c.articles.len()).sum()
    }
}

impl From<&ManifestCategory> for Category {
    fn from(entry: &ManifestCategory) -> Self {
        let mut category = Category::new(&entry.id, &entry.title, entry.order);
        category.description = entry.description.clone();
        category.parent_id = entry.parent_id.clone();
        category.icon = entry.icon.clone();
        category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_manifest() {
        let json = r#"{"categories":[{"id":"c1","title":"Cat","order":1,"articles":[{"slug":"a1","title":"Intro","order":1}]}]}"#;
        let manifest = Manifest::from_json(json, "manifest.json").unwrap();

        assert_eq!(manifest.categories.len(), 1);
        assert_eq!(manifest.article_count(), 1);
        let article = &manifest.categories[0].articles[0];
        assert_eq!(article.slug, "a1");
        assert_eq!(article.title.as_deref(), Some("Intro"));
        assert!(article.filename.is_none());
    }

    #[test]
    fn test_optional_fields_default() {
        let manifest = Manifest::from_json(r#"{"categories":[{"id":"c","title":"C"}]}"#, "m").unwrap();
        assert!(manifest.title.is_none());
        assert_eq!(manifest.categories[0].order, 0);
        assert!(manifest.categories[0].articles.is_empty());
    }

    #[test]
    fn test_invalid_manifest_names_source() {
        let err = Manifest::from_json("{", "help/manifest.json").unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("help/manifest.json"));
    }

    #[test]
    fn test_category_conversion() {
        let entry = ManifestCategory {
            id: "child".to_string(),
            title: "Child".to_string(),
            description: Some("d".to_string()),
            order: 3,
            parent_id: Some("root".to_string()),
            icon: None,
            articles: Vec::new(),
        };
        let category = Category::from(&entry);
        assert_eq!(category.name, "Child");
        assert_eq!(category.parent_id.as_deref(), Some("root"));
        assert_eq!(category.order, 3);
    }
}
