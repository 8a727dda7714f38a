//! Derived navigation state.
//!
//! Navigation is recomputed from the ordered article list whenever an
//! article is opened; it is never stored as a source of truth.

use serde::{Deserialize, Serialize};

use super::article::Article;

/// Minimal reference to a neighbouring article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStub {
    /// Article id.
    pub id: String,
    /// Article title.
    pub title: String,
}

impl From<&Article> for ArticleStub {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
        }
    }
}

/// What a breadcrumb points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreadcrumbKind {
    /// A category in the parent chain.
    Category,
    /// The current article.
    Article,
}

/// One step of the breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Category or article id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Target kind.
    pub kind: BreadcrumbKind,
}

/// Where the reader currently is and where they can go next.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    /// Id of the open article.
    pub current_article: String,
    /// Previous article, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<ArticleStub>,
    /// Next article, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<ArticleStub>,
    /// Root-first breadcrumb trail ending at the current article.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
}
