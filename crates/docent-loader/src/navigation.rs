//! Navigation derivation.
//!
//! Navigation is recomputed from the ordered article list every time an
//! article is opened. Explicit `prevArticle` / `nextArticle` overrides win
//! over list neighbours; breadcrumbs follow the category parent chain.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use docent_core::{
    Article, ArticleStub, Breadcrumb, BreadcrumbKind, Category, NavigationState,
};

/// Compute navigation for `current`.
///
/// `ordered` is the published reading order. `articles` resolves explicit
/// overrides; an override naming an unknown article falls back to the list
/// neighbour.
pub fn derive_navigation(
    current: &Article,
    ordered: &[Arc<Article>],
    articles: &HashMap<String, Arc<Article>>,
    categories: &HashMap<String, Category>,
) -> NavigationState {
    let position = ordered.iter().position(|a| a.id == current.id);

    let neighbour = |offset: isize| -> Option<ArticleStub> {
        let pos = position? as isize + offset;
        usize::try_from(pos)
            .ok()
            .and_then(|p| ordered.get(p))
            .map(|a| ArticleStub::from(a.as_ref()))
    };

    let explicit = |target: Option<&String>, which: &str| -> Option<Option<ArticleStub>> {
        let id = target?;
        match articles.get(id) {
            Some(article) => Some(Some(ArticleStub::from(article.as_ref()))),
            None => {
                log::warn!(
                    "Article '{}' names unknown {which} article '{id}'",
                    current.id
                );
                None
            }
        }
    };

    let prev = explicit(current.metadata.prev_article.as_ref(), "previous")
        .unwrap_or_else(|| neighbour(-1));
    let next = explicit(current.metadata.next_article.as_ref(), "next")
        .unwrap_or_else(|| neighbour(1));

    NavigationState {
        current_article: current.id.clone(),
        prev,
        next,
        breadcrumbs: breadcrumbs(current, categories),
    }
}

/// Root-first category chain ending at `article`.
///
/// Parent links are not guaranteed acyclic; a repeated category ends the
/// walk.
pub fn breadcrumbs(article: &Article, categories: &HashMap<String, Category>) -> Vec<Breadcrumb> {
    let mut trail = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = article.category().and_then(|id| categories.get(id));

    while let Some(category) = cursor {
        if !seen.insert(category.id.as_str()) {
            log::warn!("Category cycle detected at '{}'", category.id);
            break;
        }
        trail.push(Breadcrumb {
            id: category.id.clone(),
            label: category.name.clone(),
            kind: BreadcrumbKind::Category,
        });
        cursor = category
            .parent_id
            .as_deref()
            .and_then(|id| categories.get(id));
    }

    trail.reverse();
    trail.push(Breadcrumb {
        id: article.id.clone(),
        label: article.title.clone(),
        kind: BreadcrumbKind::Article,
    });
    trail
}
