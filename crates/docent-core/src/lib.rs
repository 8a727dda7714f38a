//! Docent Core: shared types, errors, and utilities.
//!
//! This crate provides the foundational types used across all docent
//! crates. It has no internal docent dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error type and Result alias
//! - [`types`]: Articles, categories, TOC entries, formats, navigation
//! - [`state`]: Reactive content view state (idle/loading/ready/error)
//! - [`i18n`]: Locale-keyed message registry with fallback
//! - [`util`]: ID and slug utilities

pub mod error;
pub mod i18n;
pub mod state;
pub mod types;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use i18n::Translations;
pub use state::{ContentState, StateHandle};
pub use types::{
    build_toc, flatten_toc, Article, ArticleMetadata, ArticleStub, Asset, AssetKind, Breadcrumb,
    BreadcrumbKind, Category, ContentFormat, NavigationState, TocEntry,
};

// Convenience re-exports from util
pub use util::ids::{id_from_path, normalize_id, slugify, SlugGenerator};
