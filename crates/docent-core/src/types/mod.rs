//! The docent data model.
//!
//! - [`article`]: articles, their metadata, and referenced assets
//! - [`category`]: article categories
//! - [`format`]: supported content formats
//! - [`navigation`]: derived prev/next/breadcrumb state
//! - [`toc`]: table-of-contents entries and the flat-to-tree builder

pub mod article;
pub mod category;
pub mod format;
pub mod navigation;
pub mod toc;

pub use article::{Article, ArticleMetadata, Asset, AssetKind};
pub use category::Category;
pub use format::ContentFormat;
pub use navigation::{ArticleStub, Breadcrumb, BreadcrumbKind, NavigationState};
pub use toc::{build_toc, flatten_toc, TocEntry};
