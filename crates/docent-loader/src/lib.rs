//! Content loading for Docent.
//!
//! The [`StaticContentLoader`] reads a `manifest.json`, fetches each listed
//! article (probing `{prefix}{slug}.{ext}` for each configured extension),
//! parses it with the matching parser, and keeps the results in a registry
//! with a search index. [`HelpContext`] wraps a loader for interactive use:
//! it publishes load state and search results to subscribers.
//!
//! # Modules
//!
//! - [`config`]: [`LoaderConfig`]
//! - [`manifest`]: the manifest model
//! - [`fetch`]: where raw content comes from
//! - [`loader`]: the registry
//! - [`navigation`]: prev/next and breadcrumbs
//! - [`context`]: the reactive state layer
//! - [`offline`]: the offline cache and caching fetcher
//! - [`sw`]: service worker script generation
//!
//! # Example
//!
//! ```rust
//! use docent_loader::{ParseRequest, StaticContentLoader};
//!
//! let mut loader = StaticContentLoader::default();
//! let article = loader
//!     .parse_content(ParseRequest::new("intro", "# Welcome\n\nHello").filename("intro.md"))
//!     .unwrap();
//!
//! assert_eq!(article.title, "Welcome");
//! assert_eq!(loader.search("hello")[0].id, "intro");
//! ```

pub mod config;
pub mod context;
pub mod fetch;
pub mod loader;
pub mod manifest;
pub mod navigation;
pub mod offline;
pub mod sw;

pub use config::LoaderConfig;
pub use context::{default_translations, HelpContext, NOT_FOUND_KEY};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{ContentFetcher, FsFetcher, MemoryFetcher};
pub use loader::{ArticleSource, LoadFailure, LoadReport, ParseRequest, StaticContentLoader};
pub use manifest::{Manifest, ManifestArticle, ManifestCategory};
pub use navigation::{breadcrumbs, derive_navigation};
pub use offline::{CachingFetcher, OfflineCache};
pub use sw::ServiceWorkerScript;
