//! Client-side search for Docent.
//!
//! A flat [`SearchIndex`] of HTML-stripped article text, scored with simple
//! additive substring signals:
//!
//! | Signal | Points |
//! |--------|--------|
//! | title contains query | 10 |
//! | title starts with query | +5 |
//! | body contains query | 5 |
//! | a tag contains query | 3 |
//! | category contains query | 2 |
//!
//! Results with a zero score are dropped; the rest are sorted (stably) by
//! score and truncated to [`SearchConfig::max_results`]. Queries shorter
//! than [`SearchConfig::min_query_length`] return nothing.
//!
//! # Example
//!
//! ```rust
//! use docent_search::{ContentIndexEntry, SearchConfig, SearchIndex};
//!
//! let mut index = SearchIndex::new();
//! index.upsert(
//!     ContentIndexEntry::builder()
//!         .id("reset")
//!         .title("Password reset")
//!         .content("Follow the emailed link.")
//!         .build(),
//! );
//!
//! let results = index.search("password", &SearchConfig::default());
//! assert_eq!(results[0].id, "reset");
//! ```

pub mod debounce;
pub mod entry;
pub mod index;
pub mod types;

pub use debounce::Debouncer;
pub use entry::{extract_snippet, ContentIndexEntry, ContentIndexEntryBuilder};
pub use index::SearchIndex;
pub use types::{SearchConfig, SearchResult, Suggestion};
