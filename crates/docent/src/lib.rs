//! Docent help-center content pipeline umbrella crate.
//!
//! This crate re-exports all Docent components for convenience.
//! Use feature flags to enable specific functionality.

#![doc = include_str!("../README.md")]

pub use docent_content as content;
pub use docent_core as core;

#[cfg(feature = "search")]
pub use docent_search as search;

#[cfg(feature = "storage")]
pub use docent_storage as storage;

#[cfg(feature = "loader")]
pub use docent_loader as loader;
