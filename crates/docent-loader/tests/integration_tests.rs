//! Integration test suite for the Docent loader.
//!
//! Exercises the full pipeline: manifest fetch, extension probing, parser
//! selection, registry queries, and the reactive help context.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
mod integration;
