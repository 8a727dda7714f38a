//! Utility modules for identifiers and slugs.
//!
//! # Modules
//!
//! - [`ids`]: ID normalization, heading slugs, and slug de-duplication

pub mod ids;
