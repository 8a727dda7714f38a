//! # docent-cli
//!
//! Command-line tools for Docent content:
//! - `docent parse <file>`: render one article
//! - `docent detect <file>`: guess a file's format
//! - `docent search <dir> <query>`: search a content directory
//! - `docent validate <dir>`: check articles for authoring problems
//! - `docent sw`: generate a service worker script
//! - `docent config ...`: manage the config file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;

pub use cli::{Cli, Command, ConfigAction, OutputFormat};
pub use config::DocentConfig;
