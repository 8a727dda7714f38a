//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Docent - help-center content tools
#[derive(Parser, Debug)]
#[command(name = "docent", version)]
#[command(about = "Parse, check, and search help-center content", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DOCENT_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for commands that print structured data.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse one article and print the result
    Parse {
        /// Article file
        file: PathBuf,

        /// Print only the rendered HTML
        #[arg(long)]
        html: bool,
    },

    /// Detect the format of a file
    Detect {
        /// File to inspect
        file: PathBuf,

        /// Ignore the file extension and look at the content only
        #[arg(long)]
        content_only: bool,
    },

    /// Search a content directory
    Search {
        /// Content directory (with or without a manifest)
        dir: PathBuf,

        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Check every article in a directory for authoring problems
    Validate {
        /// Content directory
        dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Generate a service worker script
    Sw {
        /// Pre-cache every content file under this directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Cache name (overrides configuration)
        #[arg(long)]
        cache_name: Option<String>,

        /// Page served for failed navigations while offline
        #[arg(long)]
        offline_fallback: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `docent config` actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,

    /// Get a value by dotted key (e.g. `loader.cache_ttl_secs`)
    Get {
        /// Dotted key
        key: String,
    },

    /// Set a value by dotted key
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },

    /// Write a default config file
    Init {
        /// Target file (defaults to the platform config directory)
        #[arg(long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
