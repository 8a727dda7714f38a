//! Docent CLI
//!
//! Command-line interface for help-center content.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::{bail, Result};
use clap::Parser;
use docent_cli::commands::{self, SwOptions};
use docent_cli::config_handlers::handle_config_command;
use docent_cli::{Cli, Command, DocentConfig};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.as_deref();
    let load_config = || -> Result<DocentConfig> {
        let config = DocentConfig::load(config_path)?;
        tracing::debug!(config = ?config_path, "configuration loaded");
        Ok(config)
    };

    match cli.command {
        Command::Config { action } => handle_config_command(config_path, action)?,
        Command::Parse { file, html } => commands::cmd_parse(&load_config()?, &file, html).await?,
        Command::Detect { file, content_only } => commands::cmd_detect(&file, content_only).await?,
        Command::Search {
            dir,
            query,
            limit,
            format,
        } => commands::cmd_search(&load_config()?, &dir, &query, limit, format).await?,
        Command::Validate { dir, format } => {
            if !commands::cmd_validate(&load_config()?, &dir, format).await? {
                bail!("validation found errors in {}", dir.display());
            }
        }
        Command::Sw {
            dir,
            cache_name,
            offline_fallback,
            output,
        } => {
            let options = SwOptions {
                dir,
                cache_name,
                offline_fallback,
            };
            commands::cmd_sw(&load_config()?, &options, output.as_deref()).await?;
        }
    }

    Ok(())
}
