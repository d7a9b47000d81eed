//! Rossa CLI
//!
//! Command-line interface for Rossa measurement sequences.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use rossa_cli::cli::{Cli, Command, ConfigAction};
use rossa_cli::commands::dispatch;
use rossa_cli::config::RossaConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // `config init` creates the file that may not exist yet
    let config = match &cli.command {
        Command::Config {
            action: ConfigAction::Init { .. },
        } => RossaConfig::load(cli.config.as_deref()).unwrap_or_default(),
        _ => RossaConfig::load(cli.config.as_deref())?,
    };

    // Initialize tracing on stderr so stdout stays machine-readable
    let default_filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_filter.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    dispatch(cli, &config).await?;
    Ok(())
}
