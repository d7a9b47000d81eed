//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Rossa CLI - measurement sequences from parameter documents
#[derive(Parser, Debug)]
#[command(name = "rossa")]
#[command(author, version, about = "Measurement sequencer driven by parameter documents", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a parameter document and print a summary
    Check {
        /// Parameter document (.yaml, .yml, .json, .toml)
        file: PathBuf,
    },
    /// Print the flattened measurement sequence
    Combinations {
        /// Parameter document (.yaml, .yml, .json, .toml)
        file: PathBuf,
        /// Output format, defaults to the configured one
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the sequence with the document's plugins
    Run {
        /// Parameter document (.yaml, .yml, .json, .toml)
        file: PathBuf,
        /// Write the JSON report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `rossa config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Create a default configuration file
    Init {
        /// Where to create the file, defaults to the resolved path
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

/// Serialization of sequence output.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}
