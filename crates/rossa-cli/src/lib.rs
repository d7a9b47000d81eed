//! # rossa-cli
//!
//! Command-line tools for Rossa parameter documents:
//! - Validating documents and summarizing their sequences
//! - Printing the flattened sequence as JSON or YAML
//! - Running sequences against plugins
//! - Managing the CLI configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use error::{Error, Result};
