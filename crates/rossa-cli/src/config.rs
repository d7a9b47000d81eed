//! CLI configuration.
//!
//! The configuration file is TOML. Its location is, in order of
//! precedence, the `--config` argument, the `ROSSA_CONFIG` environment
//! variable, or `rossa/config.toml` below the platform config directory.
//! Every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;
use crate::error::{Error, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "ROSSA_CONFIG";

/// Settings of the `rossa` binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RossaConfig {
    /// Output format of `rossa combinations` when `--format` is not given
    pub output_format: OutputFormat,
    /// Plugins used by `rossa run` when the document lists none
    pub default_plugins: Vec<String>,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for RossaConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Json,
            default_plugins: Vec::new(),
            log_filter: "info,rossa=debug".to_string(),
        }
    }
}

impl RossaConfig {
    /// Default location of the config file.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rossa").join("config.toml"))
    }

    /// Resolves the config file location.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Loads the configuration.
    ///
    /// A missing file found through `ROSSA_CONFIG` or the default location
    /// yields the defaults; a missing file named by `--config` is an error.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(explicit) {
            Some(path) => Self::read(&path, explicit.is_some()),
            None => Ok(Self::default()),
        }
    }

    /// Reads one config file; a missing file is an error only when `required`.
    pub fn read(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                return Err(Error::config(format!(
                    "Config file does not exist at {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}
