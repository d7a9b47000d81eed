//! Handlers for the CLI subcommands.
//!
//! Handlers return the text they produce so they can be tested without
//! capturing stdout; [`dispatch`] decides where the text goes.

use std::path::{Path, PathBuf};

use rossa_core::{PluginRegistry, Rossa};
use tracing::info;

use crate::cli::{Cli, Command, ConfigAction, OutputFormat};
use crate::config::RossaConfig;
use crate::error::{Error, Result};

/// Run the command selected on the command line.
pub async fn dispatch(cli: Cli, config: &RossaConfig) -> Result<()> {
    match cli.command {
        Command::Check { file } => emit(&cmd_check(&file)?, None),
        Command::Combinations {
            file,
            format,
            output,
        } => {
            let format = format.unwrap_or(config.output_format);
            emit(&cmd_combinations(&file, format)?, output.as_deref())
        }
        Command::Run { file, output } => {
            let registry = PluginRegistry::with_builtins();
            let report = cmd_run(&file, &registry, config).await?;
            emit(&report, output.as_deref())
        }
        Command::Config { action } => match action {
            ConfigAction::Path => emit(&cmd_config_path(cli.config.as_deref())?, None),
            ConfigAction::Init { file, force } => {
                let target = file.as_deref().or(cli.config.as_deref());
                let path = cmd_config_init(target, force)?;
                emit(&format!("Config file created at {}", path.display()), None)
            }
            ConfigAction::Show => emit(&config.to_toml_string()?, None),
        },
    }
}

/// Validate a document and summarize its sequence.
pub fn cmd_check(file: &Path) -> Result<String> {
    let rossa = Rossa::from_path(file)?;
    let plugins = rossa.plugins()?;
    let stats = rossa.sequence()?.stats();

    let mut summary = format!(
        "{}: ok\n  tests:       {}\n  test points: {}\n  setups:      {}\n  teardowns:   {}\n  max index:   {:?}\n",
        file.display(),
        stats.tests,
        stats.test_points,
        stats.setups,
        stats.teardowns,
        stats.max_index,
    );
    if !plugins.is_empty() {
        summary.push_str(&format!("  plugins:     {}\n", plugins.join(", ")));
    }
    Ok(summary)
}

/// Render the flattened sequence of a document.
pub fn cmd_combinations(file: &Path, format: OutputFormat) -> Result<String> {
    let sequence = Rossa::from_path(file)?.sequence()?;
    let text = match format {
        OutputFormat::Json => sequence.to_json_string()?,
        OutputFormat::Yaml => sequence.to_yaml_string()?,
    };
    Ok(text)
}

/// Run a document and render the report as JSON.
pub async fn cmd_run(file: &Path, registry: &PluginRegistry, config: &RossaConfig) -> Result<String> {
    let rossa = Rossa::from_path(file)?;
    let report = rossa.run(registry, &config.default_plugins).await?;
    info!(records = report.records.len(), "Run complete");
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Show the resolved config file path.
pub fn cmd_config_path(config_path: Option<&str>) -> Result<String> {
    let path = RossaConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    if path.exists() {
        Ok(path.display().to_string())
    } else {
        Ok(format!(
            "{} (file does not exist, run `rossa config init` to create it)",
            path.display()
        ))
    }
}

/// Create a default configuration file.
pub fn cmd_config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => RossaConfig::resolve_config_path(None)
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = RossaConfig::default().to_toml_string()?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;
    Ok(path)
}

/// Print text to stdout or write it to a file.
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| Error::io_with_path(e, path))?;
            info!(path = %path.display(), "Wrote output");
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}
