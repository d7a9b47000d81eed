//! Entry point tying a parameter document to its sequence and plugins.

use std::path::Path;

use tracing::info;

use crate::document::ParameterDocument;
use crate::error::Result;
use crate::plugin::{DryRunPlugin, PluginRegistry};
use crate::runner::{RunReport, Runner};
use crate::sequence::Sequence;

/// A measurement campaign described by one parameter document.
#[derive(Debug, Clone, PartialEq)]
pub struct Rossa {
    document: ParameterDocument,
}

impl Rossa {
    /// Create a campaign from a loaded document.
    pub fn new(document: ParameterDocument) -> Self {
        Self { document }
    }

    /// Load a campaign from a YAML, JSON, or TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        ParameterDocument::from_path(path).map(Self::new)
    }

    /// Returns the document this campaign was created from.
    pub fn parameters(&self) -> &ParameterDocument {
        &self.document
    }

    /// Returns the plugin names the document asks for.
    pub fn plugins(&self) -> Result<Vec<String>> {
        self.document.plugins()
    }

    /// Chooses the plugins of a run.
    ///
    /// The document's list wins; otherwise `defaults` is used, and when
    /// that is empty too the run falls back to the dry-run plugin.
    pub fn plugin_names(&self, defaults: &[String]) -> Result<Vec<String>> {
        let requested = self.plugins()?;
        if !requested.is_empty() {
            return Ok(requested);
        }
        if !defaults.is_empty() {
            return Ok(defaults.to_vec());
        }
        Ok(vec![DryRunPlugin::NAME.to_string()])
    }

    /// Builds the measurement sequence.
    pub fn sequence(&self) -> Result<Sequence> {
        Sequence::build(&self.document)
    }

    /// Builds the sequence and executes it.
    ///
    /// See [`Rossa::plugin_names`] for how the plugins are chosen.
    pub async fn run(&self, registry: &PluginRegistry, defaults: &[String]) -> Result<RunReport> {
        let names = self.plugin_names(defaults)?;
        let plugins = registry.resolve(names.as_slice())?;
        let sequence = self.sequence()?;
        info!(plugins = ?names, test_points = sequence.stats().test_points, "Running campaign");
        Runner::new(plugins).run(&sequence).await
    }
}

impl From<ParameterDocument> for Rossa {
    fn from(document: ParameterDocument) -> Self {
        Self::new(document)
    }
}
