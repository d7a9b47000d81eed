//! Plugin trait and registry.
//!
//! Plugins drive the measurement setup: they apply setup and teardown
//! actions, configure the instruments for a test point, and read back the
//! values the point yields.
//!
//! # Built-in plugins
//!
//! - [`DryRunPlugin`] (`dry-run`): records every call and measures `null`

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::trace;

use crate::combination::ParameterSet;
use crate::error::{Error, Result};
use crate::sequence::TestPoint;

/// A driver that executes sequence steps.
///
/// The runner calls plugins in registration order. All methods are async so
/// that implementations can talk to instruments without blocking.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Get the plugin name used in parameter documents.
    fn name(&self) -> &str;

    /// Apply a list of setup or teardown actions.
    async fn apply(&self, actions: &[ParameterSet]) -> Result<()>;

    /// Bring the instruments into the state described by a test point.
    async fn configure(&self, point: &TestPoint) -> Result<()>;

    /// Measure the values a test point yields.
    ///
    /// Returns a mapping from yield name to measured value. Names the
    /// plugin does not handle are simply left out.
    async fn measure(&self, point: &TestPoint) -> Result<ParameterSet>;
}

/// Plugins known to a run, in registration order.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DryRunPlugin::new()));
        registry
    }

    /// Register a plugin, replacing one with the same name.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        match self.plugins.iter_mut().find(|p| p.name() == plugin.name()) {
            Some(existing) => *existing = plugin,
            None => self.plugins.push(plugin),
        }
    }

    /// Look up a plugin by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Names of all registered plugins.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Look up several plugins, keeping the requested order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PluginNotFound`] for the first unknown name.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn Plugin>>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).ok_or_else(|| Error::PluginNotFound {
                    name: name.to_string(),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

/// A call received by the [`DryRunPlugin`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginCall {
    /// `apply` with the given actions
    Apply(Vec<ParameterSet>),
    /// `configure` for the point with this index
    Configure(Vec<usize>),
    /// `measure` for the point with this index
    Measure(Vec<usize>),
}

/// Plugin that touches no hardware.
///
/// Every call is recorded so a sequence can be inspected end to end, and
/// every yield is measured as `null`.
#[derive(Debug, Default)]
pub struct DryRunPlugin {
    calls: Mutex<Vec<PluginCall>>,
}

impl DryRunPlugin {
    /// Registry name of the plugin.
    pub const NAME: &'static str = "dry-run";

    /// Create a plugin with an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the calls received so far.
    pub async fn calls(&self) -> Vec<PluginCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: PluginCall) {
        trace!(?call, "dry-run call");
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl Plugin for DryRunPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn apply(&self, actions: &[ParameterSet]) -> Result<()> {
        self.record(PluginCall::Apply(actions.to_vec())).await;
        Ok(())
    }

    async fn configure(&self, point: &TestPoint) -> Result<()> {
        self.record(PluginCall::Configure(point.index.clone())).await;
        Ok(())
    }

    async fn measure(&self, point: &TestPoint) -> Result<ParameterSet> {
        self.record(PluginCall::Measure(point.index.clone())).await;
        Ok(point
            .yield_values
            .iter()
            .map(|name| (yield_name(name), Value::Null))
            .collect())
    }
}

/// Returns the key under which a yield is reported.
pub fn yield_name(value: &Value) -> String {
    match value {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}
