//! Executing a sequence against plugins.
//!
//! The runner walks the steps in order. Setup and teardown steps are
//! applied on every plugin; test points are configured on every plugin and
//! then measured, with the returned values merged into one record (a later
//! plugin overrides an earlier one for the same name).
//!
//! When a step fails the run stops. The closing teardown of the sequence
//! is still attempted so the hardware ends in a safe state, and the
//! original error is returned.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::combination::ParameterSet;
use crate::error::Result;
use crate::plugin::Plugin;
use crate::sequence::{Sequence, Step, TestPoint};

/// Values measured for one test point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Index of the test point
    pub index: Vec<usize>,
    /// Test name
    pub test: String,
    /// Position of the test among its siblings
    pub test_index: usize,
    /// Parameters the point was measured with
    pub parameters: ParameterSet,
    /// Measured values by yield name
    pub values: ParameterSet,
    /// When the measurement finished
    pub timestamp: DateTime<Utc>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Plugins the run used, in call order
    pub plugins: Vec<String>,
    /// One record per test point
    pub records: Vec<MeasurementRecord>,
    /// Number of setup steps applied
    pub setups: usize,
    /// Number of teardown steps applied
    pub teardowns: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

/// Executes sequences with a fixed set of plugins.
pub struct Runner {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl Runner {
    /// Create a runner calling the plugins in the given order.
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Self { plugins }
    }

    /// Names of the runner's plugins.
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    /// Run every step of a sequence.
    ///
    /// # Errors
    ///
    /// Returns the first plugin error. The closing teardown of the
    /// sequence has been attempted by then.
    pub async fn run(&self, sequence: &Sequence) -> Result<RunReport> {
        let started_at = Utc::now();
        info!(
            steps = sequence.len(),
            plugins = ?self.plugin_names(),
            "Starting run"
        );

        let mut report = RunReport {
            plugins: self.plugin_names(),
            records: Vec::new(),
            setups: 0,
            teardowns: 0,
            started_at,
            finished_at: started_at,
        };

        let steps = sequence.steps();
        for (i_step, step) in steps.iter().enumerate() {
            if let Err(err) = self.execute(step, &mut report).await {
                error!(step = i_step, error = %err, "Step failed, aborting run");
                let is_last = i_step + 1 == steps.len();
                if let (false, Some(Step::Teardown(actions))) = (is_last, steps.last()) {
                    self.safe_teardown(actions).await;
                }
                return Err(err);
            }
        }

        report.finished_at = Utc::now();
        info!(
            records = report.records.len(),
            setups = report.setups,
            teardowns = report.teardowns,
            "Run finished"
        );
        Ok(report)
    }

    async fn execute(&self, step: &Step, report: &mut RunReport) -> Result<()> {
        match step {
            Step::Setup(actions) => {
                self.apply(actions).await?;
                report.setups += 1;
            }
            Step::Teardown(actions) => {
                self.apply(actions).await?;
                report.teardowns += 1;
            }
            Step::Test(point) => {
                let record = self.measure(point).await?;
                report.records.push(record);
            }
        }
        Ok(())
    }

    async fn apply(&self, actions: &[ParameterSet]) -> Result<()> {
        for plugin in &self.plugins {
            plugin.apply(actions).await?;
        }
        Ok(())
    }

    async fn measure(&self, point: &TestPoint) -> Result<MeasurementRecord> {
        for plugin in &self.plugins {
            plugin.configure(point).await?;
        }
        let mut values = ParameterSet::new();
        for plugin in &self.plugins {
            values.extend(plugin.measure(point).await?);
        }
        debug!(index = ?point.index, test = %point.test, "Measured test point");
        Ok(MeasurementRecord {
            index: point.index.clone(),
            test: point.test.clone(),
            test_index: point.test_index,
            parameters: point.parameters.clone(),
            values,
            timestamp: Utc::now(),
        })
    }

    /// Applies the closing teardown on every plugin, logging failures.
    async fn safe_teardown(&self, actions: &[ParameterSet]) {
        for plugin in &self.plugins {
            if let Err(err) = plugin.apply(actions).await {
                warn!(plugin = plugin.name(), error = %err, "Closing teardown failed");
            }
        }
    }
}
