//! Flattening a parameter document into an ordered sequence of steps.
//!
//! The sequence opens with the setups of all outer levels and closes with
//! their teardowns in reverse order. In between, the outer level
//! combinations are iterated as a product (innermost level fastest); for
//! each outer combination every test contributes its setup, one test point
//! per expanded parameter combination, and its teardown. When an outer
//! level restarts from its first combination because its parent moved on,
//! that level's teardown and setup are run again.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::combination::{ParameterCombination, ParameterSet, checked_product};
use crate::document::ParameterDocument;
use crate::error::Result;
use crate::skeleton::{LoopLevel, LoopSkeleton, TestDefinition, extract_skeleton};

/// A single entry of a measurement sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Actions to apply before a level or test.
    Setup(Vec<ParameterSet>),
    /// Actions to apply after a level or test.
    Teardown(Vec<ParameterSet>),
    /// One fully resolved measurement.
    Test(TestPoint),
}

impl Step {
    /// Returns `true` if the step is a setup.
    pub fn is_setup(&self) -> bool {
        matches!(self, Step::Setup(_))
    }

    /// Returns `true` if the step is a teardown.
    pub fn is_teardown(&self) -> bool {
        matches!(self, Step::Teardown(_))
    }

    /// Returns the test point, if this step is one.
    pub fn as_test_point(&self) -> Option<&TestPoint> {
        match self {
            Step::Test(point) => Some(point),
            _ => None,
        }
    }
}

/// A concrete parameter set to measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPoint {
    /// Combination index per outer level, followed by the index within the test
    pub index: Vec<usize>,
    /// Name of the test this point belongs to
    pub test: String,
    /// Position of the test among its siblings
    pub test_index: usize,
    /// Outer parameters merged with the test's own
    pub parameters: ParameterSet,
    /// Names of the values to measure
    #[serde(rename = "yield", default)]
    pub yield_values: Vec<Value>,
}

/// Counters over a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStats {
    /// Number of setup steps
    pub setups: usize,
    /// Number of teardown steps
    pub teardowns: usize,
    /// Number of test points
    pub test_points: usize,
    /// Number of distinct tests
    pub tests: usize,
    /// Highest index reached per level, test level last
    pub max_index: Vec<usize>,
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    /// Builds the sequence of a document.
    pub fn build(document: &ParameterDocument) -> Result<Self> {
        build_sequence(document)
    }

    /// Returns all steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Consumes the sequence, returning its steps.
    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    /// Iterates over the test points only.
    pub fn test_points(&self) -> impl Iterator<Item = &TestPoint> {
        self.steps.iter().filter_map(Step::as_test_point)
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Computes step counters.
    pub fn stats(&self) -> SequenceStats {
        let mut stats = SequenceStats::default();
        let mut max_test_index = None;
        for step in &self.steps {
            match step {
                Step::Setup(_) => stats.setups += 1,
                Step::Teardown(_) => stats.teardowns += 1,
                Step::Test(point) => {
                    stats.test_points += 1;
                    max_test_index = max_test_index.max(Some(point.test_index));
                    if stats.max_index.len() < point.index.len() {
                        stats.max_index.resize(point.index.len(), 0);
                    }
                    for (max, index) in stats.max_index.iter_mut().zip(&point.index) {
                        *max = (*max).max(*index);
                    }
                }
            }
        }
        stats.tests = max_test_index.map_or(0, |max| max + 1);
        stats
    }

    /// Serializes the sequence as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the sequence as YAML.
    ///
    /// Steps are written as plain mappings rather than YAML tags.
    pub fn to_yaml_string(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(serde_yaml::to_string(&value)?)
    }
}

impl From<Vec<Step>> for Sequence {
    fn from(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

/// Builds the ordered step list of a parameter document.
///
/// # Errors
///
/// Returns any validation, template, or combination error of the document.
#[instrument(skip(document))]
pub fn build_sequence(document: &ParameterDocument) -> Result<Sequence> {
    let skeleton = extract_skeleton(document)?;
    let LoopSkeleton {
        levels,
        yield_values,
        tests,
    } = &skeleton;

    let mut steps = vec![Step::Setup(
        levels.iter().flat_map(|level| level.setup.iter().cloned()).collect(),
    )];

    let lengths: Vec<usize> = levels.iter().map(|level| level.combinations.len()).collect();
    let total = checked_product(lengths.iter().copied())?;
    let mut outer = vec![0usize; levels.len()];
    for _ in 0..total {
        for i in 1..levels.len() {
            if outer[i] == 0 && outer[i - 1] != 0 {
                steps.push(Step::Teardown(levels[i].teardown.clone()));
                steps.push(Step::Setup(levels[i].setup.clone()));
            }
        }
        let outer_parameters = merge_outer(levels, &outer);
        for (test_index, test) in tests.iter().enumerate() {
            steps.push(Step::Setup(test.setup.clone()));
            let combinations = test_combinations(&outer_parameters, test)?;
            for (inner, parameters) in combinations.into_iter().enumerate() {
                let mut index = outer.clone();
                index.push(inner);
                steps.push(Step::Test(TestPoint {
                    index,
                    test: test.name.clone(),
                    test_index,
                    parameters,
                    yield_values: test
                        .yield_values
                        .clone()
                        .unwrap_or_else(|| yield_values.clone()),
                }));
            }
            steps.push(Step::Teardown(test.teardown.clone()));
        }
        advance(&mut outer, &lengths);
    }

    steps.push(Step::Teardown(
        levels
            .iter()
            .rev()
            .flat_map(|level| level.teardown.iter().cloned())
            .collect(),
    ));

    let sequence = Sequence::from(steps);
    debug!(
        steps = sequence.len(),
        outer_combinations = total,
        "Built measurement sequence"
    );
    Ok(sequence)
}

/// Returns the flattened steps of a parameter document.
pub fn get_combinations(document: &ParameterDocument) -> Result<Vec<Step>> {
    build_sequence(document).map(Sequence::into_steps)
}

/// Merges the selected combination of every outer level; deeper levels win.
fn merge_outer(levels: &[LoopLevel], outer: &[usize]) -> ParameterSet {
    let mut merged = ParameterSet::new();
    for (level, &i_combination) in levels.iter().zip(outer) {
        for (name, value) in &level.combinations[i_combination] {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

/// Expands a test's parameters on top of the selected outer parameters.
///
/// Outer values are already selected and never expand again. A test
/// parameter with the same name replaces the outer value in place.
fn test_combinations(outer: &ParameterSet, test: &TestDefinition) -> Result<Vec<ParameterSet>> {
    let mut entries: Vec<(String, Vec<Value>)> = outer
        .iter()
        .map(|(name, value)| (name.clone(), vec![value.clone()]))
        .collect();
    for (name, value) in &test.parameters {
        let values = match value {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        };
        match entries.iter_mut().find(|(known, _)| known == name) {
            Some(entry) => entry.1 = values,
            None => entries.push((name.clone(), values)),
        }
    }
    ParameterCombination::from_entries(entries).combinations()
}

/// Advances the outer index counter, innermost level fastest.
fn advance(counter: &mut [usize], lengths: &[usize]) {
    for (digit, len) in counter.iter_mut().zip(lengths).rev() {
        *digit += 1;
        if *digit < *len {
            return;
        }
        *digit = 0;
    }
}
