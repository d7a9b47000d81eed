//! Loop structure of the main loop.
//!
//! The main loop is a chain of nested mappings. Each mapping above the
//! tests is an *outer level*: its plain entries are parameters that
//! multiply with the other levels, its mapping entries are child loops. The
//! chain ends at the first level whose first child holds no mapping; all
//! children of that level are the tests.

use serde_json::{Map, Value};
use tracing::debug;

use crate::combination::{ParameterCombination, ParameterSet};
use crate::document::{MAIN_KEY, ParameterDocument};
use crate::error::{Error, Result};
use crate::template::fill_template;

/// Action list run before a level or test.
pub const SETUP_KEY: &str = "setup";
/// Action list run after a level or test.
pub const TEARDOWN_KEY: &str = "teardown";
/// Default yields for every test below an outer level.
pub const YIELD_VALUES_KEY: &str = "yield_values";
/// Yields of a single test.
pub const YIELD_KEY: &str = "yield";

const LEVEL_RESERVED: [&str; 3] = [SETUP_KEY, TEARDOWN_KEY, YIELD_VALUES_KEY];
const TEST_RESERVED: [&str; 3] = [SETUP_KEY, TEARDOWN_KEY, YIELD_KEY];

/// An outer loop level with its resolved actions and combinations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopLevel {
    /// Key of the level in its parent
    pub name: String,
    /// Actions run when the level starts
    pub setup: Vec<ParameterSet>,
    /// Actions run when the level ends
    pub teardown: Vec<ParameterSet>,
    /// Parameter combinations of this level, in iteration order
    pub combinations: Vec<ParameterSet>,
}

/// A test below the innermost outer level.
#[derive(Debug, Clone, PartialEq)]
pub struct TestDefinition {
    /// Key of the test
    pub name: String,
    /// Actions run before the test's points
    pub setup: Vec<ParameterSet>,
    /// Actions run after the test's points
    pub teardown: Vec<ParameterSet>,
    /// Yields of this test; `None` inherits the loop's `yield_values`
    pub yield_values: Option<Vec<Value>>,
    /// Unexpanded test parameters
    pub parameters: ParameterSet,
}

/// The main loop split into outer levels and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSkeleton {
    /// Outer levels, outermost (`main`) first
    pub levels: Vec<LoopLevel>,
    /// Yields inherited by tests without their own
    pub yield_values: Vec<Value>,
    /// Tests of the innermost level
    pub tests: Vec<TestDefinition>,
}

/// Checks the shape of the main loop.
///
/// The document must have a main loop, and a level with more than one
/// child may only have children that are tests.
///
/// # Errors
///
/// Returns [`Error::MissingMainLoop`] or [`Error::ParallelOuterLoops`].
pub fn check_validity(document: &ParameterDocument) -> Result<()> {
    let mut name = MAIN_KEY;
    let mut level = document.main_loop()?;
    loop {
        let children = child_loops(level, &LEVEL_RESERVED);
        let Some(&(first_name, first)) = children.first() else {
            return Ok(());
        };
        if children.len() > 1
            && children
                .iter()
                .any(|(_, child)| !child_loops(child, &LEVEL_RESERVED).is_empty())
        {
            return Err(Error::ParallelOuterLoops {
                level: name.to_string(),
            });
        }
        name = first_name;
        level = first;
    }
}

/// Splits the main loop into outer levels and tests.
///
/// Setup and teardown lists are resolved against the document's templates
/// and each level's parameters are expanded. A `yield_values` entry on a
/// deeper level overrides one on a shallower level.
///
/// # Errors
///
/// Besides the errors of [`check_validity`], returns
/// [`Error::NoInnerLoops`] for a level without children, and template or
/// combination errors.
pub fn extract_skeleton(document: &ParameterDocument) -> Result<LoopSkeleton> {
    check_validity(document)?;

    let mut levels = Vec::new();
    let mut yield_values = Vec::new();
    let mut name = MAIN_KEY;
    let mut level = document.main_loop()?;
    loop {
        let children = child_loops(level, &LEVEL_RESERVED);
        let Some(&(first_name, first)) = children.first() else {
            return Err(Error::NoInnerLoops {
                level: name.to_string(),
            });
        };

        if let Some(values) = level.get(YIELD_VALUES_KEY) {
            yield_values = normalize_yield(values);
        }
        let parameters = plain_entries(level, &LEVEL_RESERVED);
        levels.push(LoopLevel {
            name: name.to_string(),
            setup: fill_template(document, level.get(SETUP_KEY))?,
            teardown: fill_template(document, level.get(TEARDOWN_KEY))?,
            combinations: ParameterCombination::new(&parameters).combinations()?,
        });

        if child_loops(first, &TEST_RESERVED).is_empty() {
            let tests = children
                .iter()
                .map(|(test_name, test)| test_definition(document, test_name, test))
                .collect::<Result<Vec<_>>>()?;
            debug!(
                levels = levels.len(),
                tests = tests.len(),
                "Extracted loop skeleton"
            );
            return Ok(LoopSkeleton {
                levels,
                yield_values,
                tests,
            });
        }
        name = first_name;
        level = first;
    }
}

fn test_definition(
    document: &ParameterDocument,
    name: &str,
    test: &Map<String, Value>,
) -> Result<TestDefinition> {
    Ok(TestDefinition {
        name: name.to_string(),
        setup: fill_template(document, test.get(SETUP_KEY))?,
        teardown: fill_template(document, test.get(TEARDOWN_KEY))?,
        yield_values: test.get(YIELD_KEY).map(normalize_yield),
        parameters: plain_entries(test, &TEST_RESERVED),
    })
}

/// Returns the mapping entries of a level, reserved keys excluded.
fn child_loops<'a>(
    level: &'a Map<String, Value>,
    reserved: &[&str],
) -> Vec<(&'a str, &'a Map<String, Value>)> {
    level
        .iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .filter_map(|(key, value)| value.as_object().map(|child| (key.as_str(), child)))
        .collect()
}

/// Returns the non-mapping entries of a level, reserved keys excluded.
fn plain_entries(level: &Map<String, Value>, reserved: &[&str]) -> ParameterSet {
    level
        .iter()
        .filter(|(key, value)| !reserved.contains(&key.as_str()) && !value.is_object())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn normalize_yield(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> ParameterDocument {
        ParameterDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_main_loop() {
        let doc = document(json!({"outer": {"inner": {"param_1": [1, 2, 3]}}}));
        assert!(matches!(check_validity(&doc), Err(Error::MissingMainLoop)));
    }

    #[test]
    fn test_parallel_outer_loops() {
        let doc = document(json!({
            "main": {
                "outer": {"inner": {"param_1": [1, 2]}},
                "second_outer": {"inner": {"param_1": [1, 2]}},
            }
        }));
        let err = check_validity(&doc).unwrap_err();
        assert!(matches!(err, Error::ParallelOuterLoops { level } if level == "main"));
    }

    #[test]
    fn test_parallel_tests_are_valid() {
        let doc = document(json!({
            "main": {"outer": {"a": {"x": 1}, "b": {"y": 2}}}
        }));
        assert!(check_validity(&doc).is_ok());
    }

    #[test]
    fn test_inline_setup_mapping_is_not_a_child_loop() {
        let doc = document(json!({
            "main": {
                "setup": {"hardware": "initialize"},
                "test": {"x": [1, 2]},
            }
        }));
        let skeleton = extract_skeleton(&doc).unwrap();
        assert_eq!(skeleton.levels.len(), 1);
        assert_eq!(skeleton.levels[0].setup[0]["hardware"], json!("initialize"));
        assert_eq!(skeleton.tests.len(), 1);
    }

    #[test]
    fn test_no_inner_loops() {
        let doc = document(json!({"main": {"setup": ["standard_test"], "param_1": [1, 2, 3]}}));
        let err = extract_skeleton(&doc).unwrap_err();
        assert!(matches!(err, Error::NoInnerLoops { level } if level == "main"));
    }

    #[test]
    fn test_levels_and_tests() {
        let doc = document(json!({
            "standard_test": {"param_1": 42},
            "main": {
                "setup": [{"hardware": "initialize"}],
                "teardown": [{"hardware": "reset"}],
                "yield_values": ["voltage"],
                "thermostat": {
                    "temperature": [25, 26, 27],
                    "yield_values": "current",
                    "first": {"setup": ["standard_test"], "param_3": [4, 5], "yield": ["x"]},
                    "second": {"param_4": 1},
                },
            }
        }));
        let skeleton = extract_skeleton(&doc).unwrap();
        let names: Vec<&str> = skeleton.levels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["main", "thermostat"]);
        assert_eq!(skeleton.levels[0].combinations.len(), 1);
        assert_eq!(skeleton.levels[1].combinations.len(), 3);
        assert_eq!(skeleton.levels[0].teardown[0]["hardware"], json!("reset"));
        assert_eq!(skeleton.yield_values, vec![json!("current")]);

        let first = &skeleton.tests[0];
        assert_eq!(first.name, "first");
        assert_eq!(first.setup[0]["param_1"], json!(42));
        assert_eq!(first.yield_values, Some(vec![json!("x")]));
        assert!(!first.parameters.contains_key("setup"));
        assert_eq!(skeleton.tests[1].yield_values, None);
    }

    #[test]
    fn test_unknown_test_setup_template() {
        let doc = document(json!({"main": {"faulty": {"setup": ["unknown"], "param_1": [1, 2]}}}));
        let err = extract_skeleton(&doc).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }));
    }
}
