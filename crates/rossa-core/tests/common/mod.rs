//! Shared parameter documents for the integration tests.

use rossa_core::ParameterDocument;
use serde_json::{Value, json};

/// A campaign with four outer levels, a zip group, templates, and four tests.
pub fn full_integration_parameters() -> Value {
    json!({
        "plugins": ["dry-run"],
        "standard_test": {
            "temperature": 20,
            "param_1": 42,
            "param_2": 42,
            "param_3": 42,
            "param_4": 42,
        },
        "what to do at the end of the test": {
            "temperature": 0,
            "param_1": 0,
            "param_2": 0,
            "param_3": 0,
            "param_4": 0,
        },
        "main": {
            "setup": [{"hardware": "initialize"}],
            "teardown": [{"hardware": "reset"}],
            "thermostat": {
                "temperature": [25, 26, 27],
                "corner": {
                    "param_1#zip_corner": [1, 2, 3],
                    "param_2#zip_corner": ["a", "b", "c"],
                    "tests": {
                        "teardown": ["what to do at the end of the test"],
                        "first": {
                            "setup": ["standard_test"],
                            "param_3": [4, 5, 6],
                            "param_4": ["d", "e", "f"],
                            "yield": ["voltage"],
                            "teardown": ["what to do at the end of the test"],
                        },
                        "second": {
                            "setup": ["standard_test"],
                            "param_1": [7],
                            "param_4": ["t", "b"],
                        },
                        "third": {
                            "setup": ["standard_test"],
                            "param_3": [7],
                            "param_4": ["t", "b"],
                            "teardown": ["what to do at the end of the test"],
                        },
                        "fourth": {
                            "yield": ["current"],
                        },
                    },
                },
            },
        },
    })
}

/// The same campaign as YAML text.
pub const FULL_INTEGRATION_YAML: &str = r#"
plugins: [dry-run]
standard_test:
  temperature: 20
  param_1: 42
  param_2: 42
  param_3: 42
  param_4: 42
what to do at the end of the test:
  temperature: 0
  param_1: 0
  param_2: 0
  param_3: 0
  param_4: 0
main:
  setup: [{hardware: initialize}]
  teardown: [{hardware: reset}]
  thermostat:
    temperature: [25, 26, 27]
    corner:
      param_1#zip_corner: [1, 2, 3]
      param_2#zip_corner: [a, b, c]
      tests:
        teardown: [what to do at the end of the test]
        first:
          setup: [standard_test]
          param_3: [4, 5, 6]
          param_4: [d, e, f]
          yield: [voltage]
          teardown: [what to do at the end of the test]
        second:
          setup: [standard_test]
          param_1: [7]
          param_4: [t, b]
        third:
          setup: [standard_test]
          param_3: [7]
          param_4: [t, b]
          teardown: [what to do at the end of the test]
        fourth:
          yield: [current]
"#;

/// Wraps a JSON value as a document.
pub fn document(value: Value) -> ParameterDocument {
    ParameterDocument::from_value(value).expect("fixture root is a mapping")
}
