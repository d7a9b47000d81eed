//! Sequence construction for complete documents.

use rossa_core::{Error, Format, ParameterDocument, Step, build_sequence, get_combinations};
use serde_json::json;

use crate::common::{FULL_INTEGRATION_YAML, document, full_integration_parameters};

#[test]
fn test_parameters_get_combined_correctly() {
    let steps = get_combinations(&document(full_integration_parameters())).unwrap();

    let mut n_setups = 0;
    let mut n_teardowns = 0;
    let mut i_test_max = 0;
    let mut index_max = [0usize; 5];
    for step in &steps {
        match step {
            Step::Setup(_) => n_setups += 1,
            Step::Teardown(_) => n_teardowns += 1,
            Step::Test(point) => {
                i_test_max = i_test_max.max(point.test_index);
                for (max, index) in index_max.iter_mut().zip(&point.index) {
                    *max = (*max).max(*index);
                }
                // the second test overrides the corner's param_1
                if point.test_index == 1 {
                    assert_eq!(point.parameters["param_1"], json!(7));
                }
            }
        }
    }
    assert_eq!(n_setups, n_teardowns);
    assert!(n_setups > 10);
    assert_eq!(i_test_max, 3);
    // singleton main, three thermostat, three corner, singleton test
    // wrapper, nine combinations in the first test
    assert_eq!(index_max, [0, 2, 2, 0, 8]);
}

#[test]
fn test_sequence_stats_for_full_campaign() {
    let sequence = build_sequence(&document(full_integration_parameters())).unwrap();
    let stats = sequence.stats();
    assert_eq!(stats.test_points, 9 * (9 + 2 + 2 + 1));
    assert_eq!(stats.tests, 4);
    assert_eq!(stats.max_index, vec![0, 2, 2, 0, 8]);
    // opening, four tests per outer combination, corner and test level restarts
    assert_eq!(stats.setups, 1 + 9 * 4 + 2 + 6);
    assert_eq!(stats.teardowns, stats.setups);
}

#[test]
fn test_setup_and_teardown_values_get_replaced_by_appropriate_parameters() {
    let sequence = build_sequence(&document(full_integration_parameters())).unwrap();
    for step in sequence.steps() {
        if let Step::Setup(actions) | Step::Teardown(actions) = step {
            let text = serde_json::to_string(actions).unwrap();
            assert!(!text.contains("standard_test"));
            assert!(!text.contains("what to do"));
        }
    }
    let first_setup = sequence
        .steps()
        .iter()
        .skip(1)
        .find_map(|step| match step {
            Step::Setup(actions) if !actions.is_empty() => Some(actions),
            _ => None,
        })
        .unwrap();
    assert_eq!(first_setup[0]["param_1"], json!(42));
}

#[test]
fn test_zip_group_selects_matching_pairs() {
    let sequence = build_sequence(&document(full_integration_parameters())).unwrap();
    for point in sequence.test_points().filter(|p| p.test == "first") {
        let expected = match point.parameters["param_1"].as_u64().unwrap() {
            1 => "a",
            2 => "b",
            3 => "c",
            other => unreachable!("unexpected param_1 {other}"),
        };
        assert_eq!(point.parameters["param_2"], json!(expected));
    }
}

#[test]
fn test_yields_follow_tests() {
    let sequence = build_sequence(&document(full_integration_parameters())).unwrap();
    for point in sequence.test_points() {
        match point.test.as_str() {
            "first" => assert_eq!(point.yield_values, vec![json!("voltage")]),
            "fourth" => assert_eq!(point.yield_values, vec![json!("current")]),
            _ => assert!(point.yield_values.is_empty()),
        }
    }
}

#[test]
fn test_yaml_and_json_documents_agree() {
    let from_yaml = ParameterDocument::parse(FULL_INTEGRATION_YAML, Format::Yaml).unwrap();
    assert_eq!(from_yaml, document(full_integration_parameters()));
    assert_eq!(
        build_sequence(&from_yaml).unwrap(),
        build_sequence(&document(full_integration_parameters())).unwrap()
    );
}

#[test]
fn test_parameters_with_parallel_outer_loops_raise_error() {
    let err = build_sequence(&document(json!({
        "main": {
            "setup": [{"hardware": "initialize"}],
            "teardown": [{"hardware": "reset"}],
            "outer": {
                "inner": {"setup": ["standard_test"], "param_1": [1, 2, 3]},
                "inner2": {"setup": ["standard_test"], "param_2": [4, 5, 6]},
            },
            "second_outer": {
                "inner": {"setup": ["standard_test"], "param_1": [1, 2, 3]},
                "inner2": {"setup": ["standard_test"], "param_2": [4, 5, 6]},
            },
        },
    })))
    .unwrap_err();
    assert!(matches!(err, Error::ParallelOuterLoops { .. }));
}

#[test]
fn test_parameters_raise_error_if_no_main_loop_is_found() {
    let err = build_sequence(&document(json!({
        "outer": {"inner": {"setup": ["standard_test"], "param_1": [1, 2, 3]}},
    })))
    .unwrap_err();
    assert!(matches!(err, Error::MissingMainLoop));
}

#[test]
fn test_parameters_raise_error_if_main_loop_contains_no_further_loop() {
    let err = build_sequence(&document(json!({
        "main": {"setup": ["standard_test"], "param_1": [1, 2, 3]},
    })))
    .unwrap_err();
    assert!(matches!(err, Error::NoInnerLoops { .. }));
}

#[test]
fn test_parameters_raise_error_if_zip_groups_have_uneven_length() {
    let err = build_sequence(&document(json!({
        "main": {
            "faulty": {
                "param_1#zip_faulty": [1, 2, 3],
                "param_2#zip_faulty": ["a", "b"],
            }
        },
    })))
    .unwrap_err();
    assert!(matches!(err, Error::ZipLengthMismatch { .. }));
}

#[test]
fn test_parameters_raise_error_if_setup_can_not_be_filled() {
    let err = build_sequence(&document(json!({
        "main": {"faulty": {"setup": ["unknown"], "param_1": [1, 2, 3]}},
    })))
    .unwrap_err();
    assert!(matches!(err, Error::TemplateNotFound { .. }));
    assert!(err.is_document_error());
}
