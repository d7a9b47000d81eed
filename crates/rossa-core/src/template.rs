//! Setup and teardown action lists.
//!
//! An action list is a string, a mapping, or an arbitrarily nested list of
//! those. Mappings are inline actions; strings name a top-level template of
//! the parameter document, which is expanded into its combinations.

use serde_json::Value;
use tracing::trace;

use crate::combination::{ParameterCombination, ParameterSet};
use crate::document::ParameterDocument;
use crate::error::{Error, Result};

/// Keys of a template that never take part in its expansion.
const TEMPLATE_RESERVED: [&str; 2] = ["setup", "teardown"];

/// Flattens a nested action list into a flat list of entries.
///
/// A non-list value becomes a single-element list and `null` yields
/// nothing.
///
/// ```
/// use rossa_core::template::flatten_actions;
/// use serde_json::json;
///
/// let actions = json!(["a", ["b", ["c"]], {"k": 1}]);
/// let flat = flatten_actions(&actions);
/// assert_eq!(flat, vec![&json!("a"), &json!("b"), &json!("c"), &json!({"k": 1})]);
/// assert!(flatten_actions(&json!(null)).is_empty());
/// ```
pub fn flatten_actions(value: &Value) -> Vec<&Value> {
    let mut flat = Vec::new();
    collect(value, &mut flat);
    flat
}

fn collect<'a>(value: &'a Value, flat: &mut Vec<&'a Value>) {
    match value {
        Value::Null => {}
        Value::Array(items) => items.iter().for_each(|item| collect(item, flat)),
        other => flat.push(other),
    }
}

/// Resolves an action list into concrete parameter sets.
///
/// Inline mappings become one action each; template names are replaced by
/// every combination of the named template. A missing list (`None`)
/// resolves to no actions.
///
/// # Errors
///
/// Returns [`Error::TemplateNotFound`] when a name does not refer to a
/// mapping at the top level of the document, and [`Error::Validation`] for
/// entries that are neither names nor mappings.
pub fn fill_template(
    document: &ParameterDocument,
    actions: Option<&Value>,
) -> Result<Vec<ParameterSet>> {
    let Some(actions) = actions else {
        return Ok(Vec::new());
    };
    let mut filled = Vec::new();
    for entry in flatten_actions(actions) {
        match entry {
            Value::Object(inline) => filled.push(inline.clone()),
            Value::String(name) => {
                let template = document
                    .template(name)
                    .ok_or_else(|| Error::TemplateNotFound { name: name.clone() })?;
                let parameters: ParameterSet = template
                    .iter()
                    .filter(|(key, _)| !TEMPLATE_RESERVED.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                let combinations = ParameterCombination::new(&parameters).combinations()?;
                trace!(template = %name, actions = combinations.len(), "Expanded template");
                filled.extend(combinations);
            }
            other => {
                return Err(Error::validation(format!(
                    "Action entry {other} is neither a template name nor a mapping"
                )));
            }
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> ParameterDocument {
        ParameterDocument::from_value(json!({
            "standard_test": {"temperature": 20, "param_1": 42},
            "sweep": {"setup": ["ignored"], "vdd": [1.0, 1.2]},
            "note": "not a template",
            "main": {"t": {"x": 1}},
        }))
        .unwrap()
    }

    #[test]
    fn test_none_resolves_to_nothing() {
        assert!(fill_template(&document(), None).unwrap().is_empty());
    }

    #[test]
    fn test_inline_mapping_is_kept() {
        let actions = json!([{"hardware": "initialize"}]);
        let filled = fill_template(&document(), Some(&actions)).unwrap();
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0]["hardware"], json!("initialize"));
    }

    #[test]
    fn test_template_name_is_replaced() {
        let actions = json!(["standard_test"]);
        let filled = fill_template(&document(), Some(&actions)).unwrap();
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0]["param_1"], json!(42));
    }

    #[test]
    fn test_bare_string_is_one_template() {
        let actions = json!("standard_test");
        let filled = fill_template(&document(), Some(&actions)).unwrap();
        assert_eq!(filled.len(), 1);
    }

    #[test]
    fn test_template_expands_lists_and_drops_reserved_keys() {
        let actions = json!([["sweep"], {"inline": true}]);
        let filled = fill_template(&document(), Some(&actions)).unwrap();
        assert_eq!(filled.len(), 3);
        assert_eq!(filled[1]["vdd"], json!(1.2));
        assert!(!filled[0].contains_key("setup"));
        assert_eq!(filled[2]["inline"], json!(true));
    }

    #[test]
    fn test_unknown_template() {
        let actions = json!(["unknown"]);
        let err = fill_template(&document(), Some(&actions)).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { name } if name == "unknown"));
    }

    #[test]
    fn test_non_mapping_top_level_key_is_not_a_template() {
        let actions = json!(["note"]);
        let err = fill_template(&document(), Some(&actions)).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }));
    }

    #[test]
    fn test_numeric_entry_is_rejected() {
        let actions = json!([42]);
        let err = fill_template(&document(), Some(&actions)).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
