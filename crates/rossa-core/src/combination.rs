//! Parameter combination via products and zip groups.
//!
//! Every parameter holds a list of values (a scalar counts as a list of
//! one). The combinations of a parameter set are the cartesian product of
//! those lists, iterated in key order with the last key varying fastest.
//!
//! Parameters whose name carries a `#zip_<group>` modifier do not multiply
//! with each other: all members of a group advance in lockstep, so a group
//! of three-valued parameters contributes three combinations rather than
//! nine.
//!
//! ```
//! use rossa_core::combination::ParameterCombination;
//! use serde_json::json;
//!
//! let params = json!({
//!     "temperature": [25, 26],
//!     "param_1#zip_corner": [1, 2, 3],
//!     "param_2#zip_corner": ["a", "b", "c"],
//! });
//! let combination = ParameterCombination::new(params.as_object().unwrap());
//! let combinations = combination.combinations().unwrap();
//!
//! assert_eq!(combinations.len(), 6);
//! assert_eq!(combinations[1]["param_1"], json!(2));
//! assert_eq!(combinations[1]["param_2"], json!("b"));
//! ```

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// An ordered set of named parameter values.
pub type ParameterSet = Map<String, Value>;

const ZIP_MARKER: &str = "#zip_";

/// Product-and-zip expansion of a parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCombination {
    names: Vec<String>,
    values: Vec<Vec<Value>>,
}

/// One independent iteration axis: a free parameter or a whole zip group.
#[derive(Debug)]
struct Axis {
    len: usize,
    members: Vec<usize>,
}

impl ParameterCombination {
    /// Creates a combination from raw parameters.
    ///
    /// Values that are not lists are treated as single-element lists.
    pub fn new(parameters: &ParameterSet) -> Self {
        Self::from_entries(parameters.iter().map(|(name, value)| {
            let values = match value {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            };
            (name.clone(), values)
        }))
    }

    /// Creates a combination from already listified entries.
    ///
    /// Use this when a value must not be expanded even if it is a list,
    /// e.g. a value already selected by an outer loop.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Value>)>,
    {
        let (names, values) = entries.into_iter().unzip();
        Self { names, values }
    }

    /// Returns the raw parameter names, modifiers included.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the value counts of all parameters with more than one value.
    pub fn shape(&self) -> Vec<usize> {
        self.values
            .iter()
            .map(Vec::len)
            .filter(|len| *len > 1)
            .collect()
    }

    /// Returns the zip group of every parameter with more than one value.
    ///
    /// Parameters without a zip modifier yield `None`.
    pub fn zip_groups(&self) -> Vec<Option<&str>> {
        self.names
            .iter()
            .zip(&self.values)
            .filter(|(_, values)| values.len() > 1)
            .map(|(name, _)| Self::get_zip_group(name))
            .collect()
    }

    /// Extracts the zip group name from a parameter name.
    ///
    /// ```
    /// use rossa_core::combination::ParameterCombination;
    ///
    /// assert_eq!(ParameterCombination::get_zip_group("vdd#zip_corner"), Some("corner"));
    /// assert_eq!(ParameterCombination::get_zip_group("vdd#zip_corner#x"), Some("corner"));
    /// assert_eq!(ParameterCombination::get_zip_group("vdd"), None);
    /// ```
    pub fn get_zip_group(name: &str) -> Option<&str> {
        let (_, rest) = name.split_once(ZIP_MARKER)?;
        let group = rest.split('#').next().unwrap_or_default();
        (!group.is_empty()).then_some(group)
    }

    /// Strips every `#` modifier from a parameter name.
    pub fn pure_name(name: &str) -> &str {
        name.split('#').next().unwrap_or(name)
    }

    /// Expands the parameters into all valid combinations.
    ///
    /// Output keys are pure names. When two raw names share a pure name the
    /// later value wins while the key keeps its first position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a parameter without values or when
    /// the number of combinations does not fit in memory, and
    /// [`Error::ZipLengthMismatch`] when members of one zip group differ in
    /// length.
    pub fn combinations(&self) -> Result<Vec<ParameterSet>> {
        let axes = self.axes()?;
        let mut axis_of = vec![None; self.names.len()];
        for (i_axis, axis) in axes.iter().enumerate() {
            for &member in &axis.members {
                axis_of[member] = Some(i_axis);
            }
        }

        let total = checked_product(axes.iter().map(|axis| axis.len))?;
        let mut combinations = Vec::new();
        combinations
            .try_reserve(total)
            .map_err(|_| Error::validation("too many combinations"))?;
        let mut counter = vec![0usize; axes.len()];
        for _ in 0..total {
            let mut combination = ParameterSet::new();
            for (i_param, (name, values)) in self.names.iter().zip(&self.values).enumerate() {
                let i_value = axis_of[i_param].map_or(0, |i_axis| counter[i_axis]);
                combination.insert(Self::pure_name(name).to_string(), values[i_value].clone());
            }
            combinations.push(combination);
            advance(&mut counter, &axes);
        }
        Ok(combinations)
    }

    /// Groups multi-valued parameters into iteration axes in order of first appearance.
    fn axes(&self) -> Result<Vec<Axis>> {
        let mut axes: Vec<Axis> = Vec::new();
        let mut group_axis: Vec<(&str, usize)> = Vec::new();
        for (i_param, (name, values)) in self.names.iter().zip(&self.values).enumerate() {
            if values.is_empty() {
                return Err(Error::validation_field(
                    name.clone(),
                    "parameter has an empty value list",
                ));
            }
            if values.len() == 1 {
                continue;
            }
            let Some(group) = Self::get_zip_group(name) else {
                axes.push(Axis {
                    len: values.len(),
                    members: vec![i_param],
                });
                continue;
            };
            match group_axis.iter().find(|(known, _)| *known == group) {
                Some(&(_, i_axis)) => {
                    let axis = &mut axes[i_axis];
                    if axis.len != values.len() {
                        let lengths = axis
                            .members
                            .iter()
                            .map(|&member| self.values[member].len())
                            .chain(std::iter::once(values.len()))
                            .collect();
                        return Err(Error::ZipLengthMismatch {
                            group: group.to_string(),
                            lengths,
                        });
                    }
                    axis.members.push(i_param);
                }
                None => {
                    group_axis.push((group, axes.len()));
                    axes.push(Axis {
                        len: values.len(),
                        members: vec![i_param],
                    });
                }
            }
        }
        Ok(axes)
    }
}

/// Advances a mixed-radix counter, last axis fastest.
/// Multiplies axis lengths, failing instead of overflowing.
pub(crate) fn checked_product(lengths: impl IntoIterator<Item = usize>) -> Result<usize> {
    lengths
        .into_iter()
        .try_fold(1usize, |total, len| total.checked_mul(len))
        .ok_or_else(|| Error::validation("too many combinations"))
}

fn advance(counter: &mut [usize], axes: &[Axis]) {
    for (digit, axis) in counter.iter_mut().zip(axes).rev() {
        *digit += 1;
        if *digit < axis.len {
            return;
        }
        *digit = 0;
    }
}
