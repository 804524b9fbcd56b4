//! Cartesian product of one action type's legal parameter values.

use super::lookup::{Combination, LegalValue};
use crate::{FlatError, Result};
use serde_json::{Map, Value};

/// Scheduling metadata parameter; never part of the discrete space.
pub const PRIORITY_PARAMETER: &str = "priority";

/// Every valid binding of `parameter_names` against `legal_values`.
///
/// `legal_values` maps each parameter name to its legal-value map (an object
/// from value identifier to value). Parameters are processed in the given
/// order, so earlier parameters vary slowest in the output. The output for a
/// given input is always in the same order.
pub fn combine(
    parameter_names: &[String],
    legal_values: &Map<String, Value>,
) -> Result<Vec<Combination>> {
    combine_excluding(parameter_names, legal_values, PRIORITY_PARAMETER)
}

/// `combine` with a caller-chosen name for the excluded metadata parameter.
pub fn combine_excluding(
    parameter_names: &[String],
    legal_values: &Map<String, Value>,
    excluded: &str,
) -> Result<Vec<Combination>> {
    let mut partials = vec![Combination::new()];

    for name in parameter_names.iter().filter(|n| n.as_str() != excluded) {
        let choices = legal_value_map(legal_values, name)?;

        // A single legal value is bound in place: no fan-out.
        let mut entries = choices.iter();
        if let (Some((key, value)), None) = (entries.next(), entries.next()) {
            let only = LegalValue::new(key.as_str(), value.clone());
            for partial in &mut partials {
                partial.bind(name, only.clone());
            }
            continue;
        }

        let mut expanded = Vec::with_capacity(partials.len() * choices.len());
        for partial in &partials {
            for (key, value) in choices {
                let mut next = partial.clone();
                next.bind(name, LegalValue::new(key.as_str(), value.clone()));
                expanded.push(next);
            }
        }
        partials = expanded;
    }

    Ok(partials)
}

fn legal_value_map<'a>(
    legal_values: &'a Map<String, Value>,
    parameter: &str,
) -> Result<&'a Map<String, Value>> {
    legal_values
        .get(parameter)
        .ok_or_else(|| {
            FlatError::MalformedActionSpace(format!(
                "no legal values for parameter `{}`",
                parameter
            ))
        })?
        .as_object()
        .ok_or_else(|| {
            FlatError::MalformedActionSpace(format!(
                "legal values for parameter `{}` are not a mapping",
                parameter
            ))
        })
}
