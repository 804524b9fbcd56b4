//! Per-agent enumeration of the current parameterized action space.

use super::combinator::combine_excluding;
use super::descriptor::{SignatureCache, SignatureSource};
use super::lookup::{ActionLookupTable, ConcreteAction};
use crate::config::WrapperConfig;
use crate::{FlatError, Result};
use serde_json::Value;

/// Key under which the simulation lists the offered action types.
pub const ACTION_KEY: &str = "action";

/// Expands a simulation's raw action space into an `ActionLookupTable`.
///
/// The raw space is a mapping with the offered action types under
/// `action_key` and one legal-value map per parameter under the parameter's
/// own name:
///
/// ```json
/// {
///     "action": {"Sleep": true, "Analyse": true},
///     "session": {"0": true},
///     "hostname": {"user_host_0": true, "op_server_0": true}
/// }
/// ```
///
/// The enumerator owns the signature cache, so parameter names are asked of
/// the `SignatureSource` once per action type for the lifetime of the
/// enumerator.
#[derive(Clone, Debug)]
pub struct ActionSpaceEnumerator {
    signatures: SignatureCache,
    action_key: String,
    priority_parameter: String,
}

impl Default for ActionSpaceEnumerator {
    fn default() -> Self {
        Self::from_config(&WrapperConfig::default())
    }
}

impl ActionSpaceEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &WrapperConfig) -> Self {
        Self {
            signatures: SignatureCache::new(),
            action_key: config.action_key.clone(),
            priority_parameter: config.priority_parameter.clone(),
        }
    }

    /// Cached signatures seen so far
    pub fn signatures(&self) -> &SignatureCache {
        &self.signatures
    }

    /// Enumerate every concrete action `agent` may take right now.
    ///
    /// Action types keep the catalog's order; within a type, combinations keep
    /// the order produced by `combine`.
    pub fn enumerate<S>(
        &mut self,
        agent: &str,
        action_space: &Value,
        source: &S,
    ) -> Result<ActionLookupTable>
    where
        S: SignatureSource + ?Sized,
    {
        let root = action_space.as_object().ok_or_else(|| {
            FlatError::MalformedActionSpace(format!(
                "action space for agent `{}` is not a mapping",
                agent
            ))
        })?;
        let catalog = root
            .get(&self.action_key)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                FlatError::MalformedActionSpace(format!(
                    "action space for agent `{}` has no `{}` mapping",
                    agent, self.action_key
                ))
            })?;

        let mut actions = Vec::new();
        for action_type in catalog.keys() {
            let parameters = self
                .signatures
                .resolve(action_type, source)
                .ok_or_else(|| {
                    FlatError::MalformedActionSpace(format!(
                        "unknown action type `{}`",
                        action_type
                    ))
                })?;
            let combinations = combine_excluding(parameters, root, &self.priority_parameter)?;
            actions.extend(
                combinations
                    .into_iter()
                    .map(|params| ConcreteAction::new(action_type.as_str(), params)),
            );
        }

        tracing::debug!(
            agent,
            action_types = catalog.len(),
            size = actions.len(),
            "Enumerated action space"
        );
        Ok(ActionLookupTable::new(actions))
    }
}
