//! Concrete actions and the per-agent index -> action table.

use crate::spaces::Discrete;
use crate::{AgentId, FlatError, Result};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;

/// One entry of a legal-value map: the identifier and the value it names.
#[derive(Clone, Debug, PartialEq)]
pub struct LegalValue {
    pub key: String,
    pub value: Value,
}

impl LegalValue {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A parameter bound to one legal value.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub parameter: String,
    pub value: LegalValue,
}

/// Parameter bindings for one action type, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Combination {
    // Most action types take at most a handful of parameters
    bindings: SmallVec<[Binding; 4]>,
}

impl Combination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `parameter`, replacing an earlier binding of the same name
    pub fn bind(&mut self, parameter: &str, value: LegalValue) {
        match self.bindings.iter_mut().find(|b| b.parameter == parameter) {
            Some(existing) => existing.value = value,
            None => self.bindings.push(Binding {
                parameter: parameter.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, parameter: &str) -> Option<&LegalValue> {
        self.bindings
            .iter()
            .find(|b| b.parameter == parameter)
            .map(|b| &b.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A fully bound action: an action type plus one legal value per parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ConcreteAction {
    pub action_type: String,
    pub parameters: Combination,
}

impl ConcreteAction {
    pub fn new(action_type: impl Into<String>, parameters: Combination) -> Self {
        Self {
            action_type: action_type.into(),
            parameters,
        }
    }

    /// Value identifier bound to `parameter`
    pub fn key(&self, parameter: &str) -> Option<&str> {
        self.parameters.get(parameter).map(|v| v.key.as_str())
    }
}

impl fmt::Display for ConcreteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.action_type)?;
        for (i, binding) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", binding.parameter, binding.value.key)?;
        }
        write!(f, ")")
    }
}

/// Ordered concrete actions for one agent at one decision point.
///
/// Index `i` of a discrete action refers to entry `i` of the most recent table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionLookupTable {
    actions: Vec<ConcreteAction>,
}

impl ActionLookupTable {
    pub fn new(actions: Vec<ConcreteAction>) -> Self {
        Self { actions }
    }

    /// Discrete action-space size
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ConcreteAction> {
        self.actions.get(index)
    }

    /// Look up `index`, failing with `InvalidActionIndex` outside `[0, len)`
    pub fn resolve(&self, agent: &str, index: usize) -> Result<&ConcreteAction> {
        self.actions
            .get(index)
            .ok_or_else(|| FlatError::InvalidActionIndex {
                agent: AgentId::from(agent),
                index,
                size: self.actions.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConcreteAction> {
        self.actions.iter()
    }

    /// Discrete space advertised for this table
    pub fn space(&self) -> Discrete {
        Discrete::new(self.actions.len())
    }
}
