//! Action type signatures and the per-enumerator signature cache.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An abstract action type together with its ordered parameter names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTypeDescriptor {
    /// Name the simulation uses for this action type in its action space
    pub name: String,
    /// Parameter names in declaration order
    pub parameters: Vec<String>,
}

impl ActionTypeDescriptor {
    pub fn new<I, P>(name: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }
}

/// Anything that can tell the enumerator which parameters an action type takes.
pub trait SignatureSource {
    /// Descriptor for `action_type`, or `None` if the type is unknown
    fn action_signature(&self, action_type: &str) -> Option<ActionTypeDescriptor>;
}

/// Descriptors registered up front by a domain translator.
#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    descriptors: HashMap<String, ActionTypeDescriptor>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same name
    pub fn register(mut self, descriptor: ActionTypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn insert(&mut self, descriptor: ActionTypeDescriptor) {
        self.descriptors.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, action_type: &str) -> Option<&ActionTypeDescriptor> {
        self.descriptors.get(action_type)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl SignatureSource for ActionRegistry {
    fn action_signature(&self, action_type: &str) -> Option<ActionTypeDescriptor> {
        self.get(action_type).cloned()
    }
}

/// Parameter names per action type, filled on first encounter.
///
/// Parameter names are structural, so entries are never invalidated; only the
/// legal values change between decision points.
#[derive(Clone, Debug, Default)]
pub struct SignatureCache {
    entries: HashMap<String, Vec<String>>,
}

impl SignatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameter names of `action_type`, consulting `source` only on a miss
    pub fn resolve<S>(&mut self, action_type: &str, source: &S) -> Option<&[String]>
    where
        S: SignatureSource + ?Sized,
    {
        if !self.entries.contains_key(action_type) {
            let descriptor = source.action_signature(action_type)?;
            self.entries
                .insert(action_type.to_string(), descriptor.parameters);
        }
        self.entries.get(action_type).map(Vec::as_slice)
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.entries.contains_key(action_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
