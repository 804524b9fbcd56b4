//! Domain translator for `NetworkDefense`.

use crate::network_defense::DefenseObservation;
use flatwrap::action::{ActionRegistry, ActionTypeDescriptor, SignatureSource};
use flatwrap::env::DomainTranslator;

/// Parameter signatures and observation features for `NetworkDefense`.
///
/// Features per host: attacker activity (0 or 1), then the last known
/// foothold level (0 clean, 1 user, 2 privileged, -1 while offline). The final
/// feature is episode progress in [0, 1].
#[derive(Clone, Debug)]
pub struct NetworkTranslator {
    registry: ActionRegistry,
}

impl NetworkTranslator {
    pub fn new() -> Self {
        let host_action = ["session", "agent", "hostname", "priority"];
        let registry = ActionRegistry::new()
            .register(ActionTypeDescriptor::new("Sleep", Vec::<String>::new()))
            .register(ActionTypeDescriptor::new("Monitor", ["session", "agent"]))
            .register(ActionTypeDescriptor::new("Analyse", host_action))
            .register(ActionTypeDescriptor::new("Remove", host_action))
            .register(ActionTypeDescriptor::new("Restore", host_action));
        Self { registry }
    }
}

impl Default for NetworkTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureSource for NetworkTranslator {
    fn action_signature(&self, action_type: &str) -> Option<ActionTypeDescriptor> {
        self.registry.action_signature(action_type)
    }
}

impl DomainTranslator for NetworkTranslator {
    type Observation = DefenseObservation;

    fn observation_features(&self, _agent: &str, observation: &DefenseObservation) -> Vec<f64> {
        let mut features = Vec::with_capacity(observation.hosts.len() * 2 + 1);
        for host in &observation.hosts {
            features.push(if host.activity { 1.0 } else { 0.0 });
            features.push(if host.offline { -1.0 } else { host.known.level() });
        }
        features.push(observation.progress);
        features
    }
}
