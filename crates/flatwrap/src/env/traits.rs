//! Collaborator traits and step results.

use crate::action::{ConcreteAction, SignatureSource};
use crate::AgentId;
use ndarray::Array1;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Named reward components for one agent, e.g. availability and integrity.
pub type RewardComponents = BTreeMap<String, f64>;

/// Result of one parallel step of the underlying simulation
#[derive(Clone, Debug)]
pub struct RawParallelStep<O, I> {
    /// Native observations per agent
    pub observations: HashMap<AgentId, O>,
    /// Multi-component rewards per agent
    pub rewards: HashMap<AgentId, RewardComponents>,
    /// Whether each agent reached a terminal state
    pub terminated: HashMap<AgentId, bool>,
    /// Auxiliary info per agent
    pub infos: HashMap<AgentId, I>,
}

impl<O, I> Default for RawParallelStep<O, I> {
    fn default() -> Self {
        Self {
            observations: HashMap::new(),
            rewards: HashMap::new(),
            terminated: HashMap::new(),
            infos: HashMap::new(),
        }
    }
}

/// Result of `EpisodeOrchestrator::step`
#[derive(Clone, Debug)]
pub struct ParallelStep<I> {
    /// Fixed-length observation vectors per agent
    pub observations: HashMap<AgentId, Array1<f32>>,
    /// Scalar reward per agent (sum of its components)
    pub rewards: HashMap<AgentId, f64>,
    /// Termination flags as returned by the simulation
    pub terminated: HashMap<AgentId, bool>,
    /// Auxiliary info, passed through untouched
    pub infos: HashMap<AgentId, I>,
}

impl<I> ParallelStep<I> {
    /// Check if every reporting agent terminated on this step
    pub fn all_done(&self) -> bool {
        !self.terminated.is_empty() && self.terminated.values().all(|&d| d)
    }
}

/// A multi-agent simulation with parameterized actions.
///
/// Implementations own state transitions and domain modelling; the wrapper
/// only sees raw observations, raw action spaces and step results.
pub trait Simulation: Send {
    /// Native per-agent observation
    type Observation;

    /// Auxiliary per-agent step info
    type Info;

    /// Every agent that can ever act, fixed for the simulation's lifetime
    fn possible_agents(&self) -> Vec<AgentId>;

    /// Reset to an initial state
    ///
    /// # Arguments
    /// * `seed` - Optional random seed for reproducibility
    ///
    /// # Returns
    /// Initial observations; agents missing here are queried with `observation`
    fn reset(&mut self, seed: Option<u64>) -> HashMap<AgentId, Self::Observation>;

    /// Advance every agent at once
    ///
    /// Agents absent from `actions` take the simulation's default action.
    fn parallel_step(
        &mut self,
        actions: &HashMap<AgentId, ConcreteAction>,
    ) -> RawParallelStep<Self::Observation, Self::Info>;

    /// Raw action space for `agent` at the current decision point
    ///
    /// Expected shape: offered action types under the `"action"` key,
    /// and one legal-value mapping per parameter under its own name.
    fn action_space(&self, agent: &str) -> Value;

    /// Current native observation for `agent`
    fn observation(&self, agent: &str) -> Self::Observation;

    /// Optional: Render the simulation
    fn render(&self) -> Option<String> {
        None
    }

    /// Optional: Close the simulation and free resources
    fn close(&mut self) {}
}

/// Domain knowledge the wrapper needs in both directions: flat features out of
/// native observations, and parameter signatures for building actions.
pub trait DomainTranslator: SignatureSource + Send {
    /// Native observation this translator understands
    type Observation;

    /// Flatten one agent's observation into numeric features
    fn observation_features(&self, agent: &str, observation: &Self::Observation) -> Vec<f64>;
}
