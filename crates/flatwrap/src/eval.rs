//! Evaluation driver.
//!
//! Plays whole episodes with one `Agent` per possible agent and summarises
//! returns and lengths.

use crate::env::{DomainTranslator, EpisodeOrchestrator, Simulation};
use crate::spaces::{Discrete, Space};
use crate::{AgentId, Result};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A decision maker for one agent.
pub trait Agent {
    /// Choose an index in `action_space`, or `None` to take no action
    fn get_action(&mut self, observation: &Array1<f32>, action_space: &Discrete) -> Option<usize>;

    /// Called after every episode
    fn end_episode(&mut self) {}
}

/// Uniformly random actions
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn get_action(&mut self, _observation: &Array1<f32>, action_space: &Discrete) -> Option<usize> {
        action_space.sample(&mut self.rng)
    }
}

/// Maps an arbitrary scalar policy output into the current space as
/// `|output| mod n`.
///
/// Useful for policies trained against a different (or no) action-space size.
pub struct ModuloAgent<F>
where
    F: FnMut(&Array1<f32>) -> f64,
{
    policy: F,
}

impl<F> ModuloAgent<F>
where
    F: FnMut(&Array1<f32>) -> f64,
{
    pub fn new(policy: F) -> Self {
        Self { policy }
    }
}

impl<F> Agent for ModuloAgent<F>
where
    F: FnMut(&Array1<f32>) -> f64,
{
    fn get_action(&mut self, observation: &Array1<f32>, action_space: &Discrete) -> Option<usize> {
        if action_space.is_empty() {
            return None;
        }
        let output = (self.policy)(observation).abs();
        // NaN and infinities saturate; the modulo keeps them in range
        Some(output as usize % action_space.n)
    }
}

/// Evaluation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Number of episodes to play
    pub episodes: usize,
    /// Step limit per episode
    pub max_steps: u32,
    /// Seed of the first episode; episode `i` uses `seed + i`, wrapping at `u64::MAX`
    pub seed: Option<u64>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            episodes: 10,
            max_steps: 100,
            seed: None,
        }
    }
}

/// Outcome of one evaluated episode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub length: u32,
    pub returns: HashMap<AgentId, f64>,
}

/// Outcome of `evaluate`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    pub episodes: Vec<EpisodeRecord>,
}

impl EvalSummary {
    /// Mean episode length
    pub fn mean_length(&self) -> f64 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        let total: u32 = self.episodes.iter().map(|e| e.length).sum();
        total as f64 / self.episodes.len() as f64
    }

    /// Mean return of `agent` across episodes
    pub fn mean_return(&self, agent: &str) -> Option<f64> {
        let returns: Vec<f64> = self
            .episodes
            .iter()
            .filter_map(|e| e.returns.get(agent).copied())
            .collect();
        if returns.is_empty() {
            return None;
        }
        Some(returns.iter().sum::<f64>() / returns.len() as f64)
    }

    /// Mean over episodes of the summed return of all agents
    pub fn mean_total_return(&self) -> f64 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .episodes
            .iter()
            .map(|e| e.returns.values().sum::<f64>())
            .sum();
        total / self.episodes.len() as f64
    }
}

/// Play `config.episodes` episodes on `env`.
///
/// Each active agent with an entry in `agents` is asked for an action every
/// step; agents without one are sent nothing. An episode ends when every
/// agent has terminated or after `config.max_steps` steps.
pub fn evaluate<S, T>(
    env: &mut EpisodeOrchestrator<S, T>,
    agents: &mut HashMap<AgentId, Box<dyn Agent>>,
    config: &EvalConfig,
) -> Result<EvalSummary>
where
    S: Simulation,
    T: DomainTranslator<Observation = S::Observation>,
{
    let mut summary = EvalSummary::default();

    for episode in 0..config.episodes {
        let seed = config.seed.map(|s| s.wrapping_add(episode as u64));
        let mut observations = env.reset(seed)?;

        let mut steps = 0;
        while steps < config.max_steps && !env.is_done() {
            let mut actions = HashMap::new();
            for agent_id in env.active_agents() {
                let (Some(agent), Some(obs)) =
                    (agents.get_mut(&agent_id), observations.get(&agent_id))
                else {
                    continue;
                };
                let space = env.action_space(&agent_id)?;
                actions.insert(agent_id, agent.get_action(obs, &space));
            }

            let step = env.step(&actions)?;
            observations.extend(step.observations);
            steps += 1;
        }

        let stats = env.episode_stats()?;
        tracing::info!(
            episode,
            length = stats.length(),
            total_return = stats.total_return(),
            "Evaluated episode"
        );
        summary.episodes.push(EpisodeRecord {
            length: stats.length(),
            returns: stats.returns().clone(),
        });

        for agent in agents.values_mut() {
            agent.end_episode();
        }
    }

    Ok(summary)
}
