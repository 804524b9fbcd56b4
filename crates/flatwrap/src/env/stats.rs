//! Episode statistics.

use crate::AgentId;
use std::collections::HashMap;

/// Cumulative return per agent and the number of steps taken this episode.
///
/// Kept apart from the per-step reward state, which is replaced every step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeStats {
    returns: HashMap<AgentId, f64>,
    length: u32,
}

impl EpisodeStats {
    /// Start an episode with a zero return for each agent
    pub fn new(agents: &[AgentId]) -> Self {
        Self {
            returns: agents.iter().map(|a| (a.clone(), 0.0)).collect(),
            length: 0,
        }
    }

    /// Add one step's scalar rewards
    pub fn record(&mut self, rewards: &HashMap<AgentId, f64>) {
        for (agent, reward) in rewards {
            *self.returns.entry(agent.clone()).or_insert(0.0) += reward;
        }
        self.length += 1;
    }

    pub fn episode_return(&self, agent: &str) -> Option<f64> {
        self.returns.get(agent).copied()
    }

    pub fn returns(&self) -> &HashMap<AgentId, f64> {
        &self.returns
    }

    /// Sum of every agent's return
    pub fn total_return(&self) -> f64 {
        self.returns.values().sum()
    }

    /// Steps taken so far
    pub fn length(&self) -> u32 {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_stats() {
        let agents = vec!["a".to_string(), "b".to_string()];
        let mut stats = EpisodeStats::new(&agents);
        assert_eq!(stats.episode_return("a"), Some(0.0));

        for _ in 0..4 {
            let rewards: HashMap<_, _> = [("a".to_string(), 1.0), ("b".to_string(), -0.5)]
                .into_iter()
                .collect();
            stats.record(&rewards);
        }

        assert_eq!(stats.length(), 4);
        assert_eq!(stats.episode_return("a"), Some(4.0));
        assert_eq!(stats.episode_return("b"), Some(-2.0));
        assert_eq!(stats.total_return(), 2.0);
        assert_eq!(stats.episode_return("c"), None);
    }
}
