use super::stats::EpisodeStats;
use super::traits::{DomainTranslator, ParallelStep, Simulation};
use crate::action::{ActionLookupTable, ActionSpaceEnumerator, ConcreteAction};
use crate::config::WrapperConfig;
use crate::observation::ObservationVectorizer;
use crate::spaces::{Box as BoxSpace, Discrete};
use crate::{AgentId, FlatError, Result};
use ndarray::Array1;
use std::collections::HashMap;

/// Per-episode state, replaced wholesale on every reset.
#[derive(Debug)]
struct Episode {
    /// Lookup table per agent for the current decision point
    lookup: HashMap<AgentId, ActionLookupTable>,
    /// Set by `step`: tables describe the previous decision point
    stale: bool,
    terminated: HashMap<AgentId, bool>,
    rewards: HashMap<AgentId, f64>,
    stats: EpisodeStats,
}

impl Episode {
    fn new(agents: &[AgentId], lookup: HashMap<AgentId, ActionLookupTable>) -> Self {
        Self {
            lookup,
            stale: false,
            terminated: agents.iter().map(|a| (a.clone(), false)).collect(),
            rewards: agents.iter().map(|a| (a.clone(), 0.0)).collect(),
            stats: EpisodeStats::new(agents),
        }
    }

    fn all_terminated(&self) -> bool {
        self.terminated.values().all(|&d| d)
    }
}

/// Drives a `Simulation` as a parallel multi-agent environment with a
/// discrete action space and fixed-length observations per agent.
///
/// Observation lengths are fixed at construction. Action spaces are
/// re-enumerated on every reset and, after each step, the next time the
/// tables are needed, so the sizes reported by the accessors are always the
/// ones the next `step` resolves indices against.
pub struct EpisodeOrchestrator<S, T>
where
    S: Simulation,
    T: DomainTranslator<Observation = S::Observation>,
{
    sim: S,
    translator: T,
    possible_agents: Vec<AgentId>,
    enumerator: ActionSpaceEnumerator,
    vectorizer: ObservationVectorizer,
    episode: Option<Episode>,
}

impl<S, T> EpisodeOrchestrator<S, T>
where
    S: Simulation,
    T: DomainTranslator<Observation = S::Observation>,
{
    /// Wrap `sim`, fixing each agent's observation length from its current
    /// observation.
    pub fn new(sim: S, translator: T, config: WrapperConfig) -> Result<Self> {
        config.validate()?;

        let possible_agents = sim.possible_agents();
        let mut vectorizer = ObservationVectorizer::from_config(&config);
        for agent in &possible_agents {
            let features = translator.observation_features(agent, &sim.observation(agent));
            vectorizer.register(agent, &features);
        }

        tracing::info!(
            agents = possible_agents.len(),
            obs_low = config.obs_low,
            obs_high = config.obs_high,
            "Created parallel environment"
        );

        Ok(Self {
            sim,
            translator,
            possible_agents,
            enumerator: ActionSpaceEnumerator::from_config(&config),
            vectorizer,
            episode: None,
        })
    }

    /// Reset the simulation and start a new episode.
    ///
    /// Rewards go back to zero, termination flags to false, and every agent's
    /// action space is enumerated afresh.
    ///
    /// # Returns
    /// The initial observation vector of every possible agent
    pub fn reset(&mut self, seed: Option<u64>) -> Result<HashMap<AgentId, Array1<f32>>> {
        // A failed reset leaves no episode behind
        self.episode = None;

        let mut initial = self.sim.reset(seed);

        let mut lookup = HashMap::with_capacity(self.possible_agents.len());
        for agent in &self.possible_agents {
            let space = self.sim.action_space(agent);
            let table = self.enumerator.enumerate(agent, &space, &self.translator)?;
            lookup.insert(agent.clone(), table);
        }

        let mut observations = HashMap::with_capacity(self.possible_agents.len());
        for agent in &self.possible_agents {
            let features = match initial.remove(agent) {
                Some(obs) => self.translator.observation_features(agent, &obs),
                None => self
                    .translator
                    .observation_features(agent, &self.sim.observation(agent)),
            };
            observations.insert(agent.clone(), self.vectorizer.vectorize(agent, &features)?);
        }

        self.episode = Some(Episode::new(&self.possible_agents, lookup));
        tracing::info!(seed = ?seed, agents = self.possible_agents.len(), "Environment reset");
        Ok(observations)
    }

    /// Take one parallel step.
    ///
    /// Every index is resolved against the agent's current lookup table
    /// before anything reaches the simulation: a single bad index or unknown
    /// agent fails the whole call and no action is forwarded. Agents mapped
    /// to `None` (or left out) are not sent an action.
    ///
    /// Rewards, termination flags and episode statistics are updated before
    /// observations are vectorized, so they still describe the simulation's
    /// state when vectorizing fails with `ObservationShape`.
    pub fn step(
        &mut self,
        actions: &HashMap<AgentId, Option<usize>>,
    ) -> Result<ParallelStep<S::Info>> {
        self.refresh_action_spaces()?;
        let resolved = self.resolve_actions(actions)?;
        tracing::debug!(
            requested = actions.len(),
            forwarded = resolved.len(),
            "Resolved discrete actions"
        );

        let raw = self.sim.parallel_step(&resolved);
        let episode = self.episode.as_mut().ok_or(FlatError::NotReset)?;
        episode.stale = true;

        let rewards: HashMap<AgentId, f64> = raw
            .rewards
            .iter()
            .map(|(agent, components)| (agent.clone(), components.values().sum()))
            .collect();

        // Replace, never accumulate: agents without a reward this step get zero.
        episode.rewards = self
            .possible_agents
            .iter()
            .map(|a| (a.clone(), rewards.get(a).copied().unwrap_or(0.0)))
            .collect();

        let missing = self
            .possible_agents
            .iter()
            .filter(|a| !raw.terminated.contains_key(*a))
            .count();
        if missing > 0 {
            tracing::warn!(missing, "Step result omits termination flags for some agents");
        }

        let was_done = episode.all_terminated();
        for (agent, &done) in &raw.terminated {
            match episode.terminated.get_mut(agent) {
                Some(flag) => *flag = done,
                None => {
                    tracing::warn!(agent = agent.as_str(), "Simulation reported unknown agent")
                }
            }
        }

        episode.stats.record(&rewards);

        if episode.all_terminated() && !was_done {
            tracing::info!(
                length = episode.stats.length(),
                total_return = episode.stats.total_return(),
                "Episode finished"
            );
        }

        let mut observations = HashMap::with_capacity(raw.observations.len());
        for (agent, obs) in &raw.observations {
            let features = self.translator.observation_features(agent, obs);
            observations.insert(agent.clone(), self.vectorizer.vectorize(agent, &features)?);
        }

        Ok(ParallelStep {
            observations,
            rewards,
            terminated: raw.terminated,
            infos: raw.infos,
        })
    }

    fn resolve_actions(
        &self,
        actions: &HashMap<AgentId, Option<usize>>,
    ) -> Result<HashMap<AgentId, ConcreteAction>> {
        let episode = self.episode.as_ref().ok_or(FlatError::NotReset)?;

        let mut resolved = HashMap::with_capacity(actions.len());
        for (agent, index) in actions {
            let table = episode
                .lookup
                .get(agent)
                .ok_or_else(|| FlatError::UnknownAgent(agent.clone()))?;
            if let Some(index) = *index {
                resolved.insert(agent.clone(), table.resolve(agent, index)?.clone());
            }
        }
        Ok(resolved)
    }

    /// Re-enumerate every agent's action space if a step happened since the
    /// last enumeration.
    fn refresh_action_spaces(&mut self) -> Result<()> {
        let episode = self.episode.as_mut().ok_or(FlatError::NotReset)?;
        if !episode.stale {
            return Ok(());
        }

        let mut lookup = HashMap::with_capacity(self.possible_agents.len());
        for agent in &self.possible_agents {
            let space = self.sim.action_space(agent);
            let table = self.enumerator.enumerate(agent, &space, &self.translator)?;
            lookup.insert(agent.clone(), table);
        }

        episode.lookup = lookup;
        episode.stale = false;
        Ok(())
    }

    /// Lookup table for `agent` at the current decision point
    pub fn action_lookup(&mut self, agent: &str) -> Result<&ActionLookupTable> {
        self.refresh_action_spaces()?;
        let episode = self.episode.as_ref().ok_or(FlatError::NotReset)?;
        episode
            .lookup
            .get(agent)
            .ok_or_else(|| FlatError::UnknownAgent(AgentId::from(agent)))
    }

    /// Number of discrete actions `agent` may choose from right now
    pub fn action_space_size(&mut self, agent: &str) -> Result<usize> {
        Ok(self.action_lookup(agent)?.len())
    }

    /// Discrete action space for `agent` at the current decision point
    pub fn action_space(&mut self, agent: &str) -> Result<Discrete> {
        Ok(self.action_lookup(agent)?.space())
    }

    /// Discrete action spaces of every possible agent
    pub fn action_spaces(&mut self) -> Result<HashMap<AgentId, Discrete>> {
        self.refresh_action_spaces()?;
        let episode = self.episode.as_ref().ok_or(FlatError::NotReset)?;
        Ok(episode
            .lookup
            .iter()
            .map(|(agent, table)| (agent.clone(), table.space()))
            .collect())
    }

    /// Observation vector length for `agent`, fixed for this instance
    pub fn observation_shape(&self, agent: &str) -> Result<usize> {
        self.vectorizer.shape(agent)
    }

    /// Observation space for `agent`
    pub fn observation_space(&self, agent: &str) -> Result<BoxSpace> {
        self.vectorizer.space(agent)
    }

    /// Observation spaces of every possible agent
    pub fn observation_spaces(&self) -> Result<HashMap<AgentId, BoxSpace>> {
        self.possible_agents
            .iter()
            .map(|agent| Ok((agent.clone(), self.vectorizer.space(agent)?)))
            .collect()
    }

    /// Current observation of `agent`, vectorized
    pub fn observation(&self, agent: &str) -> Result<Array1<f32>> {
        let features = self
            .translator
            .observation_features(agent, &self.sim.observation(agent));
        self.vectorizer.vectorize(agent, &features)
    }

    /// Every agent that can ever act
    pub fn possible_agents(&self) -> &[AgentId] {
        &self.possible_agents
    }

    /// Possible agents that have not terminated this episode
    pub fn active_agents(&self) -> Vec<AgentId> {
        match &self.episode {
            Some(episode) => self
                .possible_agents
                .iter()
                .filter(|a| !episode.terminated.get(*a).copied().unwrap_or(false))
                .cloned()
                .collect(),
            None => self.possible_agents.clone(),
        }
    }

    /// Scalar rewards written by the last `step` (zero after reset)
    pub fn rewards(&self) -> Result<&HashMap<AgentId, f64>> {
        Ok(&self.episode.as_ref().ok_or(FlatError::NotReset)?.rewards)
    }

    /// Termination flags as of the last `step`
    pub fn terminations(&self) -> Result<&HashMap<AgentId, bool>> {
        Ok(&self.episode.as_ref().ok_or(FlatError::NotReset)?.terminated)
    }

    /// Statistics of the current episode
    pub fn episode_stats(&self) -> Result<&EpisodeStats> {
        Ok(&self.episode.as_ref().ok_or(FlatError::NotReset)?.stats)
    }

    /// Check if every possible agent has terminated
    pub fn is_done(&self) -> bool {
        self.episode.as_ref().map_or(false, Episode::all_terminated)
    }

    /// Get a reference to the wrapped simulation
    pub fn inner(&self) -> &S {
        &self.sim
    }

    /// Get a reference to the domain translator
    pub fn translator(&self) -> &T {
        &self.translator
    }

    pub fn render(&self) -> Option<String> {
        self.sim.render()
    }

    pub fn close(&mut self) {
        self.sim.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionRegistry, ActionTypeDescriptor, SignatureSource};
    use crate::env::{RawParallelStep, RewardComponents};
    use crate::spaces::Space;
    use serde_json::{json, Map, Value};

    const BLUE_0: &str = "blue_0";
    const BLUE_1: &str = "blue_1";

    /// Two agents; the number of analysable hosts cycles 2, 3, 4 with the tick.
    struct ScriptedSim {
        tick: u32,
        done_script: Vec<bool>,
        bad_obs_at: Option<u32>,
        forwarded: Vec<HashMap<AgentId, ConcreteAction>>,
        closed: bool,
    }

    impl ScriptedSim {
        fn new() -> Self {
            Self {
                tick: 0,
                done_script: Vec::new(),
                bad_obs_at: None,
                forwarded: Vec::new(),
                closed: false,
            }
        }

        fn hosts(&self) -> usize {
            2 + (self.tick as usize % 3)
        }

        fn obs(&self, agent: &str) -> Vec<f64> {
            let len = if self.bad_obs_at == Some(self.tick) { 5 } else { 4 };
            let base = if agent == BLUE_0 { 0.0 } else { 1.0 };
            (0..len).map(|i| base + (self.tick + i) as f64 % 3.0).collect()
        }
    }

    impl Simulation for ScriptedSim {
        type Observation = Vec<f64>;
        type Info = u32;

        fn possible_agents(&self) -> Vec<AgentId> {
            vec![BLUE_0.to_string(), BLUE_1.to_string()]
        }

        fn reset(&mut self, _seed: Option<u64>) -> HashMap<AgentId, Vec<f64>> {
            self.tick = 0;
            // Only blue_0 is reported; blue_1 is fetched through `observation`
            [(BLUE_0.to_string(), self.obs(BLUE_0))].into_iter().collect()
        }

        fn parallel_step(
            &mut self,
            actions: &HashMap<AgentId, ConcreteAction>,
        ) -> RawParallelStep<Vec<f64>, u32> {
            self.forwarded.push(actions.clone());
            let done = self
                .done_script
                .get(self.tick as usize)
                .copied()
                .unwrap_or(false);
            self.tick += 1;

            let mut step = RawParallelStep::default();
            for agent in self.possible_agents() {
                step.observations.insert(agent.clone(), self.obs(&agent));
                step.infos.insert(agent.clone(), self.tick);
            }
            let blue_0_reward: RewardComponents = [
                ("a".to_string(), 1.0),
                ("b".to_string(), -0.5),
                ("c".to_string(), 2.25),
            ]
            .into_iter()
            .collect();
            let blue_1_reward: RewardComponents =
                [("availability".to_string(), -(self.tick as f64))]
                    .into_iter()
                    .collect();
            step.rewards.insert(BLUE_0.to_string(), blue_0_reward);
            step.rewards.insert(BLUE_1.to_string(), blue_1_reward);
            step.terminated.insert(BLUE_0.to_string(), done);
            step.terminated.insert(BLUE_1.to_string(), false);
            step
        }

        fn action_space(&self, _agent: &str) -> Value {
            let hosts: Map<String, Value> = (0..self.hosts())
                .map(|i| (format!("host_{}", i), json!(true)))
                .collect();
            json!({
                "action": {"Sleep": true, "Analyse": true},
                "session": {"0": true},
                "hostname": hosts,
                "priority": {"1": 1, "2": 2},
            })
        }

        fn observation(&self, agent: &str) -> Vec<f64> {
            self.obs(agent)
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    struct Identity {
        registry: ActionRegistry,
    }

    impl SignatureSource for Identity {
        fn action_signature(&self, action_type: &str) -> Option<ActionTypeDescriptor> {
            self.registry.action_signature(action_type)
        }
    }

    impl DomainTranslator for Identity {
        type Observation = Vec<f64>;

        fn observation_features(&self, _agent: &str, observation: &Vec<f64>) -> Vec<f64> {
            observation.clone()
        }
    }

    fn make_env(sim: ScriptedSim) -> EpisodeOrchestrator<ScriptedSim, Identity> {
        make_env_with(sim, WrapperConfig::default())
    }

    fn make_env_with(
        sim: ScriptedSim,
        config: WrapperConfig,
    ) -> EpisodeOrchestrator<ScriptedSim, Identity> {
        let translator = Identity {
            registry: ActionRegistry::new()
                .register(ActionTypeDescriptor::new("Sleep", Vec::<String>::new()))
                .register(ActionTypeDescriptor::new(
                    "Analyse",
                    ["session", "hostname", "priority"],
                )),
        };
        EpisodeOrchestrator::new(sim, translator, config).unwrap()
    }

    fn actions(list: &[(&str, Option<usize>)]) -> HashMap<AgentId, Option<usize>> {
        list.iter().map(|(a, i)| (a.to_string(), *i)).collect()
    }

    #[test]
    fn test_accessors_before_reset() {
        let mut env = make_env(ScriptedSim::new());

        assert_eq!(env.observation_shape(BLUE_0).unwrap(), 4);
        assert!(matches!(env.action_space_size(BLUE_0), Err(FlatError::NotReset)));
        assert!(matches!(env.rewards(), Err(FlatError::NotReset)));
        assert!(matches!(
            env.step(&actions(&[(BLUE_0, Some(0))])),
            Err(FlatError::NotReset)
        ));
        assert!(env.inner().forwarded.is_empty());
        assert!(!env.is_done());
    }

    #[test]
    fn test_reset() {
        let mut env = make_env(ScriptedSim::new());
        let obs = env.reset(Some(3)).unwrap();

        assert_eq!(obs.len(), 2);
        assert_eq!(obs[BLUE_0].len(), 4);
        assert_eq!(obs[BLUE_1].len(), 4);
        // Sleep + Analyse over 2 hosts
        assert_eq!(env.action_space_size(BLUE_0).unwrap(), 3);
        assert_eq!(env.action_space(BLUE_1).unwrap(), Discrete::new(3));
        assert!(env.rewards().unwrap().values().all(|&r| r == 0.0));
        assert!(env.terminations().unwrap().values().all(|&d| !d));
        assert_eq!(env.active_agents().len(), 2);
        assert_eq!(env.observation_space(BLUE_0).unwrap().shape(), &[4]);
    }

    #[test]
    fn test_step_resolves_against_current_table() {
        let mut env = make_env(ScriptedSim::new());
        env.reset(None).unwrap();

        let last = env.action_space_size(BLUE_0).unwrap() - 1;
        let expected = env.action_lookup(BLUE_0).unwrap().get(last).cloned().unwrap();
        env.step(&actions(&[(BLUE_0, Some(last)), (BLUE_1, Some(0))]))
            .unwrap();

        let forwarded = &env.inner().forwarded[0];
        assert_eq!(forwarded[BLUE_0], expected);
        assert_eq!(forwarded[BLUE_0].key("hostname"), Some("host_1"));
        assert_eq!(forwarded[BLUE_1].action_type, "Sleep");

        // Next decision point offers three hosts
        assert_eq!(env.action_space_size(BLUE_0).unwrap(), 4);
        env.step(&actions(&[(BLUE_0, Some(3))])).unwrap();
        assert_eq!(env.inner().forwarded[1][BLUE_0].key("hostname"), Some("host_2"));
    }

    #[test]
    fn test_step_refreshes_without_accessor() {
        let mut env = make_env(ScriptedSim::new());
        env.reset(None).unwrap();
        env.step(&actions(&[])).unwrap();

        // Index 3 only exists in the refreshed table (3 hosts)
        env.step(&actions(&[(BLUE_0, Some(3))])).unwrap();
        assert_eq!(env.inner().forwarded[1][BLUE_0].key("hostname"), Some("host_2"));
    }

    #[test]
    fn test_invalid_index_forwards_nothing() {
        let mut env = make_env(ScriptedSim::new());
        env.reset(None).unwrap();
        let size = env.action_space_size(BLUE_1).unwrap();

        let result = env.step(&actions(&[(BLUE_0, Some(0)), (BLUE_1, Some(size))]));
        match result {
            Err(FlatError::InvalidActionIndex { agent, index, size: n }) => {
                assert_eq!(agent, BLUE_1);
                assert_eq!(index, size);
                assert_eq!(n, size);
            }
            other => panic!("expected InvalidActionIndex, got {:?}", other.map(|_| ())),
        }
        assert!(env.inner().forwarded.is_empty());
        assert_eq!(env.episode_stats().unwrap().length(), 0);
    }

    #[test]
    fn test_unknown_agent_forwards_nothing() {
        let mut env = make_env(ScriptedSim::new());
        env.reset(None).unwrap();

        let result = env.step(&actions(&[(BLUE_0, Some(0)), ("red_0", None)]));
        assert!(matches!(result, Err(FlatError::UnknownAgent(a)) if a == "red_0"));
        assert!(env.inner().forwarded.is_empty());
    }

    #[test]
    fn test_absent_actions_are_not_forwarded() {
        let mut env = make_env(ScriptedSim::new());
        env.reset(None).unwrap();

        env.step(&actions(&[(BLUE_0, None), (BLUE_1, Some(1))])).unwrap();
        let forwarded = &env.inner().forwarded[0];
        assert_eq!(forwarded.len(), 1);
        assert!(forwarded.contains_key(BLUE_1));
    }

    #[test]
    fn test_reward_aggregation() {
        let mut env = make_env(ScriptedSim::new());
        env.reset(None).unwrap();

        let step = env.step(&actions(&[])).unwrap();
        assert_eq!(step.rewards[BLUE_0], 2.75);
        assert_eq!(step.rewards[BLUE_1], -1.0);
        assert_eq!(env.rewards().unwrap()[BLUE_0], 2.75);

        // Replaced, not accumulated
        let step = env.step(&actions(&[])).unwrap();
        assert_eq!(step.rewards[BLUE_1], -2.0);
        assert_eq!(env.rewards().unwrap()[BLUE_1], -2.0);
        assert_eq!(env.episode_stats().unwrap().episode_return(BLUE_1), Some(-3.0));
        assert_eq!(step.infos[BLUE_0], 2);
    }

    #[test]
    fn test_termination_is_overwritten() {
        let mut sim = ScriptedSim::new();
        sim.done_script = vec![false, true, false];
        let mut env = make_env(sim);
        env.reset(None).unwrap();

        env.step(&actions(&[])).unwrap();
        assert_eq!(env.active_agents().len(), 2);

        let step = env.step(&actions(&[])).unwrap();
        assert!(step.terminated[BLUE_0]);
        assert_eq!(env.active_agents(), vec![BLUE_1.to_string()]);

        let step = env.step(&actions(&[])).unwrap();
        assert!(!step.terminated[BLUE_0]);
        assert!(!env.terminations().unwrap()[BLUE_0]);
        assert_eq!(env.active_agents().len(), 2);
    }

    #[test]
    fn test_reset_clears_termination() {
        let mut sim = ScriptedSim::new();
        sim.done_script = vec![true];
        let mut env = make_env(sim);
        env.reset(None).unwrap();

        env.step(&actions(&[])).unwrap();
        assert!(env.terminations().unwrap()[BLUE_0]);
        assert_eq!(env.episode_stats().unwrap().length(), 1);

        env.reset(None).unwrap();
        assert!(!env.terminations().unwrap()[BLUE_0]);
        assert_eq!(env.active_agents().len(), 2);
        assert_eq!(env.episode_stats().unwrap().length(), 0);
        assert_eq!(env.rewards().unwrap()[BLUE_0], 0.0);
    }

    #[test]
    fn test_shape_stable_over_many_steps() {
        let mut env = make_env(ScriptedSim::new());
        env.reset(None).unwrap();

        let batch = actions(&[(BLUE_0, Some(0)), (BLUE_1, Some(1))]);
        for _ in 0..60 {
            let step = env.step(&batch).unwrap();
            for agent in [BLUE_0, BLUE_1] {
                let expected = env.observation_shape(agent).unwrap();
                assert_eq!(step.observations[agent].len(), expected);
            }
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let mut sim = ScriptedSim::new();
        sim.bad_obs_at = Some(2);
        let mut env = make_env(sim);
        env.reset(None).unwrap();

        env.step(&actions(&[])).unwrap();
        let err = env.step(&actions(&[])).unwrap_err();
        assert!(matches!(
            err,
            FlatError::ObservationShape {
                expected: 4,
                actual: 5,
                ..
            }
        ));

        // Bookkeeping still reflects the step the simulation took
        assert_eq!(env.inner().tick, 2);
        assert_eq!(env.rewards().unwrap()[BLUE_1], -2.0);
        assert_eq!(env.episode_stats().unwrap().length(), 2);
        // Tables follow the simulation: 4 hosts at tick 2
        assert_eq!(env.action_space_size(BLUE_0).unwrap(), 5);
    }

    #[test]
    fn test_all_agents_views() {
        let mut env = make_env(ScriptedSim::new());
        let obs = env.reset(None).unwrap();
        assert_eq!(env.observation(BLUE_1).unwrap(), obs[BLUE_1]);

        let step = env.step(&actions(&[(BLUE_0, Some(0))])).unwrap();
        assert!(!step.all_done());

        let spaces = env.action_spaces().unwrap();
        assert_eq!(spaces.len(), 2);
        for agent in [BLUE_0, BLUE_1] {
            assert_eq!(spaces[agent].n, env.action_space_size(agent).unwrap());
        }
        // 3 hosts at tick 1
        assert_eq!(spaces[BLUE_0], Discrete::new(4));
        assert_eq!(env.observation(BLUE_0).unwrap(), step.observations[BLUE_0]);

        let obs_spaces = env.observation_spaces().unwrap();
        assert_eq!(obs_spaces.len(), 2);
        assert!(obs_spaces.values().all(|s| s.shape() == &[4]));

        env.close();
        assert!(env.inner().closed);
    }

    #[test]
    fn test_custom_priority_parameter() {
        let config = WrapperConfig::default().priority_parameter("hostname");
        let mut env = make_env_with(ScriptedSim::new(), config);
        env.reset(None).unwrap();

        // Sleep + Analyse over the two `priority` values; hostname is never bound
        assert_eq!(env.action_space_size(BLUE_0).unwrap(), 3);
        let table = env.action_lookup(BLUE_0).unwrap();
        assert!(table.iter().all(|a| a.key("hostname").is_none()));
        assert_eq!(table.get(1).unwrap().key("priority"), Some("1"));
        assert_eq!(table.get(2).unwrap().key("priority"), Some("2"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let translator = Identity {
            registry: ActionRegistry::new(),
        };
        let config = WrapperConfig::default().obs_bounds(3.0, -1.0);
        let result = EpisodeOrchestrator::new(ScriptedSim::new(), translator, config);
        assert!(matches!(result, Err(FlatError::Config(_))));
    }

    #[test]
    fn test_malformed_space_on_reset() {
        // Analyse is offered but not registered
        let translator = Identity {
            registry: ActionRegistry::new()
                .register(ActionTypeDescriptor::new("Sleep", Vec::<String>::new())),
        };
        let mut env =
            EpisodeOrchestrator::new(ScriptedSim::new(), translator, WrapperConfig::default())
                .unwrap();

        assert!(matches!(env.reset(None), Err(FlatError::MalformedActionSpace(_))));
        assert!(matches!(env.action_space_size(BLUE_0), Err(FlatError::NotReset)));
    }
}
