//! Network defense simulation.

use crate::translator::NetworkTranslator;
use flatwrap::action::ConcreteAction;
use flatwrap::env::{RawParallelStep, RewardComponents, Simulation};
use flatwrap::{AgentId, FlatError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Settings for `NetworkDefense`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkDefenseConfig {
    /// Number of defending agents, one subnet each
    pub num_agents: usize,
    /// Hosts in every subnet
    pub hosts_per_agent: usize,
    /// Episode length; every agent terminates on this step
    pub max_steps: u32,
    /// Chance per step that an attacker gains user access on a clean host
    pub attack_rate: f64,
    /// Chance per step that user access is escalated to privileged
    pub escalation_rate: f64,
    /// Steps a restored host stays offline
    pub restore_duration: u32,
}

impl Default for NetworkDefenseConfig {
    fn default() -> Self {
        Self {
            num_agents: 3,
            hosts_per_agent: 4,
            max_steps: 30,
            attack_rate: 0.15,
            escalation_rate: 0.25,
            restore_duration: 2,
        }
    }
}

impl NetworkDefenseConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn num_agents(mut self, n: usize) -> Self {
        self.num_agents = n;
        self
    }

    pub fn hosts_per_agent(mut self, n: usize) -> Self {
        self.hosts_per_agent = n;
        self
    }

    pub fn max_steps(mut self, n: u32) -> Self {
        self.max_steps = n;
        self
    }

    pub fn attack_rates(mut self, attack: f64, escalation: f64) -> Self {
        self.attack_rate = attack;
        self.escalation_rate = escalation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_agents == 0 {
            return Err(FlatError::Config("num_agents must be positive".into()));
        }
        if self.hosts_per_agent == 0 {
            return Err(FlatError::Config("hosts_per_agent must be positive".into()));
        }
        for (name, p) in [
            ("attack_rate", self.attack_rate),
            ("escalation_rate", self.escalation_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(FlatError::Config(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }
}

/// Attacker foothold on a host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostStatus {
    Clean,
    User,
    Privileged,
}

impl HostStatus {
    pub fn level(self) -> f64 {
        match self {
            HostStatus::Clean => 0.0,
            HostStatus::User => 1.0,
            HostStatus::Privileged => 2.0,
        }
    }

    fn symbol(self) -> char {
        match self {
            HostStatus::Clean => '.',
            HostStatus::User => 'u',
            HostStatus::Privileged => 'P',
        }
    }
}

#[derive(Clone, Debug)]
struct Host {
    name: String,
    status: HostStatus,
    /// Last status the defender learned
    known: HostStatus,
    /// Attacker acted on this host during the last step
    activity: bool,
    offline_for: u32,
}

impl Host {
    fn new(name: String) -> Self {
        Self {
            name,
            status: HostStatus::Clean,
            known: HostStatus::Clean,
            activity: false,
            offline_for: 0,
        }
    }

    fn online(&self) -> bool {
        self.offline_for == 0
    }
}

#[derive(Clone, Debug)]
struct Subnet {
    hosts: Vec<Host>,
    monitoring: bool,
    terminated: bool,
}

impl Subnet {
    fn new(agent: usize, hosts: usize) -> Self {
        Self {
            hosts: (0..hosts)
                .map(|j| Host::new(format!("subnet_{agent}_host_{j}")))
                .collect(),
            monitoring: false,
            terminated: false,
        }
    }

    fn host_mut(&mut self, name: &str) -> Option<&mut Host> {
        self.hosts.iter_mut().find(|h| h.name == name && h.online())
    }

    fn lost(&self) -> bool {
        self.hosts.iter().all(|h| h.status == HostStatus::Privileged)
    }
}

/// What one defender sees of one host
#[derive(Clone, Debug, PartialEq)]
pub struct HostView {
    pub hostname: String,
    pub activity: bool,
    pub known: HostStatus,
    pub offline: bool,
}

/// Native observation of one defender: its own subnet plus episode progress
#[derive(Clone, Debug, PartialEq)]
pub struct DefenseObservation {
    pub hosts: Vec<HostView>,
    /// Elapsed fraction of the episode, in [0, 1]
    pub progress: f64,
}

/// Per-agent step info: the action that was executed and whether it worked
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    pub action: String,
    pub success: bool,
}

/// Multi-agent network defense game.
///
/// Every blue agent defends its own subnet against a stochastic attacker.
/// Hosts taken offline by `Restore` drop out of the `hostname` parameter
/// until they come back, so the set of legal actions changes from step to
/// step.
///
/// Action types: `Sleep`, `Monitor`, `Analyse`, `Remove`, `Restore`.
/// Reward components: `confidentiality` (footholds), `availability`
/// (offline hosts) and `restore` (cost of restoring).
pub struct NetworkDefense {
    config: NetworkDefenseConfig,
    agents: Vec<AgentId>,
    subnets: Vec<Subnet>,
    tick: u32,
    rng: StdRng,
}

impl NetworkDefense {
    /// Build a simulation; fails with `FlatError::Config` on invalid settings
    pub fn new(config: NetworkDefenseConfig) -> Result<Self> {
        config.validate()?;
        let agents = (0..config.num_agents)
            .map(|i| format!("blue_agent_{i}"))
            .collect();
        let subnets = Self::fresh_subnets(&config);
        Ok(Self {
            config,
            agents,
            subnets,
            tick: 0,
            rng: StdRng::from_entropy(),
        })
    }

    /// Translator matching this simulation's observations and action types
    pub fn translator(&self) -> NetworkTranslator {
        NetworkTranslator::new()
    }

    pub fn config(&self) -> &NetworkDefenseConfig {
        &self.config
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// True attacker foothold on `hostname`
    pub fn host_status(&self, hostname: &str) -> Option<HostStatus> {
        self.subnets
            .iter()
            .flat_map(|s| s.hosts.iter())
            .find(|h| h.name == hostname)
            .map(|h| h.status)
    }

    fn fresh_subnets(config: &NetworkDefenseConfig) -> Vec<Subnet> {
        (0..config.num_agents)
            .map(|i| Subnet::new(i, config.hosts_per_agent))
            .collect()
    }

    fn agent_index(&self, agent: &str) -> Option<usize> {
        self.agents.iter().position(|a| a == agent)
    }

    fn observe(&self, index: usize) -> DefenseObservation {
        let hosts = self.subnets[index]
            .hosts
            .iter()
            .map(|h| HostView {
                hostname: h.name.clone(),
                activity: h.activity,
                known: h.known,
                offline: !h.online(),
            })
            .collect();
        DefenseObservation {
            hosts,
            progress: (self.tick as f64 / self.config.max_steps.max(1) as f64).min(1.0),
        }
    }

    /// Apply one blue action; returns whether it succeeded and whether a host
    /// was restored
    fn apply(&mut self, index: usize, action: &ConcreteAction) -> (bool, bool) {
        let restore_duration = self.config.restore_duration;
        let subnet = &mut self.subnets[index];

        match action.action_type.as_str() {
            "Sleep" => (true, false),
            "Monitor" => {
                subnet.monitoring = true;
                (true, false)
            }
            kind @ ("Analyse" | "Remove" | "Restore") => {
                let Some(hostname) = action.key("hostname") else {
                    return (false, false);
                };
                let Some(host) = subnet.host_mut(hostname) else {
                    return (false, false);
                };
                match kind {
                    "Analyse" => {
                        host.known = host.status;
                        (true, false)
                    }
                    "Remove" => {
                        if host.status == HostStatus::Privileged {
                            host.known = HostStatus::Privileged;
                            return (false, false);
                        }
                        host.status = HostStatus::Clean;
                        host.known = HostStatus::Clean;
                        (true, false)
                    }
                    _ => {
                        host.status = HostStatus::Clean;
                        host.known = HostStatus::Clean;
                        host.offline_for = restore_duration;
                        (true, true)
                    }
                }
            }
            _ => (false, false),
        }
    }

    fn attack(&mut self) {
        let (attack, escalation) = (self.config.attack_rate, self.config.escalation_rate);
        for subnet in self.subnets.iter_mut().filter(|s| !s.terminated) {
            for host in subnet.hosts.iter_mut().filter(|h| h.online()) {
                let roll: f64 = self.rng.gen();
                let next = match host.status {
                    HostStatus::Clean if roll < attack => HostStatus::User,
                    HostStatus::User if roll < escalation => HostStatus::Privileged,
                    status => status,
                };
                if next != host.status {
                    host.status = next;
                    host.activity = true;
                    if subnet.monitoring {
                        host.known = next;
                    }
                }
            }
        }
    }

    fn rewards(subnet: &Subnet, restored: bool) -> RewardComponents {
        let mut confidentiality = 0.0;
        let mut offline = 0;
        for host in &subnet.hosts {
            confidentiality -= match host.status {
                HostStatus::Clean => 0.0,
                HostStatus::User => 0.1,
                HostStatus::Privileged => 1.0,
            };
            if !host.online() {
                offline += 1;
            }
        }

        let mut components = RewardComponents::new();
        components.insert("confidentiality".to_string(), confidentiality);
        components.insert("availability".to_string(), -0.5 * offline as f64);
        components.insert(
            "restore".to_string(),
            if restored { -1.0 } else { 0.0 },
        );
        components
    }
}

impl Simulation for NetworkDefense {
    type Observation = DefenseObservation;
    type Info = ActionOutcome;

    fn possible_agents(&self) -> Vec<AgentId> {
        self.agents.clone()
    }

    fn reset(&mut self, seed: Option<u64>) -> HashMap<AgentId, DefenseObservation> {
        if let Some(s) = seed {
            self.rng = StdRng::seed_from_u64(s);
        }
        self.subnets = Self::fresh_subnets(&self.config);
        self.tick = 0;

        (0..self.agents.len())
            .map(|i| (self.agents[i].clone(), self.observe(i)))
            .collect()
    }

    fn parallel_step(
        &mut self,
        actions: &HashMap<AgentId, ConcreteAction>,
    ) -> RawParallelStep<DefenseObservation, ActionOutcome> {
        self.tick += 1;

        for subnet in &mut self.subnets {
            subnet.monitoring = false;
            for host in &mut subnet.hosts {
                host.activity = false;
                host.offline_for = host.offline_for.saturating_sub(1);
            }
        }

        let mut outcomes = Vec::with_capacity(self.agents.len());
        for index in 0..self.agents.len() {
            let agent = self.agents[index].clone();
            if self.subnets[index].terminated {
                outcomes.push((
                    ActionOutcome {
                        action: "None".to_string(),
                        success: false,
                    },
                    false,
                ));
                continue;
            }

            let sleep = ConcreteAction::new("Sleep", Default::default());
            let action = actions.get(&agent).unwrap_or(&sleep);
            let (success, restored) = self.apply(index, action);
            tracing::trace!(agent = %agent, action = %action, success, "Blue action");
            outcomes.push((
                ActionOutcome {
                    action: action.to_string(),
                    success,
                },
                restored,
            ));
        }

        self.attack();

        let mut result = RawParallelStep::default();
        for (index, (outcome, restored)) in outcomes.into_iter().enumerate() {
            let agent = self.agents[index].clone();
            let was_terminated = self.subnets[index].terminated;

            let rewards = if was_terminated {
                RewardComponents::new()
            } else {
                Self::rewards(&self.subnets[index], restored)
            };

            let subnet = &mut self.subnets[index];
            subnet.terminated =
                was_terminated || subnet.lost() || self.tick >= self.config.max_steps;

            result.observations.insert(agent.clone(), self.observe(index));
            result.rewards.insert(agent.clone(), rewards);
            result
                .terminated
                .insert(agent.clone(), self.subnets[index].terminated);
            result.infos.insert(agent, outcome);
        }
        result
    }

    fn action_space(&self, agent: &str) -> Value {
        let Some(index) = self.agent_index(agent) else {
            return json!({ "action": {} });
        };
        let subnet = &self.subnets[index];
        if subnet.terminated {
            return json!({ "action": { "Sleep": true } });
        }

        let hostnames: Map<String, Value> = subnet
            .hosts
            .iter()
            .filter(|h| h.online())
            .map(|h| (h.name.clone(), Value::Bool(true)))
            .collect();

        let mut offered = Map::new();
        offered.insert("Sleep".to_string(), Value::Bool(true));
        offered.insert("Monitor".to_string(), Value::Bool(true));
        if !hostnames.is_empty() {
            for kind in ["Analyse", "Remove", "Restore"] {
                offered.insert(kind.to_string(), Value::Bool(true));
            }
        }

        json!({
            "action": offered,
            "session": { "0": 0 },
            "agent": { agent: true },
            "hostname": hostnames,
            "priority": { "low": 0, "high": 1 },
        })
    }

    fn observation(&self, agent: &str) -> DefenseObservation {
        match self.agent_index(agent) {
            Some(index) => self.observe(index),
            None => DefenseObservation {
                hosts: Vec::new(),
                progress: 0.0,
            },
        }
    }

    fn render(&self) -> Option<String> {
        let mut out = format!("step {}/{}\n", self.tick, self.config.max_steps);
        for (agent, subnet) in self.agents.iter().zip(&self.subnets) {
            let hosts: String = subnet
                .hosts
                .iter()
                .map(|h| if h.online() { h.status.symbol() } else { 'o' })
                .collect();
            let flag = if subnet.terminated { " (done)" } else { "" };
            let _ = writeln!(out, "{agent}: [{hosts}]{flag}");
        }
        Some(out)
    }
}
