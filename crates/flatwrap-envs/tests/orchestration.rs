use flatwrap::prelude::*;
use flatwrap_envs::{NetworkDefense, NetworkDefenseConfig, NetworkTranslator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

type Env = EpisodeOrchestrator<NetworkDefense, NetworkTranslator>;

fn make_env(config: NetworkDefenseConfig) -> Env {
    let sim = NetworkDefense::new(config).unwrap();
    let translator = sim.translator();
    EpisodeOrchestrator::new(sim, translator, WrapperConfig::default()).unwrap()
}

fn random_actions(env: &mut Env, rng: &mut StdRng) -> HashMap<AgentId, Option<usize>> {
    let mut actions = HashMap::new();
    for agent in env.active_agents() {
        let space = env.action_space(&agent).unwrap();
        actions.insert(agent, space.sample(rng));
    }
    actions
}

fn index_of(env: &mut Env, agent: &str, action: &str) -> usize {
    env.action_lookup(agent)
        .unwrap()
        .iter()
        .position(|a| a.to_string() == action)
        .unwrap()
}

#[test]
fn test_observation_shape_stable_over_episode() {
    let mut env = make_env(NetworkDefenseConfig::default().max_steps(200));
    let mut rng = StdRng::seed_from_u64(11);

    let obs = env.reset(Some(11)).unwrap();
    assert_eq!(obs.len(), 3);
    for agent in env.possible_agents().to_vec() {
        assert_eq!(env.observation_shape(&agent).unwrap(), 9);
    }

    for _ in 0..60 {
        if env.is_done() {
            env.reset(None).unwrap();
        }
        let actions = random_actions(&mut env, &mut rng);
        let step = env.step(&actions).unwrap();
        for (agent, vector) in &step.observations {
            assert_eq!(vector.len(), 9);
            assert!(env.observation_space(agent).unwrap().contains_vector(vector));
        }
    }
}

#[test]
fn test_action_space_follows_online_hosts() {
    let mut env = make_env(NetworkDefenseConfig::default().max_steps(100));
    let mut rng = StdRng::seed_from_u64(5);
    env.reset(Some(5)).unwrap();

    let mut sizes_seen = std::collections::HashSet::new();
    for _ in 0..50 {
        for agent in env.possible_agents().to_vec() {
            let size = env.action_space_size(&agent).unwrap();
            let raw = env.inner().action_space(&agent);
            let online = raw["hostname"].as_object().map_or(0, |h| h.len());

            let expected = if env.terminations().unwrap()[&agent] {
                1
            } else if online == 0 {
                2
            } else {
                2 + 3 * online
            };
            assert_eq!(size, expected, "agent {agent}");
            sizes_seen.insert(size);
        }

        if env.is_done() {
            break;
        }
        let actions = random_actions(&mut env, &mut rng);
        env.step(&actions).unwrap();
    }

    // Restores take hosts offline, so the size is not constant
    assert!(sizes_seen.len() > 1);
}

#[test]
fn test_restore_shrinks_next_action_space() {
    let quiet = NetworkDefenseConfig::default()
        .num_agents(2)
        .hosts_per_agent(3)
        .attack_rates(0.0, 0.0);
    let mut env = make_env(quiet);
    env.reset(Some(0)).unwrap();
    assert_eq!(env.action_space_size("blue_agent_0").unwrap(), 11);

    let restore = index_of(
        &mut env,
        "blue_agent_0",
        "Restore(session=0, agent=blue_agent_0, hostname=subnet_0_host_2)",
    );
    let actions = [("blue_agent_0".to_string(), Some(restore))]
        .into_iter()
        .collect();
    let step = env.step(&actions).unwrap();

    // restore (-1.0) + availability (-0.5), nothing compromised
    assert_eq!(step.rewards["blue_agent_0"], -1.5);
    assert_eq!(step.rewards["blue_agent_1"], 0.0);
    assert_eq!(env.rewards().unwrap()["blue_agent_0"], -1.5);
    assert!(step.infos["blue_agent_0"].success);
    assert_eq!(step.infos["blue_agent_1"].action, "Sleep()");

    assert_eq!(env.action_space_size("blue_agent_0").unwrap(), 8);
    assert_eq!(env.action_space_size("blue_agent_1").unwrap(), 11);
    assert_eq!(step.observations["blue_agent_0"][5], -1.0);
}

#[test]
fn test_invalid_index_forwards_nothing() {
    let mut env = make_env(NetworkDefenseConfig::default());
    env.reset(Some(1)).unwrap();

    let size = env.action_space_size("blue_agent_2").unwrap();
    let actions = [
        ("blue_agent_0".to_string(), Some(0)),
        ("blue_agent_2".to_string(), Some(size)),
    ]
    .into_iter()
    .collect();

    match env.step(&actions) {
        Err(FlatError::InvalidActionIndex { agent, index, size: reported }) => {
            assert_eq!(agent, "blue_agent_2");
            assert_eq!(index, size);
            assert_eq!(reported, size);
        }
        other => panic!("expected InvalidActionIndex, got {:?}", other.map(|s| s.rewards)),
    }
    assert_eq!(env.inner().tick(), 0);
    assert_eq!(env.episode_stats().unwrap().length(), 0);
}

#[test]
fn test_termination_and_reset() {
    let mut env = make_env(NetworkDefenseConfig::default().max_steps(5));
    let mut rng = StdRng::seed_from_u64(2);
    env.reset(Some(2)).unwrap();

    let mut steps = 0;
    while !env.is_done() {
        let actions = random_actions(&mut env, &mut rng);
        env.step(&actions).unwrap();
        steps += 1;
    }
    assert!(steps <= 5);
    assert!(env.active_agents().is_empty());
    assert!(env.terminations().unwrap().values().all(|&d| d));
    assert_eq!(env.episode_stats().unwrap().length(), steps);

    env.reset(Some(3)).unwrap();
    assert_eq!(env.active_agents().len(), 3);
    assert!(env.terminations().unwrap().values().all(|&d| !d));
    assert!(env.rewards().unwrap().values().all(|&r| r == 0.0));
    assert_eq!(env.episode_stats().unwrap().length(), 0);
}

#[test]
fn test_seeded_episodes_are_deterministic() {
    let run = || {
        let mut env = make_env(NetworkDefenseConfig::default());
        let mut rng = StdRng::seed_from_u64(99);
        let mut trace = Vec::new();
        trace.push(env.reset(Some(99)).unwrap()["blue_agent_1"].to_vec());
        for _ in 0..20 {
            if env.is_done() {
                break;
            }
            let actions = random_actions(&mut env, &mut rng);
            let step = env.step(&actions).unwrap();
            trace.push(step.observations["blue_agent_1"].to_vec());
            trace.push(vec![step.rewards["blue_agent_1"] as f32]);
        }
        trace
    };
    assert_eq!(run(), run());
}

#[test]
fn test_evaluate_random_agents() {
    let mut env = make_env(NetworkDefenseConfig::default().max_steps(12));
    let mut agents: HashMap<AgentId, Box<dyn Agent>> = env
        .possible_agents()
        .iter()
        .enumerate()
        .map(|(i, a)| (a.clone(), Box::new(RandomAgent::new(i as u64)) as Box<dyn Agent>))
        .collect();

    let config = EvalConfig {
        episodes: 3,
        max_steps: 8,
        seed: Some(4),
    };
    let summary = evaluate(&mut env, &mut agents, &config).unwrap();

    assert_eq!(summary.episodes.len(), 3);
    for episode in &summary.episodes {
        assert!(episode.length <= 8);
        assert_eq!(episode.returns.len(), 3);
        // Every reward component is a penalty
        assert!(episode.returns.values().all(|&r| r <= 0.0));
    }
    assert!(summary.mean_return("blue_agent_0").is_some());
}

#[test]
fn test_evaluate_seed_wraps_at_max() {
    let mut env = make_env(NetworkDefenseConfig::default().max_steps(3));
    let mut agents: HashMap<AgentId, Box<dyn Agent>> = HashMap::new();
    agents.insert("blue_agent_0".to_string(), Box::new(RandomAgent::new(u64::MAX)));

    let config = EvalConfig {
        episodes: 2,
        max_steps: 2,
        seed: Some(u64::MAX),
    };
    let summary = evaluate(&mut env, &mut agents, &config).unwrap();

    assert_eq!(summary.episodes.len(), 2);
    assert!(summary.episodes.iter().all(|e| e.length <= 2));
}
