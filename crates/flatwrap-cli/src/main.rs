//! flatwrap CLI
//!
//! Inspect and exercise the built-in simulations through the flat
//! discrete-action interface.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use flatwrap::prelude::*;
use flatwrap_envs::{NetworkDefense, NetworkDefenseConfig, NetworkTranslator, SIMULATIONS};

type Env = EpisodeOrchestrator<NetworkDefense, NetworkTranslator>;

#[derive(Parser)]
#[command(name = "flatwrap")]
#[command(
    version,
    about = "flatwrap - discrete views of parameterized multi-agent simulations",
    long_about = None
)]
struct Cli {
    /// Wrapper configuration (JSON)
    #[arg(long, global = true)]
    wrapper_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available simulations
    List,

    /// Print every agent's action-space size and observation shape
    Spaces {
        /// Simulation name
        #[arg(default_value = "network_defense")]
        env: String,

        /// Number of agents
        #[arg(long, default_value = "3")]
        agents: usize,

        /// Hosts per agent
        #[arg(long, default_value = "4")]
        hosts: usize,

        /// Reset seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Also print every concrete action
        #[arg(long)]
        verbose: bool,
    },

    /// Demo: random rollout with per-step output
    Demo {
        /// Simulation name
        #[arg(default_value = "network_defense")]
        env: String,

        /// Number of steps
        #[arg(long, default_value = "20")]
        steps: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Evaluate agents over several episodes
    Eval {
        /// Simulation name
        #[arg(default_value = "network_defense")]
        env: String,

        /// Number of episodes
        #[arg(long, default_value = "10")]
        episodes: usize,

        /// Step limit per episode
        #[arg(long, default_value = "100")]
        max_steps: u32,

        /// Seed of the first episode
        #[arg(long)]
        seed: Option<u64>,

        /// Simulation configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Agent policy (random, modulo)
        #[arg(long, default_value = "random")]
        policy: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let wrapper_config = match &cli.wrapper_config {
        Some(path) => WrapperConfig::from_json_file(path)?,
        None => WrapperConfig::default(),
    };

    match cli.command {
        Commands::List => {
            list_envs();
        }
        Commands::Spaces {
            env,
            agents,
            hosts,
            seed,
            verbose,
        } => {
            let sim_config = NetworkDefenseConfig::default()
                .num_agents(agents)
                .hosts_per_agent(hosts);
            spaces(&env, sim_config, wrapper_config, seed, verbose)?;
        }
        Commands::Demo { env, steps, seed } => {
            demo(&env, wrapper_config, steps, seed)?;
        }
        Commands::Eval {
            env,
            episodes,
            max_steps,
            seed,
            config,
            policy,
            json,
        } => {
            let sim_config = match config {
                Some(path) => NetworkDefenseConfig::from_json_file(path)?,
                None => NetworkDefenseConfig::default(),
            };
            let eval_config = EvalConfig {
                episodes,
                max_steps,
                seed,
            };
            eval(&env, sim_config, wrapper_config, &eval_config, &policy, json)?;
        }
    }

    Ok(())
}

fn make_env(name: &str, sim_config: NetworkDefenseConfig, config: WrapperConfig) -> Result<Env> {
    match name {
        "network_defense" => {
            let sim = NetworkDefense::new(sim_config)?;
            let translator = sim.translator();
            Ok(EpisodeOrchestrator::new(sim, translator, config)?)
        }
        _ => bail!(
            "Unknown simulation: {name} (available: {})",
            SIMULATIONS.join(", ")
        ),
    }
}

fn spaces(
    env_name: &str,
    sim_config: NetworkDefenseConfig,
    config: WrapperConfig,
    seed: u64,
    verbose: bool,
) -> Result<()> {
    let mut env = make_env(env_name, sim_config, config)?;
    env.reset(Some(seed))?;

    println!("Agent spaces for {env_name} (seed {seed}):");
    for agent in env.possible_agents().to_vec() {
        let size = env.action_space_size(&agent)?;
        let shape = env.observation_shape(&agent)?;
        println!("  {agent:<16} actions={size:<4} observation=[{shape}]");
        if verbose {
            for (index, action) in env.action_lookup(&agent)?.iter().enumerate() {
                println!("    {index:>4}  {action}");
            }
        }
    }
    Ok(())
}

fn demo(env_name: &str, config: WrapperConfig, steps: usize, seed: u64) -> Result<()> {
    tracing::info!(env = env_name, steps, seed, "Running demo");

    let mut env = make_env(env_name, NetworkDefenseConfig::default(), config)?;
    let mut rng = StdRng::seed_from_u64(seed);
    env.reset(Some(seed))?;

    for step in 0..steps {
        let mut actions = HashMap::new();
        let mut chosen = Vec::new();
        for agent in env.active_agents() {
            let space = env.action_space(&agent)?;
            let index = space.sample(&mut rng);
            if let Some(i) = index {
                let action = env.action_lookup(&agent)?.resolve(&agent, i)?;
                chosen.push(format!("{agent}={action}"));
            }
            actions.insert(agent, index);
        }

        let result = env.step(&actions)?;
        let total: f64 = result.rewards.values().sum();
        println!("Step {step}: reward={total:.2} {}", chosen.join(" "));

        if step % 10 == 0 {
            if let Some(render) = env.render() {
                println!("{render}");
            }
        }

        if env.is_done() {
            tracing::info!(step, "Episode ended, resetting");
            env.reset(None)?;
        }
    }
    Ok(())
}

fn eval(
    env_name: &str,
    sim_config: NetworkDefenseConfig,
    config: WrapperConfig,
    eval_config: &EvalConfig,
    policy: &str,
    json: bool,
) -> Result<()> {
    tracing::info!(
        env = env_name,
        episodes = eval_config.episodes,
        policy,
        "Starting evaluation"
    );

    let mut env = make_env(env_name, sim_config, config)?;
    let base_seed = eval_config.seed.unwrap_or(0);

    let mut agents: HashMap<AgentId, Box<dyn Agent>> = HashMap::new();
    for (i, agent) in env.possible_agents().iter().enumerate() {
        let agent_policy: Box<dyn Agent> = match policy {
            "random" => Box::new(RandomAgent::new(base_seed.wrapping_add(i as u64))),
            // Stand-in for a trained policy with a fixed output range
            "modulo" => Box::new(ModuloAgent::new(|obs: &Array1<f32>| {
                obs.iter().map(|&x| x as f64).sum::<f64>() * 7.0
            })),
            other => bail!("Unknown policy: {other}"),
        };
        agents.insert(agent.clone(), agent_policy);
    }

    let summary = evaluate(&mut env, &mut agents, eval_config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Evaluation summary ({} episodes)", summary.episodes.len());
    println!("  mean length:       {:.2}", summary.mean_length());
    println!("  mean total return: {:.3}", summary.mean_total_return());
    let mut names: Vec<&AgentId> = agents.keys().collect();
    names.sort();
    for agent in names {
        if let Some(mean) = summary.mean_return(agent) {
            println!("  {agent:<16} {mean:.3}");
        }
    }
    Ok(())
}

fn list_envs() {
    println!("Available simulations:");
    println!();
    println!("  network_defense  Blue agents defending subnets against an attacker");
    println!("                   Tests: dynamic parameterized actions, multi-component rewards");
    println!();
    println!("Wrapper settings can be loaded with --wrapper-config <FILE>.");
}
