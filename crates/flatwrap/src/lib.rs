//! # flatwrap
//!
//! Fixed-shape, discrete-action views over multi-agent simulations with
//! parameterized actions.
//!
//! ## Overview
//!
//! flatwrap provides:
//! - Enumeration of dynamic, parameterized action spaces into per-agent lookup
//!   tables addressed by a plain `[0, N)` index
//! - Fixed-length observation vectors with a declared numeric range
//! - A parallel multi-agent orchestrator (`EpisodeOrchestrator`) with scalar
//!   rewards and per-agent termination bookkeeping
//! - A small evaluation driver for scripted or random agents
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flatwrap::prelude::*;
//! use flatwrap_envs::{NetworkDefense, NetworkDefenseConfig};
//!
//! let sim = NetworkDefense::new(NetworkDefenseConfig::default())?;
//! let translator = sim.translator();
//! let mut env = EpisodeOrchestrator::new(sim, translator, WrapperConfig::default())?;
//!
//! let obs = env.reset(Some(42))?;
//! let n = env.action_space_size("blue_agent_0")?;
//! let actions = [("blue_agent_0".to_string(), Some(n - 1))].into_iter().collect();
//! let step = env.step(&actions)?;
//! ```

pub mod action;
pub mod config;
pub mod env;
pub mod eval;
pub mod observation;
pub mod spaces;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{
        combine, ActionLookupTable, ActionRegistry, ActionSpaceEnumerator, ActionTypeDescriptor,
        Combination, ConcreteAction, LegalValue,
    };
    pub use crate::config::WrapperConfig;
    pub use crate::env::{
        DomainTranslator, EpisodeOrchestrator, EpisodeStats, ParallelStep, RawParallelStep,
        RewardComponents, Simulation,
    };
    pub use crate::eval::{evaluate, Agent, EvalConfig, EvalSummary, ModuloAgent, RandomAgent};
    pub use crate::observation::ObservationVectorizer;
    pub use crate::spaces::{Box as BoxSpace, Discrete, Space};
    pub use crate::{AgentId, FlatError, Result};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Identifier of one agent, stable for the lifetime of a simulation
pub type AgentId = String;

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum FlatError {
    #[error("Malformed action space: {0}")]
    MalformedActionSpace(String),

    #[error("Invalid action index {index} for agent {agent}: action space has {size} actions")]
    InvalidActionIndex {
        agent: AgentId,
        index: usize,
        size: usize,
    },

    #[error("Observation shape mismatch for agent {agent}: expected {expected}, got {actual}")]
    ObservationShape {
        agent: AgentId,
        expected: usize,
        actual: usize,
    },

    #[error("Environment has not been reset")]
    NotReset,

    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, FlatError>;
