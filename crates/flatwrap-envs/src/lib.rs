//! Built-in simulations for flatwrap.
//!
//! - `NetworkDefense` - blue agents defending subnets against a stochastic
//!   attacker, with a parameterized action space that changes every step

mod network_defense;
mod translator;

pub use network_defense::{
    ActionOutcome, DefenseObservation, HostStatus, HostView, NetworkDefense, NetworkDefenseConfig,
};
pub use translator::NetworkTranslator;

/// Names of the built-in simulations
pub const SIMULATIONS: &[&str] = &["network_defense"];
