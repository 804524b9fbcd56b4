//! Environment traits and the parallel orchestrator.
//!
//! Provides the `Simulation` and `DomainTranslator` traits a wrapped
//! simulation implements, plus `EpisodeOrchestrator`, which exposes it as a
//! fixed-shape discrete multi-agent environment.

mod orchestrator;
mod stats;
mod traits;

pub use orchestrator::EpisodeOrchestrator;
pub use stats::EpisodeStats;
pub use traits::{DomainTranslator, ParallelStep, RawParallelStep, RewardComponents, Simulation};
