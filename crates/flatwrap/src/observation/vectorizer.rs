use crate::config::WrapperConfig;
use crate::spaces::Box as BoxSpace;
use crate::{AgentId, FlatError, Result};
use ndarray::Array1;
use std::collections::HashMap;

/// Records each agent's observation length and enforces it afterwards.
///
/// The declared range `[low, high]` is global and advertised only: values are
/// cast to `f32` but never clipped.
#[derive(Clone, Debug)]
pub struct ObservationVectorizer {
    lengths: HashMap<AgentId, usize>,
    low: f32,
    high: f32,
}

impl ObservationVectorizer {
    pub fn new(low: f32, high: f32) -> Self {
        Self {
            lengths: HashMap::new(),
            low,
            high,
        }
    }

    pub fn from_config(config: &WrapperConfig) -> Self {
        Self::new(config.obs_low, config.obs_high)
    }

    /// Fix the length of `agent`'s vectors from an initial feature list.
    ///
    /// Registering the same agent again keeps the first length.
    pub fn register(&mut self, agent: &str, features: &[f64]) -> usize {
        *self
            .lengths
            .entry(AgentId::from(agent))
            .or_insert(features.len())
    }

    /// Convert `features` to a vector, checking the registered length.
    pub fn vectorize(&self, agent: &str, features: &[f64]) -> Result<Array1<f32>> {
        let expected = self.shape(agent)?;
        if features.len() != expected {
            return Err(FlatError::ObservationShape {
                agent: AgentId::from(agent),
                expected,
                actual: features.len(),
            });
        }
        Ok(features.iter().map(|&x| x as f32).collect())
    }

    /// Registered vector length for `agent`
    pub fn shape(&self, agent: &str) -> Result<usize> {
        self.lengths
            .get(agent)
            .copied()
            .ok_or_else(|| FlatError::UnknownAgent(AgentId::from(agent)))
    }

    /// Observation space advertised for `agent`
    pub fn space(&self, agent: &str) -> Result<BoxSpace> {
        Ok(BoxSpace::vector(self.shape(agent)?, self.low, self.high))
    }

    /// Declared `(low, high)` range
    pub fn bounds(&self) -> (f32, f32) {
        (self.low, self.high)
    }
}
