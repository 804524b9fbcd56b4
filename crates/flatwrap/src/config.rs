//! Wrapper configuration.

use crate::action::{ACTION_KEY, PRIORITY_PARAMETER};
use crate::{FlatError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Lower bound advertised for every observation element
pub const OBS_LOW: f32 = -1.0;
/// Upper bound advertised for every observation element
pub const OBS_HIGH: f32 = 3.0;

/// Configuration shared by the enumerator, vectorizer and orchestrator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// Key of the action-type catalog in a raw action space
    pub action_key: String,
    /// Parameter excluded from enumeration (scheduling metadata)
    pub priority_parameter: String,
    /// Declared lower bound of observation vectors
    pub obs_low: f32,
    /// Declared upper bound of observation vectors
    pub obs_high: f32,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            action_key: ACTION_KEY.to_string(),
            priority_parameter: PRIORITY_PARAMETER.to_string(),
            obs_low: OBS_LOW,
            obs_high: OBS_HIGH,
        }
    }
}

impl WrapperConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the catalog key.
    pub fn action_key(mut self, key: impl Into<String>) -> Self {
        self.action_key = key.into();
        self
    }

    /// Set the excluded metadata parameter.
    pub fn priority_parameter(mut self, name: impl Into<String>) -> Self {
        self.priority_parameter = name.into();
        self
    }

    /// Set the declared observation range.
    pub fn obs_bounds(mut self, low: f32, high: f32) -> Self {
        self.obs_low = low;
        self.obs_high = high;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.action_key.is_empty() {
            return Err(FlatError::Config("action_key must not be empty".into()));
        }
        if self.priority_parameter.is_empty() {
            return Err(FlatError::Config(
                "priority_parameter must not be empty".into(),
            ));
        }
        if self.obs_low.partial_cmp(&self.obs_high) != Some(Ordering::Less) {
            return Err(FlatError::Config(format!(
                "obs_low ({}) must be below obs_high ({})",
                self.obs_low, self.obs_high
            )));
        }
        Ok(())
    }
}
