//! Sensor configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

/// Tunables for an [`crate::Ahtx0`] instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Minimum time between native reads in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Value reported for both fields when no valid reading is available
    #[serde(default = "default_invalid_value")]
    pub invalid_value: f64,
}

fn default_throttle_ms() -> u64 {
    50
}

fn default_invalid_value() -> f64 {
    1000.0
}

impl SensorConfig {
    /// Returns the throttle window.
    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            invalid_value: default_invalid_value(),
        }
    }
}
