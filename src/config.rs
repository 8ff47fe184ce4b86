//! Simulation configuration
//!
//! Loaded from JSON; every field has a default so a partial (or empty) object
//! is a valid configuration.

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::error::ConfigError;
use crate::predictor::ClusteringMethod;
use crate::simulation::{DEFAULT_CLAMP_EPSILON, DEFAULT_GRACE_TOLERANCE};

/// Tunables for a simulation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Margin kept below 100% when the estimate is clamped
    #[serde(default = "default_clamp_epsilon")]
    pub clamp_epsilon: f64,

    /// Pay-unit deviation between consecutive grace payments that breaks
    /// grace constancy
    #[serde(default = "default_grace_tolerance")]
    pub grace_tolerance: f64,

    /// Record a `PeriodRecord` for every simulated period
    #[serde(default)]
    pub record_trace: bool,

    /// Which trained classifier variant to use for cluster lookup
    #[serde(default)]
    pub clustering: ClusteringMethod,
}

fn default_clamp_epsilon() -> f64 { DEFAULT_CLAMP_EPSILON }
fn default_grace_tolerance() -> f64 { DEFAULT_GRACE_TOLERANCE }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clamp_epsilon: DEFAULT_CLAMP_EPSILON,
            grace_tolerance: DEFAULT_GRACE_TOLERANCE,
            record_trace: false,
            clustering: ClusteringMethod::KMeans,
        }
    }
}

impl SimulationConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("clamp_epsilon", self.clamp_epsilon),
            ("grace_tolerance", self.grace_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTolerance { field, value });
            }
        }
        Ok(())
    }
}
