//! Configuration types for the simulation.

use crate::error::Result;
use crate::types::SimulationParameters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid and behavior parameters
    #[serde(default)]
    pub parameters: SimulationParameters,
    /// Random seed for reproducibility; `None` seeds from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn seeded(parameters: SimulationParameters, seed: u64) -> Self {
        Self {
            parameters,
            seed: Some(seed),
        }
    }

    /// Parse a JSON document and validate the parameters it carries
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.parameters.validate()?;
        Ok(config)
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Delay between the end of one tick and the start of the next (milliseconds)
    pub tick_delay_ms: u64,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms: 300,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }
}
