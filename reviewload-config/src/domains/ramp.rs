//! Concurrency ramp configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stages of target concurrency over wall-clock time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RampConfig {
    /// Concurrency at the start of the first stage
    #[serde(default)]
    pub start_concurrency: u32,

    /// Stages in execution order
    #[serde(default = "default_stages")]
    pub stages: Vec<StageConfig>,

    /// How often the engine re-evaluates the target concurrency
    #[serde(with = "humantime_serde", default = "default_tick")]
    pub tick: Duration,
}

/// One ramp stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage length
    #[serde(with = "humantime_serde")]
    pub duration: Duration,

    /// Concurrency reached at the end of the stage
    pub target: u32,
}

impl StageConfig {
    pub fn new(duration: Duration, target: u32) -> Self {
        Self { duration, target }
    }
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            start_concurrency: 0,
            stages: default_stages(),
            tick: default_tick(),
        }
    }
}

impl RampConfig {
    /// Sum of all stage durations
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|stage| stage.duration).sum()
    }
}

impl Validatable for RampConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.stages.is_empty() {
            return Err(self.validation_error("At least one ramp stage must be configured"));
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if stage.duration.is_zero() {
                return Err(self.validation_error(format!("stage {} has zero duration", index)));
            }
        }

        if self.start_concurrency == 0 && self.stages.iter().all(|stage| stage.target == 0) {
            return Err(self.validation_error("At least one stage must have a positive target"));
        }

        validate_positive(self.tick.as_millis(), "tick", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "ramp"
    }
}

// Default value functions
fn default_stages() -> Vec<StageConfig> {
    vec![
        StageConfig::new(Duration::from_secs(5), 50),
        StageConfig::new(Duration::from_secs(30), 10_000),
        StageConfig::new(Duration::from_secs(10), 0),
    ]
}

fn default_tick() -> Duration {
    Duration::from_millis(100)
}
