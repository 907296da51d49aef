//! Domain-specific configuration modules

pub mod logging;
pub mod ramp;
pub mod seed;
pub mod target;
pub mod thresholds;
pub mod utils;
pub mod workload;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main reviewload configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReviewloadConfig {
    /// Service under test and HTTP client settings
    #[serde(default)]
    pub target: target::TargetConfig,

    /// Concurrency stages
    #[serde(default)]
    pub ramp: ramp::RampConfig,

    /// Pass/fail bounds
    #[serde(default)]
    pub thresholds: thresholds::ThresholdsConfig,

    /// Traffic mix, pacing and per-operation budgets
    #[serde(default)]
    pub workload: workload::WorkloadConfig,

    /// Teams and users created during setup
    #[serde(default)]
    pub seed: seed::SeedConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl ReviewloadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.ramp.validate()?;
        self.thresholds.validate()?;
        self.workload.validate()?;
        self.seed.validate()?;
        self.logging.validate()?;

        // The reviewer lookup must point at a seeded team to ever succeed
        if !self
            .seed
            .teams
            .iter()
            .any(|team| team.name == self.workload.reassign_lookup_team)
        {
            tracing::warn!(
                "reassign_lookup_team '{}' is not part of the seed roster; reassign_reviewer will mostly skip",
                self.workload.reassign_lookup_team
            );
        }

        Ok(())
    }

    /// Render the configuration as YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> ConfigResult<String> {
        ReviewloadConfig::default().to_yaml()
    }
}
