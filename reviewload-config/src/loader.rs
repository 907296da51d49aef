//! Configuration loading and environment variable handling

use crate::domains::ReviewloadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "REVIEWLOAD".to_string(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<ReviewloadConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ReviewloadConfig = serde_yaml::from_str(&content)?;

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config)?;

        // Validate all domains
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<ReviewloadConfig> {
        let mut config = ReviewloadConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut ReviewloadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_workload_overrides(&mut config.workload)?;
        self.apply_threshold_overrides(&mut config.thresholds)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply target config overrides
    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(base_url) = self.get_env_var("BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            let seconds: u64 = self.parse_env("HTTP_TIMEOUT", &timeout)?;
            config.timeout = Duration::from_secs(seconds);
        }

        Ok(())
    }

    /// Apply workload config overrides
    fn apply_workload_overrides(
        &self,
        config: &mut crate::domains::workload::WorkloadConfig,
    ) -> ConfigResult<()> {
        if let Ok(pacing) = self.get_env_var("PACING_MS") {
            let millis: u64 = self.parse_env("PACING_MS", &pacing)?;
            config.pacing = Duration::from_millis(millis);
        }

        if let Ok(seed) = self.get_env_var("SEED") {
            config.seed = Some(self.parse_env("SEED", &seed)?);
        }

        Ok(())
    }

    /// Apply threshold config overrides
    fn apply_threshold_overrides(
        &self,
        config: &mut crate::domains::thresholds::ThresholdsConfig,
    ) -> ConfigResult<()> {
        if let Ok(rate) = self.get_env_var("MAX_FAILURE_RATE") {
            config.max_failure_rate = Some(self.parse_env("MAX_FAILURE_RATE", &rate)?);
        }

        if let Ok(p95) = self.get_env_var("P95_LATENCY_MS") {
            let millis: u64 = self.parse_env("P95_LATENCY_MS", &p95)?;
            config.p95_latency = Some(Duration::from_millis(millis));
        }

        if let Ok(min) = self.get_env_var("MIN_REQUESTS") {
            config.min_requests = Some(self.parse_env("MIN_REQUESTS", &min)?);
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    fn parse_env<T>(&self, name: &str, raw: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e)))
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
