//! Pass/fail threshold configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_unit_interval, Validatable};
use reviewload_core::Thresholds;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds checked against the aggregated metrics at run end.
///
/// Setting a field to `null` disables that check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// 95th percentile request duration ceiling
    #[serde(with = "humantime_serde")]
    pub p95_latency: Option<Duration>,

    /// Maximum failure rate
    pub max_failure_rate: Option<f64>,

    /// Minimum total request count
    pub min_requests: Option<u64>,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            p95_latency: Some(Duration::from_millis(300)),
            max_failure_rate: Some(0.01),
            min_requests: Some(1000),
        }
    }
}

impl ThresholdsConfig {
    pub fn to_thresholds(&self) -> Thresholds {
        Thresholds {
            p95_latency: self.p95_latency,
            max_failure_rate: self.max_failure_rate,
            min_requests: self.min_requests,
        }
    }
}

impl Validatable for ThresholdsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(ceiling) = self.p95_latency {
            validate_positive(ceiling.as_micros(), "p95_latency", self.domain_name())?;
        }

        if let Some(rate) = self.max_failure_rate {
            validate_unit_interval(rate, "max_failure_rate", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "thresholds"
    }
}
