//! Service-under-test and HTTP client configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where requests go and how the client behaves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL every endpoint path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether to verify TLS certificates
    #[serde(default = "crate::domains::utils::default_true")]
    pub verify_ssl: bool,

    /// Maximum idle pooled connections per host
    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            verify_ssl: true,
            max_idle_per_host: default_max_idle_per_host(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.base_url, "base_url", self.domain_name())?;
        validate_positive(self.timeout.as_millis(), "timeout", self.domain_name())?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("reviewload/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_idle_per_host() -> usize {
    64
}
