//! HTTP configuration

use reviewload_config::TargetConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL that request paths are joined onto
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,

    /// Idle pooled connections kept per host
    pub max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        TargetConfig::default().into()
    }
}

impl From<TargetConfig> for HttpConfig {
    fn from(config: TargetConfig) -> Self {
        Self {
            base_url: config.base_url,
            timeout: config.timeout,
            user_agent: config.user_agent,
            verify_ssl: config.verify_ssl,
            max_idle_per_host: config.max_idle_per_host,
        }
    }
}

impl From<&TargetConfig> for HttpConfig {
    fn from(config: &TargetConfig) -> Self {
        config.clone().into()
    }
}
