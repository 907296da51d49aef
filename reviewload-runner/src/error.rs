//! Error types for run orchestration

use crate::orchestrator::RunPhase;
use thiserror::Error;

/// Raised when a run step is invoked out of order
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    #[error("Cannot move from {from} to {to}")]
    IllegalTransition { from: RunPhase, to: RunPhase },

    #[error("Expected phase {expected}, run is in {actual}")]
    UnexpectedPhase { expected: RunPhase, actual: RunPhase },
}

/// Errors that abort a run. Per-request failures never surface here.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] reviewload_config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reviewload_http::HttpError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] reviewload_core::MetricsError),

    #[error("Invalid operation mix: {0}")]
    Sampler(#[from] reviewload_core::SamplerError),

    #[error(transparent)]
    Phase(#[from] PhaseError),
}
