//! Core error types for reviewload

use thiserror::Error;

/// Errors raised by the shadow state store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShadowError {
    /// The collection a random pick was requested from holds nothing.
    /// Callers skip the iteration instead of failing it.
    #[error("Cannot pick from empty collection: {0}")]
    EmptyCollection(&'static str),
}

/// Errors raised while building a weighted sampler
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error("Sampler needs at least one entry")]
    Empty,

    #[error("Weight for entry {index} must be finite and non-negative, got {weight}")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("Weights must sum to 1.0, got {sum}")]
    NotNormalized { sum: f64 },

    #[error("Duplicate entry at position {0}")]
    Duplicate(usize),
}

/// Errors raised while setting up metric aggregation
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to create latency histogram: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),
}
