//! Core domain types for reviewload
//!
//! This crate holds everything the workload driver reasons about without
//! touching the network: the entity model of the service under test, the
//! per-context shadow state, weighted operation sampling, per-request outcome
//! records, metric aggregation and the pass/fail threshold evaluation.

pub mod error;
pub mod metrics;
pub mod model;
pub mod operation;
pub mod outcome;
pub mod sampler;
pub mod shadow;
pub mod thresholds;

// Re-export commonly used types at the crate root
pub use error::{MetricsError, SamplerError, ShadowError};
pub use metrics::{LatencySummary, MetricsCollector, MetricsSnapshot, OperationSnapshot};
pub use model::{Membership, PrStatus, PullRequest, Team, User};
pub use operation::{OperationKind, OperationKindError};
pub use outcome::{Execution, OutcomeRecord, SkipReason, Violation, ViolationKind};
pub use sampler::{OperationSelector, WeightedSampler};
pub use shadow::ShadowState;
pub use thresholds::{ThresholdCheck, Thresholds, Verdict};
