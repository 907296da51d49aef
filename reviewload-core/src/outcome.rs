//! Structured per-request outcome records

use crate::operation::OperationKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Maximum number of response body characters kept on a failed outcome
pub const BODY_EXCERPT_LIMIT: usize = 200;

/// Why a response did not meet its contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The request never produced a response
    Transport { message: String },
    /// Non-2xx status code
    Status { status: u16 },
    /// Body missing a required field or carrying the wrong type
    Schema { message: String },
    /// Body field present but holding an unexpected value
    FieldMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    /// Response arrived after the operation's latency budget
    Latency { elapsed_ms: u64, budget_ms: u64 },
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::Transport { .. } => ViolationKind::Transport,
            Violation::Status { .. } => ViolationKind::Status,
            Violation::Schema { .. } => ViolationKind::Schema,
            Violation::FieldMismatch { .. } => ViolationKind::FieldMismatch,
            Violation::Latency { .. } => ViolationKind::Latency,
        }
    }

    pub fn field_mismatch(field: &str, expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Violation::FieldMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Transport { message } => write!(f, "transport error: {}", message),
            Violation::Status { status } => write!(f, "unexpected status {}", status),
            Violation::Schema { message } => write!(f, "response schema: {}", message),
            Violation::FieldMismatch {
                field,
                expected,
                actual,
            } => write!(f, "{} expected {}, got {}", field, expected, actual),
            Violation::Latency {
                elapsed_ms,
                budget_ms,
            } => write!(f, "took {}ms, budget {}ms", elapsed_ms, budget_ms),
        }
    }
}

/// Violation categories used for aggregate breakdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Transport,
    Status,
    Schema,
    FieldMismatch,
    Latency,
}

impl ViolationKind {
    pub const COUNT: usize = 5;

    pub fn all() -> &'static [ViolationKind] {
        &[
            ViolationKind::Transport,
            ViolationKind::Status,
            ViolationKind::Schema,
            ViolationKind::FieldMismatch,
            ViolationKind::Latency,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Transport => "transport",
            ViolationKind::Status => "status",
            ViolationKind::Schema => "schema",
            ViolationKind::FieldMismatch => "field_mismatch",
            ViolationKind::Latency => "latency",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Outcome of one issued request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub operation: OperationKind,
    #[serde(with = "duration_ms")]
    pub latency: Duration,
    /// Response status, absent when the transport failed
    pub status: Option<u16>,
    pub violation: Option<Violation>,
    /// Leading part of the response body, kept only on failures
    pub body_excerpt: Option<String>,
}

impl OutcomeRecord {
    pub fn passed(operation: OperationKind, latency: Duration, status: u16) -> Self {
        Self {
            operation,
            latency,
            status: Some(status),
            violation: None,
            body_excerpt: None,
        }
    }

    pub fn failed(
        operation: OperationKind,
        latency: Duration,
        status: Option<u16>,
        violation: Violation,
        body: Option<&str>,
    ) -> Self {
        Self {
            operation,
            latency,
            status,
            violation: Some(violation),
            body_excerpt: body.map(excerpt),
        }
    }

    pub fn is_success(&self) -> bool {
        self.violation.is_none()
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}

/// Truncate a body to [`BODY_EXCERPT_LIMIT`] characters
pub fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LIMIT).collect()
}

/// Why an operation issued no request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoTeams,
    NoUsers,
    NoOpenPullRequests,
    ReviewerLookupUnavailable,
    NotEnoughReviewers,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NoTeams => "no known teams",
            SkipReason::NoUsers => "no known users",
            SkipReason::NoOpenPullRequests => "no open pull requests",
            SkipReason::ReviewerLookupUnavailable => "reviewer lookup unavailable",
            SkipReason::NotEnoughReviewers => "lookup team has fewer than two members",
        };
        f.write_str(text)
    }
}

/// Result of one executor invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// A request was issued and judged
    Completed(OutcomeRecord),
    /// Preconditions were not met; nothing was sent
    Skipped(OperationKind, SkipReason),
}

impl Execution {
    pub fn operation(&self) -> OperationKind {
        match self {
            Execution::Completed(record) => record.operation,
            Execution::Skipped(operation, _) => *operation,
        }
    }

    pub fn outcome(&self) -> Option<&OutcomeRecord> {
        match self {
            Execution::Completed(record) => Some(record),
            Execution::Skipped(..) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Execution::Skipped(..))
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(millis.max(0.0) / 1000.0))
    }
}
