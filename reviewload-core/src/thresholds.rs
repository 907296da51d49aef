//! Pass/fail thresholds evaluated once over the final metrics

use crate::metrics::MetricsSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configured bounds. A missing bound is not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// 95th percentile request duration must stay below this
    pub p95_latency: Option<Duration>,
    /// Failure rate must stay below this
    pub max_failure_rate: Option<f64>,
    /// Total request count must exceed this
    pub min_requests: Option<u64>,
}

impl Thresholds {
    /// Compare a snapshot against every configured bound
    pub fn evaluate(&self, snapshot: &MetricsSnapshot) -> Verdict {
        let mut checks = Vec::new();

        if let Some(ceiling) = self.p95_latency {
            let ceiling_ms = ceiling.as_secs_f64() * 1000.0;
            checks.push(ThresholdCheck {
                metric: "request_duration".to_string(),
                expression: format!("p(95)<{}", ceiling_ms),
                observed: format!("{:.2}ms", snapshot.latency.p95_ms),
                passed: snapshot.latency.p95_ms < ceiling_ms,
            });
        }

        if let Some(max_rate) = self.max_failure_rate {
            checks.push(ThresholdCheck {
                metric: "failed_requests".to_string(),
                expression: format!("rate<{}", max_rate),
                observed: format!("{:.4}", snapshot.failure_rate),
                passed: snapshot.failure_rate < max_rate,
            });
        }

        if let Some(min_requests) = self.min_requests {
            checks.push(ThresholdCheck {
                metric: "total_requests".to_string(),
                expression: format!("count>{}", min_requests),
                observed: snapshot.total_requests.to_string(),
                passed: snapshot.total_requests > min_requests,
            });
        }

        Verdict { checks }
    }
}

/// Result of one threshold comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdCheck {
    pub metric: String,
    pub expression: String,
    pub observed: String,
    pub passed: bool,
}

impl fmt::Display for ThresholdCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (observed {})", self.metric, self.expression, self.observed)
    }
}

/// Overall run verdict
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub checks: Vec<ThresholdCheck>,
}

impl Verdict {
    /// PASS only when every configured threshold holds
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn violations(&self) -> impl Iterator<Item = &ThresholdCheck> {
        self.checks.iter().filter(|check| !check.passed)
    }

    pub fn label(&self) -> &'static str {
        if self.passed() {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{LatencySummary, MetricsSnapshot};
    use std::collections::BTreeMap;

    fn snapshot(total: u64, failed: u64, p95_ms: f64) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: total,
            failed_requests: failed,
            failure_rate: if total == 0 { 0.0 } else { failed as f64 / total as f64 },
            skipped: 0,
            latency: LatencySummary {
                samples: total,
                p95_ms,
                ..LatencySummary::default()
            },
            operations: Vec::new(),
            violations: BTreeMap::new(),
        }
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            p95_latency: Some(Duration::from_millis(300)),
            max_failure_rate: Some(0.01),
            min_requests: Some(1000),
        }
    }

    #[test]
    fn test_all_thresholds_hold() {
        let verdict = thresholds().evaluate(&snapshot(5000, 10, 120.0));
        assert!(verdict.passed());
        assert_eq!(verdict.checks.len(), 3);
        assert_eq!(verdict.label(), "PASS");
    }

    #[test]
    fn test_failure_rate_violation_is_reported() {
        let verdict = thresholds().evaluate(&snapshot(2000, 100, 120.0));
        assert!(!verdict.passed());

        let violations: Vec<_> = verdict.violations().map(|c| c.metric.as_str()).collect();
        assert_eq!(violations, vec!["failed_requests"]);
    }

    #[test]
    fn test_bounds_are_strict() {
        let verdict = thresholds().evaluate(&snapshot(1000, 10, 300.0));
        let violations: Vec<_> = verdict.violations().map(|c| c.metric.as_str()).collect();
        assert_eq!(
            violations,
            vec!["request_duration", "failed_requests", "total_requests"]
        );
    }

    #[test]
    fn test_no_thresholds_always_pass() {
        let verdict = Thresholds::default().evaluate(&snapshot(0, 0, 0.0));
        assert!(verdict.passed());
        assert!(verdict.checks.is_empty());
    }
}
