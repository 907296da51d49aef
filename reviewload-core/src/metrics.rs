//! Aggregation of request outcomes shared by all execution contexts
//!
//! Counters are atomics and the latency histogram sits behind a mutex, so
//! any number of contexts can report concurrently without losing updates.

use crate::error::MetricsError;
use crate::operation::OperationKind;
use crate::outcome::{OutcomeRecord, ViolationKind};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Highest latency tracked with full precision: 10 minutes, in microseconds
const MAX_TRACKABLE_MICROS: u64 = 600_000_000;

#[derive(Debug, Default)]
struct OperationCounters {
    requests: AtomicU64,
    failures: AtomicU64,
    skipped: AtomicU64,
}

/// Thread-safe accumulator for request count, failure rate and durations
#[derive(Debug)]
pub struct MetricsCollector {
    total_requests: AtomicU64,
    failure_samples: AtomicU64,
    failures: AtomicU64,
    skipped: AtomicU64,
    durations: Mutex<Histogram<u64>>,
    operations: [OperationCounters; OperationKind::COUNT],
    violations: [AtomicU64; ViolationKind::COUNT],
}

impl MetricsCollector {
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            total_requests: AtomicU64::new(0),
            failure_samples: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            durations: Mutex::new(Histogram::new_with_bounds(1, MAX_TRACKABLE_MICROS, 3)?),
            operations: std::array::from_fn(|_| OperationCounters::default()),
            violations: std::array::from_fn(|_| AtomicU64::new(0)),
        })
    }

    /// Add to the total request count
    pub fn record_count(&self, n: u64) {
        self.total_requests.fetch_add(n, Ordering::Relaxed);
    }

    /// Add one sample to the failure rate
    pub fn record_failure(&self, failed: bool) {
        self.failure_samples.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Add one sample to the duration distribution
    pub fn record_duration(&self, millis: f64) {
        let micros = (millis.max(0.0) * 1000.0).round() as u64;
        self.durations.lock().saturating_record(micros);
    }

    /// Record a completed request: one count, one failure-rate sample and one
    /// duration, plus the per-operation and per-violation breakdowns.
    pub fn record(&self, outcome: &OutcomeRecord) {
        let failed = !outcome.is_success();
        self.record_count(1);
        self.record_failure(failed);
        self.record_duration(outcome.latency_ms());

        let counters = &self.operations[outcome.operation.index()];
        counters.requests.fetch_add(1, Ordering::Relaxed);

        if let Some(violation) = &outcome.violation {
            counters.failures.fetch_add(1, Ordering::Relaxed);
            self.violations[violation.kind().index()].fetch_add(1, Ordering::Relaxed);
            warn!(
                operation = %outcome.operation,
                status = outcome.status.unwrap_or(0),
                latency_ms = outcome.latency.as_millis() as u64,
                body = outcome.body_excerpt.as_deref().unwrap_or("no body"),
                "Operation {} failed: {}",
                outcome.operation,
                violation
            );
        }
    }

    /// Note an iteration that issued no request. Skips never touch the
    /// request count or failure rate.
    pub fn record_skip(&self, operation: OperationKind) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        self.operations[operation.index()]
            .skipped
            .fetch_add(1, Ordering::Relaxed);
        debug!(operation = %operation, "Operation skipped");
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Fraction of failure samples that failed, 0.0 with no samples
    pub fn failure_rate(&self) -> f64 {
        let samples = self.failure_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0.0;
        }
        self.failures.load(Ordering::Relaxed) as f64 / samples as f64
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let latency = {
            let histogram = self.durations.lock();
            LatencySummary::from_histogram(&histogram)
        };

        let operations = OperationKind::all()
            .iter()
            .map(|kind| {
                let counters = &self.operations[kind.index()];
                OperationSnapshot {
                    operation: *kind,
                    requests: counters.requests.load(Ordering::Relaxed),
                    failures: counters.failures.load(Ordering::Relaxed),
                    skipped: counters.skipped.load(Ordering::Relaxed),
                }
            })
            .collect();

        let violations = ViolationKind::all()
            .iter()
            .filter_map(|kind| {
                let count = self.violations[kind.index()].load(Ordering::Relaxed);
                (count > 0).then(|| (kind.as_str().to_string(), count))
            })
            .collect();

        MetricsSnapshot {
            total_requests: self.total_requests(),
            failed_requests: self.failures.load(Ordering::Relaxed),
            failure_rate: self.failure_rate(),
            skipped: self.skipped.load(Ordering::Relaxed),
            latency,
            operations,
            violations,
        }
    }
}

/// Point-in-time view of the aggregated metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub failure_rate: f64,
    pub skipped: u64,
    pub latency: LatencySummary,
    pub operations: Vec<OperationSnapshot>,
    pub violations: BTreeMap<String, u64>,
}

impl MetricsSnapshot {
    pub fn successful_requests(&self) -> u64 {
        self.total_requests.saturating_sub(self.failed_requests)
    }

    pub fn operation(&self, kind: OperationKind) -> Option<&OperationSnapshot> {
        self.operations.iter().find(|op| op.operation == kind)
    }
}

/// Request duration distribution in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub samples: u64,
    pub min_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

impl LatencySummary {
    fn from_histogram(histogram: &Histogram<u64>) -> Self {
        if histogram.is_empty() {
            return Self::default();
        }
        let ms = |micros: u64| micros as f64 / 1000.0;
        Self {
            samples: histogram.len(),
            min_ms: ms(histogram.min()),
            mean_ms: histogram.mean() / 1000.0,
            p50_ms: ms(histogram.value_at_quantile(0.50)),
            p90_ms: ms(histogram.value_at_quantile(0.90)),
            p95_ms: ms(histogram.value_at_quantile(0.95)),
            p99_ms: ms(histogram.value_at_quantile(0.99)),
            max_ms: ms(histogram.max()),
        }
    }
}

/// Per-operation counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub operation: OperationKind,
    pub requests: u64,
    pub failures: u64,
    pub skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Violation;
    use std::sync::Arc;
    use std::time::Duration;

    fn passed(kind: OperationKind, millis: u64) -> OutcomeRecord {
        OutcomeRecord::passed(kind, Duration::from_millis(millis), 200)
    }

    #[test]
    fn test_empty_snapshot() {
        let metrics = MetricsCollector::new().unwrap();
        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.failure_rate, 0.0);
        assert_eq!(snapshot.latency, LatencySummary::default());
        assert!(snapshot.violations.is_empty());
    }

    #[test]
    fn test_record_outcomes() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.record(&passed(OperationKind::GetTeam, 10));
        metrics.record(&passed(OperationKind::GetTeam, 20));
        metrics.record(&OutcomeRecord::failed(
            OperationKind::GetStatistics,
            Duration::from_millis(30),
            Some(500),
            Violation::Status { status: 500 },
            Some("boom"),
        ));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.successful_requests(), 2);
        assert!((snapshot.failure_rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(snapshot.latency.samples, 3);
        assert!((snapshot.latency.max_ms - 30.0).abs() < 0.1);
        assert_eq!(snapshot.violations.get("status"), Some(&1));

        let stats = snapshot.operation(OperationKind::GetStatistics).unwrap();
        assert_eq!((stats.requests, stats.failures), (1, 1));
        let team = snapshot.operation(OperationKind::GetTeam).unwrap();
        assert_eq!((team.requests, team.failures), (2, 0));
    }

    #[test]
    fn test_skips_do_not_count() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.record_skip(OperationKind::MergePr);
        metrics.record_skip(OperationKind::MergePr);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.failed_requests, 0);
        assert_eq!(snapshot.failure_rate, 0.0);
        assert_eq!(snapshot.latency.samples, 0);
        assert_eq!(snapshot.skipped, 2);
        assert_eq!(snapshot.operation(OperationKind::MergePr).unwrap().skipped, 2);
    }

    #[test]
    fn test_percentiles() {
        let metrics = MetricsCollector::new().unwrap();
        for millis in 1..=100 {
            metrics.record_duration(millis as f64);
        }

        let latency = metrics.snapshot().latency;
        assert!((latency.p50_ms - 50.0).abs() < 0.5);
        assert!((latency.p95_ms - 95.0).abs() < 0.5);
        assert!((latency.min_ms - 1.0).abs() < 0.01);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_lose_nothing() {
        let metrics = Arc::new(MetricsCollector::new().unwrap());
        let writers = 16;
        let per_writer = 1_000;

        let handles: Vec<_> = (0..writers)
            .map(|writer| {
                let metrics = Arc::clone(&metrics);
                tokio::spawn(async move {
                    for i in 0..per_writer {
                        let kind = OperationKind::all()[(writer + i) % OperationKind::COUNT];
                        metrics.record(&passed(kind, (i % 50) as u64));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = metrics.snapshot();
        let expected = (writers * per_writer) as u64;
        assert_eq!(snapshot.total_requests, expected);
        assert_eq!(snapshot.latency.samples, expected);
        assert_eq!(
            snapshot.operations.iter().map(|op| op.requests).sum::<u64>(),
            expected
        );
    }
}
