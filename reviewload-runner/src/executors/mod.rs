//! One executor per operation kind
//!
//! Every invocation either issues exactly one reported request or skips
//! without touching the request count.

mod pull_request;
mod statistics;
mod team;
mod user;

use crate::validation::Exchange;
use rand::rngs::StdRng;
use reviewload_config::domains::workload::LatencyBudgets;
use reviewload_core::{Execution, MetricsCollector, OperationKind, ShadowState, SkipReason};
use reviewload_http::{ApiRequest, HttpClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub use pull_request::generate_pr_id;

/// Issues operations against the service and reports their outcomes
pub struct Executor {
    client: Arc<dyn HttpClient>,
    metrics: Arc<MetricsCollector>,
    budgets: LatencyBudgets,
    lookup_team: String,
}

impl Executor {
    pub fn new(
        client: Arc<dyn HttpClient>,
        metrics: Arc<MetricsCollector>,
        budgets: LatencyBudgets,
        lookup_team: impl Into<String>,
    ) -> Self {
        Self {
            client,
            metrics,
            budgets,
            lookup_team: lookup_team.into(),
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Run one operation against a context's private state and report it
    pub async fn execute(
        &self,
        operation: OperationKind,
        state: &mut ShadowState,
        rng: &mut StdRng,
    ) -> Execution {
        let execution = match operation {
            OperationKind::GetTeam => self.get_team(state, rng).await,
            OperationKind::CreatePr => self.create_pr(state, rng).await,
            OperationKind::GetUserReview => self.get_user_review(state, rng).await,
            OperationKind::MergePr => self.merge_pr(state, rng).await,
            OperationKind::ReassignReviewer => self.reassign_reviewer(state, rng).await,
            OperationKind::SetUserActive => self.set_user_active(state, rng).await,
            OperationKind::GetStatistics => self.get_statistics().await,
        };

        self.report(&execution);
        execution
    }

    fn report(&self, execution: &Execution) {
        match execution {
            Execution::Completed(outcome) => self.metrics.record(outcome),
            Execution::Skipped(operation, reason) => {
                debug!(operation = %operation, reason = %reason, "Skipping iteration");
                self.metrics.record_skip(*operation);
            }
        }
    }

    fn budget(&self, operation: OperationKind) -> Option<Duration> {
        self.budgets.budget(operation)
    }

    /// Send a request and time it
    async fn exchange(&self, request: &ApiRequest) -> Exchange {
        let start = Instant::now();
        let result = self.client.send(request).await;
        Exchange {
            result,
            latency: start.elapsed(),
        }
    }
}

fn skip(operation: OperationKind, reason: SkipReason) -> Execution {
    Execution::Skipped(operation, reason)
}
