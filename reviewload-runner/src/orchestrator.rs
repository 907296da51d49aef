//! Run lifecycle: setup, steady state, teardown
//!
//! Setup builds the baseline shadow state once. Every virtual user gets its
//! own clone of it, and teardown reports from the untouched baseline.

use crate::api::{self, Statistics, StatisticsResponse};
use crate::context::{context_rng, VirtualUser};
use crate::engine::{EngineReport, RampEngine};
use crate::error::{PhaseError, RunError};
use crate::executors::Executor;
use crate::settings::RunSettings;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use reviewload_core::outcome::excerpt;
use reviewload_core::{MetricsCollector, MetricsSnapshot, PrStatus, ShadowState, Verdict};
use reviewload_http::HttpClient;
use serde::Serialize;
use serde_json::Number;
use std::fmt;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Orchestrator states. Transitions only move forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunPhase {
    Setup,
    SteadyState,
    Teardown,
    Done,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Setup => "SETUP",
            RunPhase::SteadyState => "STEADY_STATE",
            RunPhase::Teardown => "TEARDOWN",
            RunPhase::Done => "DONE",
        }
    }

    /// The only phase reachable from this one
    pub fn next(&self) -> Option<RunPhase> {
        match self {
            RunPhase::Setup => Some(RunPhase::SteadyState),
            RunPhase::SteadyState => Some(RunPhase::Teardown),
            RunPhase::Teardown => Some(RunPhase::Done),
            RunPhase::Done => None,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity counts of a shadow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BaselineSummary {
    pub teams: usize,
    pub users: usize,
    pub prs: usize,
    pub open_prs: usize,
    pub merged_prs: usize,
}

impl From<&ShadowState> for BaselineSummary {
    fn from(state: &ShadowState) -> Self {
        Self {
            teams: state.teams.len(),
            users: state.users.len(),
            prs: state.prs.len(),
            open_prs: state.count_prs(PrStatus::Open),
            merged_prs: state.count_prs(PrStatus::Merged),
        }
    }
}

/// Everything known about a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub baseline: BaselineSummary,
    pub engine: EngineReport,
    pub metrics: MetricsSnapshot,
    pub verdict: Verdict,
    /// Statistics read during teardown, when it succeeded
    pub final_statistics: Option<Statistics>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }
}

pub struct RunOrchestrator {
    settings: RunSettings,
    client: Arc<dyn HttpClient>,
    metrics: Arc<MetricsCollector>,
    phase: RunPhase,
    cancel: CancellationToken,
    setup_rng: StdRng,
}

impl RunOrchestrator {
    pub fn new(settings: RunSettings, client: Arc<dyn HttpClient>) -> Result<Self, RunError> {
        let setup_rng = context_rng(settings.seed, 0);
        Ok(Self {
            settings,
            client,
            metrics: Arc::new(MetricsCollector::new()?),
            phase: RunPhase::Setup,
            cancel: CancellationToken::new(),
            setup_rng,
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Token that stops the steady state early. Contexts finish their
    /// current iteration and teardown still runs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn expect_phase(&self, expected: RunPhase) -> Result<(), PhaseError> {
        if self.phase != expected {
            return Err(PhaseError::UnexpectedPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: RunPhase) -> Result<(), PhaseError> {
        if self.phase.next() != Some(to) {
            return Err(PhaseError::IllegalTransition {
                from: self.phase,
                to,
            });
        }
        info!("Run phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Create the seed teams and pull requests and return the baseline.
    ///
    /// Failed creations are logged and left out; nothing here is retried.
    pub async fn setup(&mut self) -> Result<ShadowState, RunError> {
        self.expect_phase(RunPhase::Setup)?;
        info!("Setting up test data...");

        let mut baseline = ShadowState::new();

        for team in &self.settings.teams {
            match self
                .client
                .send(&api::create_team(&team.name, &team.members))
                .await
            {
                Ok(response) if response.status == 201 => {
                    info!("Created team: {}", team.name);
                    baseline.record_team_created(team.name.clone(), &team.members);
                }
                Ok(response) => warn!(
                    "Failed to create team {}: {} - {}",
                    team.name,
                    response.status,
                    excerpt(&response.body)
                ),
                Err(e) => warn!("Failed to create team {}: {}", team.name, e),
            }
        }

        sleep(self.settings.setup_pause).await;

        if baseline.users.is_empty() {
            warn!("No users were registered, skipping initial pull requests");
        } else {
            info!("Creating initial PRs...");
            for i in 0..self.settings.seed_pr_count {
                let Ok(author) = baseline.random_user(&mut self.setup_rng).cloned() else {
                    break;
                };
                let id = format!("initial-pr-{}-{}", i, Utc::now().timestamp_millis());
                let title = format!("Initial PR {}", i);

                match self.client.send(&api::create_pr(&id, &title, &author)).await {
                    Ok(response) if response.status == 201 => {
                        info!("Created PR: {}", id);
                        baseline.record_pr_created(id, title, author);
                    }
                    Ok(response) => warn!(
                        "Failed to create PR {}: {} - {}",
                        id,
                        response.status,
                        excerpt(&response.body)
                    ),
                    Err(e) => warn!("Failed to create PR {}: {}", id, e),
                }

                sleep(self.settings.seed_pr_interval).await;
            }
        }

        info!(
            "Setup complete: {} teams, {} users, {} PRs",
            baseline.teams.len(),
            baseline.users.len(),
            baseline.prs.len()
        );

        self.transition(RunPhase::SteadyState)?;
        Ok(baseline)
    }

    /// Run virtual users under the ramp schedule until it ends or the run is
    /// cancelled
    pub async fn steady_state(&mut self, baseline: &ShadowState) -> Result<EngineReport, RunError> {
        self.expect_phase(RunPhase::SteadyState)?;

        let executor = Arc::new(Executor::new(
            self.client.clone(),
            self.metrics.clone(),
            self.settings.budgets.clone(),
            self.settings.lookup_team.clone(),
        ));
        let selector = Arc::new(self.settings.selector.clone());
        let engine = RampEngine::new(self.settings.ramp.clone(), self.settings.tick);
        let pacing = self.settings.pacing;
        let seed = self.settings.seed;

        let report = engine
            .run(&self.cancel, |index, token| {
                VirtualUser::new(
                    index,
                    executor.clone(),
                    selector.clone(),
                    baseline,
                    context_rng(seed, index),
                    pacing,
                )
                .run(token)
            })
            .await;

        self.transition(RunPhase::Teardown)?;
        Ok(report)
    }

    /// Report the baseline and read the final statistics. The read is not
    /// counted in the run metrics.
    pub async fn teardown(&mut self, baseline: &ShadowState) -> Result<Option<Statistics>, RunError> {
        self.expect_phase(RunPhase::Teardown)?;
        info!("Load test completed");

        let summary = BaselineSummary::from(baseline);
        info!(
            "Final state: {} teams, {} users, {} PRs ({} OPEN, {} MERGED)",
            summary.teams, summary.users, summary.prs, summary.open_prs, summary.merged_prs
        );

        let statistics = match self.client.send(&api::get_statistics()).await {
            Ok(response) if response.is_success() => match response.json::<StatisticsResponse>() {
                Ok(body) => {
                    let stats = body.statistics;
                    info!(
                        "Final statistics: {} total PRs, {} open, {} merged",
                        stats.total_prs,
                        display_count(stats.open_prs.as_ref()),
                        display_count(stats.merged_prs.as_ref())
                    );
                    Some(stats)
                }
                Err(e) => {
                    warn!("Final statistics body could not be read: {}", e);
                    None
                }
            },
            Ok(response) => {
                warn!(
                    "Final statistics request failed: {} - {}",
                    response.status,
                    excerpt(&response.body)
                );
                None
            }
            Err(e) => {
                warn!("Final statistics request failed: {}", e);
                None
            }
        };

        self.transition(RunPhase::Done)?;
        Ok(statistics)
    }

    /// Run every phase and evaluate the thresholds
    pub async fn run(mut self) -> Result<RunReport, RunError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(run_id = %run_id, "Starting load run");

        let baseline = self.setup().await?;
        let engine = self.steady_state(&baseline).await?;
        let final_statistics = self.teardown(&baseline).await?;

        let metrics = self.metrics.snapshot();
        let verdict = self.settings.thresholds.evaluate(&metrics);
        for check in verdict.violations() {
            warn!("Threshold violated: {}", check);
        }
        info!(
            run_id = %run_id,
            total_requests = metrics.total_requests,
            failure_rate = metrics.failure_rate,
            "Run verdict: {}",
            verdict.label()
        );

        Ok(RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            baseline: BaselineSummary::from(&baseline),
            engine,
            metrics,
            verdict,
            final_statistics,
        })
    }
}

fn display_count(value: Option<&Number>) -> String {
    value.map_or_else(|| "n/a".to_string(), Number::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert_eq!(RunPhase::Setup.next(), Some(RunPhase::SteadyState));
        assert_eq!(RunPhase::SteadyState.next(), Some(RunPhase::Teardown));
        assert_eq!(RunPhase::Teardown.next(), Some(RunPhase::Done));
        assert_eq!(RunPhase::Done.next(), None);
        assert_eq!(RunPhase::SteadyState.to_string(), "STEADY_STATE");
    }

    #[test]
    fn test_baseline_summary() {
        let mut state = ShadowState::new();
        state.teams.push("backend-team".to_string());
        state.record_pr_created("pr-1", "one", "user1");
        state.record_pr_created("pr-2", "two", "user1");
        state.record_pr_merged("pr-2");

        let summary = BaselineSummary::from(&state);
        assert_eq!(summary.teams, 1);
        assert_eq!(summary.prs, 2);
        assert_eq!(summary.open_prs, 1);
        assert_eq!(summary.merged_prs, 1);
    }
}
