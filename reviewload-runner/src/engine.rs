//! Enforces the ramp schedule by starting and retiring virtual users

use crate::ramp::RampScheduler;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What the engine did over one steady state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    pub contexts_started: usize,
    pub peak_concurrency: usize,
    /// Iterations completed across all contexts
    pub iterations: u64,
    /// Stopped before the schedule ran out
    pub interrupted: bool,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

struct LiveContext {
    index: usize,
    cancel: CancellationToken,
    handle: JoinHandle<u64>,
}

/// Re-evaluates the schedule every tick and adjusts the live context count
pub struct RampEngine {
    scheduler: RampScheduler,
    tick: Duration,
}

impl RampEngine {
    pub fn new(scheduler: RampScheduler, tick: Duration) -> Self {
        Self { scheduler, tick }
    }

    pub fn scheduler(&self) -> &RampScheduler {
        &self.scheduler
    }

    /// Drive contexts until the schedule ends or `cancel` fires.
    ///
    /// `spawn_context` receives a 1-based context index and the token that
    /// retires it. Retired contexts are expected to finish their current
    /// iteration and return how many iterations they completed. Contexts are
    /// retired newest-first.
    pub async fn run<F, Fut>(&self, cancel: &CancellationToken, mut spawn_context: F) -> EngineReport
    where
        F: FnMut(usize, CancellationToken) -> Fut,
        Fut: Future<Output = u64> + Send + 'static,
    {
        let start = Instant::now();
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut live: Vec<LiveContext> = Vec::new();
        let mut retired: Vec<JoinHandle<u64>> = Vec::new();
        let mut report = EngineReport::default();

        info!(
            "Ramp engine starting: {} stages over {:?}, peak target {}",
            self.scheduler.stages().len(),
            self.scheduler.total_duration(),
            self.scheduler.max_target()
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Stop requested, retiring {} contexts", live.len());
                    report.interrupted = true;
                    break;
                }
                _ = ticker.tick() => {}
            }

            let Some(target) = self.scheduler.target_at(start.elapsed()) else {
                break;
            };
            let target = target as usize;

            while live.len() < target {
                report.contexts_started += 1;
                let index = report.contexts_started;
                let token = cancel.child_token();
                let handle = tokio::spawn(spawn_context(index, token.clone()));
                live.push(LiveContext {
                    index,
                    cancel: token,
                    handle,
                });
            }

            while live.len() > target {
                if let Some(context) = live.pop() {
                    debug!(context = context.index, "Retiring context");
                    context.cancel.cancel();
                    retired.push(context.handle);
                }
            }

            report.peak_concurrency = report.peak_concurrency.max(live.len());
        }

        for context in live.drain(..).rev() {
            context.cancel.cancel();
            retired.push(context.handle);
        }

        for handle in retired {
            match handle.await {
                Ok(iterations) => report.iterations += iterations,
                Err(e) => warn!("Context task failed to complete cleanly: {}", e),
            }
        }

        report.elapsed = start.elapsed();
        info!(
            "Ramp engine finished: {} contexts started, peak {}, {} iterations",
            report.contexts_started, report.peak_concurrency, report.iterations
        );
        report
    }
}
