//! One virtual user: select, execute, pace, repeat

use crate::executors::Executor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reviewload_core::{OperationSelector, ShadowState};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Independent iteration loop owning a private copy of the baseline
pub struct VirtualUser {
    index: usize,
    executor: Arc<Executor>,
    selector: Arc<OperationSelector>,
    state: ShadowState,
    rng: StdRng,
    pacing: Duration,
}

impl VirtualUser {
    pub fn new(
        index: usize,
        executor: Arc<Executor>,
        selector: Arc<OperationSelector>,
        baseline: &ShadowState,
        rng: StdRng,
        pacing: Duration,
    ) -> Self {
        Self {
            index,
            executor,
            selector,
            state: baseline.clone(),
            rng,
            pacing,
        }
    }

    pub fn state(&self) -> &ShadowState {
        &self.state
    }

    /// Execute a single select-execute step without pacing
    pub async fn step(&mut self) -> reviewload_core::Execution {
        let operation = self.selector.select(&mut self.rng);
        self.executor
            .execute(operation, &mut self.state, &mut self.rng)
            .await
    }

    /// Loop until retired. A retirement signal never interrupts an
    /// operation in flight, only the pacing wait after it.
    pub async fn run(mut self, cancel: CancellationToken) -> u64 {
        let mut iterations = 0;

        while !cancel.is_cancelled() {
            let execution = self.step().await;
            iterations += 1;
            trace!(
                context = self.index,
                operation = %execution.operation(),
                skipped = execution.is_skipped(),
                "Iteration complete"
            );

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.pacing) => {}
            }
        }

        iterations
    }
}

/// Random source for one context: derived from the run seed when there is
/// one, otherwise from OS entropy.
pub fn context_rng(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_os_rng(),
    }
}
