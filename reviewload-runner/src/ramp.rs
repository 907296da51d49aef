//! Target concurrency over wall-clock time

use reviewload_config::RampConfig;
use serde::Serialize;
use std::time::Duration;

/// Interval during which concurrency moves linearly to `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RampStage {
    pub duration: Duration,
    pub target: u32,
}

impl RampStage {
    pub fn new(duration: Duration, target: u32) -> Self {
        Self { duration, target }
    }
}

/// Piecewise-linear concurrency schedule.
///
/// Within each stage the target moves from the previous stage's target (or
/// the start concurrency for the first stage) to the stage's own target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampScheduler {
    start: u32,
    stages: Vec<RampStage>,
}

impl RampScheduler {
    pub fn new(start: u32, stages: Vec<RampStage>) -> Self {
        Self { start, stages }
    }

    pub fn stages(&self) -> &[RampStage] {
        &self.stages
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|stage| stage.duration).sum()
    }

    /// Highest concurrency the schedule ever asks for
    pub fn max_target(&self) -> u32 {
        self.stages
            .iter()
            .map(|stage| stage.target)
            .fold(self.start, u32::max)
    }

    /// Target concurrency at `elapsed`, rounded to nearest. `None` once the
    /// schedule is over.
    pub fn target_at(&self, elapsed: Duration) -> Option<u32> {
        let mut from = self.start;
        let mut stage_start = Duration::ZERO;

        for stage in &self.stages {
            let stage_end = stage_start + stage.duration;
            if elapsed < stage_end {
                let progress = (elapsed - stage_start).as_secs_f64() / stage.duration.as_secs_f64();
                let value = from as f64 + (stage.target as f64 - from as f64) * progress;
                return Some(value.round().max(0.0) as u32);
            }
            from = stage.target;
            stage_start = stage_end;
        }

        None
    }
}

impl From<&RampConfig> for RampScheduler {
    fn from(config: &RampConfig) -> Self {
        Self::new(
            config.start_concurrency,
            config
                .stages
                .iter()
                .map(|stage| RampStage::new(stage.duration, stage.target))
                .collect(),
        )
    }
}
