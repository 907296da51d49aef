//! Run parameters resolved from configuration

use crate::error::RunError;
use crate::ramp::RampScheduler;
use reviewload_config::domains::workload::LatencyBudgets;
use reviewload_config::ReviewloadConfig;
use reviewload_core::{OperationSelector, Team, Thresholds};
use std::time::Duration;

/// Everything the orchestrator needs, already validated
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub ramp: RampScheduler,
    pub tick: Duration,
    pub pacing: Duration,
    pub setup_pause: Duration,
    pub seed_pr_interval: Duration,
    pub seed_pr_count: usize,
    pub lookup_team: String,
    pub seed: Option<u64>,
    pub selector: OperationSelector,
    pub budgets: LatencyBudgets,
    pub thresholds: Thresholds,
    pub teams: Vec<Team>,
}

impl TryFrom<&ReviewloadConfig> for RunSettings {
    type Error = RunError;

    fn try_from(config: &ReviewloadConfig) -> Result<Self, Self::Error> {
        config.validate_all()?;

        let workload = &config.workload;
        Ok(Self {
            ramp: RampScheduler::from(&config.ramp),
            tick: config.ramp.tick,
            pacing: workload.pacing,
            setup_pause: workload.setup_pause,
            seed_pr_interval: workload.seed_pr_interval,
            seed_pr_count: workload.seed_pr_count,
            lookup_team: workload.reassign_lookup_team.clone(),
            seed: workload.seed,
            selector: workload.selector()?,
            budgets: workload.latency_budgets.clone(),
            thresholds: config.thresholds.to_thresholds(),
            teams: config.seed.teams(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewload_core::OperationKind;

    #[test]
    fn test_settings_from_default_config() {
        let settings = RunSettings::try_from(&ReviewloadConfig::default()).unwrap();
        assert_eq!(settings.teams.len(), 3);
        assert_eq!(settings.seed_pr_count, 10);
        assert_eq!(settings.pacing, Duration::from_secs(1));
        assert_eq!(settings.ramp.total_duration(), Duration::from_secs(45));
        assert_eq!(settings.lookup_team, "backend-team");
        assert_eq!(
            settings.budgets.budget(OperationKind::MergePr),
            Some(Duration::from_millis(800))
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ReviewloadConfig::default();
        config.ramp.stages.clear();
        assert!(matches!(
            RunSettings::try_from(&config),
            Err(RunError::Config(_))
        ));
    }
}
