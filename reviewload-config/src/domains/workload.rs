//! Workload configuration: traffic mix, pacing and latency budgets

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use reviewload_core::sampler::STANDARD_WEIGHTS;
use reviewload_core::{OperationKind, OperationSelector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How each execution context generates traffic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Delay between iterations of one context
    #[serde(with = "humantime_serde", default = "default_pacing")]
    pub pacing: Duration,

    /// Pause between team creation and PR seeding
    #[serde(with = "humantime_serde", default = "default_setup_pause")]
    pub setup_pause: Duration,

    /// Pause between consecutive seed PR creations
    #[serde(with = "humantime_serde", default = "default_seed_pr_interval")]
    pub seed_pr_interval: Duration,

    /// Number of pull requests created during setup
    #[serde(default = "default_seed_pr_count")]
    pub seed_pr_count: usize,

    /// Team whose members are looked up when picking a reviewer to replace
    #[serde(default = "default_reassign_lookup_team")]
    pub reassign_lookup_team: String,

    /// Seed for reproducible random draws; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Ordered operation weights, summing to 1.0
    #[serde(default = "default_mix")]
    pub mix: Vec<MixEntry>,

    /// Per-operation latency budgets
    #[serde(default)]
    pub latency_budgets: LatencyBudgets,
}

/// One entry of the traffic mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    pub operation: OperationKind,
    pub weight: f64,
}

/// Latency budget per operation. A response slower than its budget fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyBudgets {
    #[serde(with = "humantime_serde")]
    pub get_team: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub create_pr: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub get_user_review: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub merge_pr: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub reassign_reviewer: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub set_user_active: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub get_statistics: Option<Duration>,
}

impl LatencyBudgets {
    pub fn budget(&self, operation: OperationKind) -> Option<Duration> {
        match operation {
            OperationKind::GetTeam => self.get_team,
            OperationKind::CreatePr => self.create_pr,
            OperationKind::GetUserReview => self.get_user_review,
            OperationKind::MergePr => self.merge_pr,
            OperationKind::ReassignReviewer => self.reassign_reviewer,
            OperationKind::SetUserActive => self.set_user_active,
            OperationKind::GetStatistics => self.get_statistics,
        }
    }
}

impl Default for LatencyBudgets {
    fn default() -> Self {
        Self {
            get_team: Some(Duration::from_millis(500)),
            create_pr: Some(Duration::from_millis(1000)),
            get_user_review: None,
            merge_pr: Some(Duration::from_millis(800)),
            reassign_reviewer: Some(Duration::from_millis(800)),
            set_user_active: None,
            get_statistics: None,
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            pacing: default_pacing(),
            setup_pause: default_setup_pause(),
            seed_pr_interval: default_seed_pr_interval(),
            seed_pr_count: default_seed_pr_count(),
            reassign_lookup_team: default_reassign_lookup_team(),
            seed: None,
            mix: default_mix(),
            latency_budgets: LatencyBudgets::default(),
        }
    }
}

impl WorkloadConfig {
    /// Build the operation selector described by `mix`
    pub fn selector(&self) -> ConfigResult<OperationSelector> {
        OperationSelector::from_mix(self.mix.iter().map(|entry| (entry.operation, entry.weight)))
            .map_err(|e| self.validation_error(format!("invalid mix: {}", e)))
    }
}

impl Validatable for WorkloadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(
            &self.reassign_lookup_team,
            "reassign_lookup_team",
            self.domain_name(),
        )?;

        for operation in OperationKind::all() {
            if !self.mix.iter().any(|entry| entry.operation == *operation) {
                return Err(self.validation_error(format!("mix is missing operation {}", operation)));
            }
        }

        self.selector()?;

        if let Some(zero) = OperationKind::all()
            .iter()
            .find(|kind| self.latency_budgets.budget(**kind) == Some(Duration::ZERO))
        {
            return Err(self.validation_error(format!("latency budget for {} must be positive", zero)));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "workload"
    }
}

// Default value functions
fn default_pacing() -> Duration {
    Duration::from_secs(1)
}

fn default_setup_pause() -> Duration {
    Duration::from_secs(2)
}

fn default_seed_pr_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_seed_pr_count() -> usize {
    10
}

fn default_reassign_lookup_team() -> String {
    "backend-team".to_string()
}

fn default_mix() -> Vec<MixEntry> {
    OperationKind::all()
        .iter()
        .zip(STANDARD_WEIGHTS)
        .map(|(operation, weight)| MixEntry {
            operation: *operation,
            weight,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_defaults() {
        let config = WorkloadConfig::default();
        assert_eq!(config.pacing, Duration::from_secs(1));
        assert_eq!(config.seed_pr_count, 10);
        assert_eq!(config.reassign_lookup_team, "backend-team");
        assert_eq!(config.mix.len(), OperationKind::COUNT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_budgets() {
        let budgets = LatencyBudgets::default();
        assert_eq!(budgets.budget(OperationKind::GetTeam), Some(Duration::from_millis(500)));
        assert_eq!(budgets.budget(OperationKind::CreatePr), Some(Duration::from_millis(1000)));
        assert_eq!(budgets.budget(OperationKind::MergePr), Some(Duration::from_millis(800)));
        assert_eq!(budgets.budget(OperationKind::GetStatistics), None);
    }

    #[test]
    fn test_mix_must_sum_to_one() {
        let mut config = WorkloadConfig::default();
        config.mix[0].weight = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mix_must_cover_every_operation() {
        let mut config = WorkloadConfig::default();
        let removed = config.mix.pop().unwrap();
        config.mix[0].weight += removed.weight;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_budget_override_from_yaml() {
        let yaml = r#"
latency_budgets:
  get_statistics: 300ms
  get_team: null
"#;
        let config: WorkloadConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.latency_budgets.budget(OperationKind::GetStatistics),
            Some(Duration::from_millis(300))
        );
        assert_eq!(config.latency_budgets.budget(OperationKind::GetTeam), None);
        assert_eq!(
            config.latency_budgets.budget(OperationKind::MergePr),
            Some(Duration::from_millis(800))
        );
    }
}
