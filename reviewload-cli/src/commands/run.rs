//! `run`: drive a full load run against the target service

use crate::summary;
use anyhow::{Context, Result};
use reviewload_config::ReviewloadConfig;
use reviewload_http::{HttpConfig, HttpManager};
use reviewload_runner::{RunOrchestrator, RunReport, RunSettings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

/// Exit status when the run completed but a threshold was violated
pub const EXIT_THRESHOLDS_FAILED: u8 = 99;

/// Command-line overrides for a run
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub base_url: Option<String>,
    pub seed: Option<u64>,
    pub summary_export: Option<PathBuf>,
}

impl RunOverrides {
    fn apply(&self, config: &mut ReviewloadConfig) {
        if let Some(base_url) = &self.base_url {
            config.target.base_url = base_url.clone();
        }
        if let Some(seed) = self.seed {
            config.workload.seed = Some(seed);
        }
    }
}

pub async fn run(mut config: ReviewloadConfig, overrides: RunOverrides) -> Result<ExitCode> {
    overrides.apply(&mut config);

    let settings = RunSettings::try_from(&config).context("Invalid run configuration")?;
    let manager = HttpManager::with_config(HttpConfig::from(&config.target))
        .context("Failed to create HTTP client")?;
    info!("Targeting {}", config.target.base_url);

    let orchestrator = RunOrchestrator::new(settings, Arc::new(manager))?;

    let cancel = orchestrator.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, letting contexts finish their current iteration");
            cancel.cancel();
        }
    });

    let report = orchestrator.run().await;
    interrupt.abort();
    let report = report.context("Load run failed")?;

    finish(&report, overrides.summary_export.as_deref())
}

fn finish(report: &RunReport, summary_export: Option<&std::path::Path>) -> Result<ExitCode> {
    println!(
        "{}",
        summary::render(report).context("Failed to render run summary")?
    );

    if let Some(path) = summary_export {
        summary::export(report, path)?;
        info!("Run report written to {:?}", path);
    }

    Ok(exit_code(report))
}

fn exit_code(report: &RunReport) -> ExitCode {
    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_THRESHOLDS_FAILED)
    }
}
