//! End-of-run summary rendering and JSON export

use anyhow::{Context, Result};
use colored::Colorize;
use reviewload_core::{MetricsSnapshot, Verdict};
use reviewload_runner::RunReport;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

/// Render the human-readable summary printed after a run
pub fn render(report: &RunReport) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "\n{}", "Load test summary".bold())?;
    writeln!(out, "  Run id:      {}", report.run_id)?;
    writeln!(
        out,
        "  Duration:    {:.1}s ({} contexts, peak {}{})",
        report.engine.elapsed.as_secs_f64(),
        report.engine.contexts_started,
        report.engine.peak_concurrency,
        if report.engine.interrupted {
            ", interrupted"
        } else {
            ""
        }
    )?;
    writeln!(
        out,
        "  Baseline:    {} teams, {} users, {} PRs",
        report.baseline.teams, report.baseline.users, report.baseline.prs
    )?;
    if let Some(stats) = &report.final_statistics {
        writeln!(out, "  Server PRs:  {} total", stats.total_prs)?;
    }

    render_metrics(&mut out, &report.metrics)?;
    render_verdict(&mut out, &report.verdict)?;
    Ok(out)
}

fn render_metrics(out: &mut String, metrics: &MetricsSnapshot) -> fmt::Result {
    let latency = &metrics.latency;

    writeln!(out, "\n{}", "Requests".bold())?;
    writeln!(
        out,
        "  total {}  failed {} ({:.2}%)  skipped {}",
        metrics.total_requests,
        metrics.failed_requests,
        metrics.failure_rate * 100.0,
        metrics.skipped
    )?;
    writeln!(
        out,
        "  latency ms: min {:.1}  p50 {:.1}  p90 {:.1}  p95 {:.1}  p99 {:.1}  max {:.1}",
        latency.min_ms, latency.p50_ms, latency.p90_ms, latency.p95_ms, latency.p99_ms, latency.max_ms
    )?;

    writeln!(out, "\n{}", "Operations".bold())?;
    for op in &metrics.operations {
        let failures = if op.failures > 0 {
            op.failures.to_string().red().to_string()
        } else {
            op.failures.to_string()
        };
        writeln!(
            out,
            "  {:<18} requests {:>7}  failures {:>5}  skipped {:>5}",
            op.operation.as_str(),
            op.requests,
            failures,
            op.skipped
        )?;
    }

    if !metrics.violations.is_empty() {
        writeln!(out, "\n{}", "Failure reasons".bold())?;
        for (kind, count) in &metrics.violations {
            writeln!(out, "  {:<18} {}", kind, count)?;
        }
    }

    Ok(())
}

fn render_verdict(out: &mut String, verdict: &Verdict) -> fmt::Result {
    writeln!(out, "\n{}", "Thresholds".bold())?;
    if verdict.checks.is_empty() {
        writeln!(out, "  none configured")?;
    }
    for check in &verdict.checks {
        let mark = if check.passed {
            "✓".green()
        } else {
            "✗".red()
        };
        writeln!(out, "  {} {}", mark, check)?;
    }

    let label = if verdict.passed() {
        verdict.label().green().bold()
    } else {
        verdict.label().red().bold()
    };
    writeln!(out, "\nVerdict: {}", label)
}

/// Write the run report as pretty JSON
pub fn export(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create summary export directory")?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    fs::write(path, json).with_context(|| format!("Failed to write run report to {:?}", path))?;
    Ok(())
}
