//! End-to-end runs of the orchestrator over the offline mock client

use reviewload_config::domains::ramp::StageConfig;
use reviewload_config::domains::workload::MixEntry;
use reviewload_config::ReviewloadConfig;
use reviewload_core::{OperationKind, PrStatus};
use reviewload_http::{HttpManager, HttpMethod, MockResponse, RequestRecorder};
use reviewload_runner::{api, PhaseError, RunError, RunOrchestrator, RunPhase, RunSettings};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn short_config() -> ReviewloadConfig {
    let mut config = ReviewloadConfig::default();
    config.ramp.stages = vec![
        StageConfig::new(Duration::from_secs(1), 2),
        StageConfig::new(Duration::from_secs(1), 0),
    ];
    config.ramp.tick = Duration::from_millis(100);
    config.workload.pacing = Duration::from_millis(100);
    config.workload.seed = Some(7);
    config.thresholds.min_requests = Some(5);
    // Activation toggles flip on every call; a static mock cannot follow them
    config.workload.mix = mix(&[
        (OperationKind::GetTeam, 0.20),
        (OperationKind::CreatePr, 0.15),
        (OperationKind::GetUserReview, 0.20),
        (OperationKind::MergePr, 0.10),
        (OperationKind::ReassignReviewer, 0.10),
        (OperationKind::GetStatistics, 0.25),
    ]);
    config
}

/// Full mix with every unlisted operation at weight zero
fn mix(weights: &[(OperationKind, f64)]) -> Vec<MixEntry> {
    OperationKind::all()
        .iter()
        .map(|operation| MixEntry {
            operation: *operation,
            weight: weights
                .iter()
                .find(|(kind, _)| kind == operation)
                .map_or(0.0, |(_, weight)| *weight),
        })
        .collect()
}

fn settings(config: &ReviewloadConfig) -> RunSettings {
    RunSettings::try_from(config).unwrap()
}

fn offline() -> (Arc<HttpManager>, Arc<RequestRecorder>) {
    let recorder = Arc::new(RequestRecorder::new());
    let manager = Arc::new(HttpManager::offline().with_recorder(recorder.clone()));
    (manager, recorder)
}

/// A service that accepts everything
fn mock_healthy_service(manager: &HttpManager) {
    manager.add_mock(HttpMethod::Post, api::TEAM_ADD, MockResponse::json(201, json!({})));
    manager.add_mock(
        HttpMethod::Post,
        api::PR_CREATE,
        MockResponse::json(201, json!({"pr": {"status": "OPEN"}})),
    );
    manager.add_mock(
        HttpMethod::Get,
        api::TEAM_GET,
        MockResponse::json(
            200,
            json!({
                "team_name": "backend-team",
                "members": [{"user_id": "user1"}, {"user_id": "user2"}, {"user_id": "user3"}]
            }),
        ),
    );
    manager.add_mock(
        HttpMethod::Get,
        api::USER_GET_REVIEW,
        MockResponse::json(200, json!({"user_id": "user1", "pull_requests": []})),
    );
    manager.add_mock(
        HttpMethod::Post,
        api::PR_MERGE,
        MockResponse::json(200, json!({"pr": {"status": "MERGED"}})),
    );
    manager.add_mock(
        HttpMethod::Post,
        api::PR_REASSIGN,
        MockResponse::json(200, json!({"pr": {"status": "OPEN"}, "replaced_by": "user2"})),
    );
    manager.add_mock(
        HttpMethod::Get,
        api::STATISTICS_GET,
        MockResponse::json(
            200,
            json!({"statistics": {"total_prs": 10, "open_prs": 7, "merged_prs": 3, "user_assignments": []}}),
        ),
    );
}

#[tokio::test(start_paused = true)]
async fn setup_builds_full_baseline() {
    let (manager, recorder) = offline();
    mock_healthy_service(&manager);
    let mut orchestrator = RunOrchestrator::new(settings(&short_config()), manager).unwrap();

    let baseline = orchestrator.setup().await.unwrap();

    assert_eq!(baseline.teams.len(), 3);
    assert_eq!(baseline.users.len(), 15);
    assert_eq!(baseline.prs.len(), 10);
    assert!(baseline.prs.iter().all(|pr| pr.status() == PrStatus::Open));
    assert_eq!(baseline.active_users.len(), 15);
    assert_eq!(orchestrator.phase(), RunPhase::SteadyState);

    let team_adds = recorder.requests_to(api::TEAM_ADD);
    assert_eq!(team_adds.len(), 3);
    assert_eq!(
        team_adds[0].body.as_ref().unwrap()["members"][0],
        json!({"user_id": "user1", "username": "Alice", "is_active": true})
    );

    let pr_creates = recorder.requests_to(api::PR_CREATE);
    assert_eq!(pr_creates.len(), 10);
    let first = pr_creates[0].body.as_ref().unwrap();
    assert_eq!(first["pull_request_name"], "Initial PR 0");
    assert!(first["pull_request_id"]
        .as_str()
        .unwrap()
        .starts_with("initial-pr-0-"));

    // Setup traffic is not part of the run metrics
    assert_eq!(orchestrator.metrics().total_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn setup_excludes_failed_team() {
    let (manager, _recorder) = offline();
    mock_healthy_service(&manager);
    manager.push_mock(
        HttpMethod::Post,
        api::TEAM_ADD,
        MockResponse::new(409, r#"{"error":{"code":"TEAM_EXISTS"}}"#),
    );
    let mut orchestrator = RunOrchestrator::new(settings(&short_config()), manager).unwrap();

    let baseline = orchestrator.setup().await.unwrap();

    assert_eq!(baseline.teams, vec!["frontend-team", "devops-team"]);
    assert_eq!(baseline.users.len(), 10);
    assert!(!baseline.users.contains(&"user1".to_string()));
    assert!(baseline
        .prs
        .iter()
        .all(|pr| baseline.users.contains(&pr.author_id)));
}

#[tokio::test(start_paused = true)]
async fn setup_requires_created_status() {
    let (manager, _recorder) = offline();
    mock_healthy_service(&manager);
    manager.add_mock(HttpMethod::Post, api::PR_CREATE, MockResponse::json(200, json!({"pr": {}})));
    let mut orchestrator = RunOrchestrator::new(settings(&short_config()), manager).unwrap();

    let baseline = orchestrator.setup().await.unwrap();

    assert_eq!(baseline.teams.len(), 3);
    assert!(baseline.prs.is_empty());
}

#[tokio::test(start_paused = true)]
async fn setup_without_users_skips_pull_requests() {
    let (manager, recorder) = offline();
    manager.add_mock(HttpMethod::Post, api::TEAM_ADD, MockResponse::new(500, "down"));
    let mut orchestrator = RunOrchestrator::new(settings(&short_config()), manager).unwrap();

    let baseline = orchestrator.setup().await.unwrap();

    assert!(baseline.teams.is_empty());
    assert!(baseline.prs.is_empty());
    assert!(recorder.requests_to(api::PR_CREATE).is_empty());
}

#[tokio::test(start_paused = true)]
async fn phases_cannot_be_skipped() {
    let (manager, _recorder) = offline();
    let mut orchestrator = RunOrchestrator::new(settings(&short_config()), manager).unwrap();
    let baseline = reviewload_core::ShadowState::new();

    let result = orchestrator.steady_state(&baseline).await;
    assert!(matches!(
        result,
        Err(RunError::Phase(PhaseError::UnexpectedPhase {
            expected: RunPhase::SteadyState,
            actual: RunPhase::Setup
        }))
    ));

    let result = orchestrator.teardown(&baseline).await;
    assert!(matches!(result, Err(RunError::Phase(_))));
    assert_eq!(orchestrator.phase(), RunPhase::Setup);
}

#[tokio::test(start_paused = true)]
async fn healthy_run_passes() {
    let (manager, recorder) = offline();
    mock_healthy_service(&manager);
    let orchestrator = RunOrchestrator::new(settings(&short_config()), manager).unwrap();

    let report = orchestrator.run().await.unwrap();

    assert!(report.passed(), "verdict: {:?}", report.verdict);
    assert_eq!(report.baseline.teams, 3);
    assert_eq!(report.baseline.prs, 10);
    assert_eq!(report.baseline.open_prs, 10);
    assert_eq!(report.engine.contexts_started, 2);
    assert_eq!(report.engine.peak_concurrency, 2);
    assert!(report.metrics.total_requests > 5);
    assert_eq!(report.metrics.failed_requests, 0);
    assert_eq!(
        report.final_statistics.as_ref().map(|s| s.total_prs.as_u64()),
        Some(Some(10))
    );

    // Every reported request plus setup, lookups and the teardown read went out
    let steady_requests = report.metrics.total_requests as usize;
    assert!(recorder.len() > steady_requests);
}

#[tokio::test(start_paused = true)]
async fn failing_statistics_fails_the_run() {
    let mut config = short_config();
    config.workload.mix = mix(&[(OperationKind::GetStatistics, 1.0)]);

    let (manager, _recorder) = offline();
    mock_healthy_service(&manager);
    manager.add_mock(HttpMethod::Get, api::STATISTICS_GET, MockResponse::new(500, "boom"));
    let orchestrator = RunOrchestrator::new(settings(&config), manager).unwrap();

    let report = orchestrator.run().await.unwrap();

    assert!(!report.passed());
    assert_eq!(report.verdict.label(), "FAIL");
    assert!(report
        .verdict
        .violations()
        .any(|check| check.metric == "failed_requests"));
    assert_eq!(report.metrics.failure_rate, 1.0);
    assert_eq!(report.metrics.successful_requests(), 0);
    let statistics = report.metrics.operation(OperationKind::GetStatistics).unwrap();
    assert_eq!(statistics.requests, report.metrics.total_requests);
    assert!(report.final_statistics.is_none());
}

#[tokio::test(start_paused = true)]
async fn cancellation_still_runs_teardown() {
    let mut config = short_config();
    config.ramp.start_concurrency = 3;
    config.ramp.stages = vec![StageConfig::new(Duration::from_secs(600), 3)];
    config.thresholds.min_requests = None;

    let (manager, recorder) = offline();
    mock_healthy_service(&manager);
    let orchestrator = RunOrchestrator::new(settings(&config), manager).unwrap();
    let cancel = orchestrator.cancellation_token();

    tokio::spawn(async move {
        // Setup takes 3s of virtual time, then a few seconds of traffic
        tokio::time::sleep(Duration::from_secs(6)).await;
        cancel.cancel();
    });

    let report = orchestrator.run().await.unwrap();

    assert!(report.engine.interrupted);
    assert!(report.engine.elapsed < Duration::from_secs(600));
    assert!(report.final_statistics.is_some());
    let statistics_reads = recorder.requests_to(api::STATISTICS_GET).len() as u64;
    let reported_reads = report
        .metrics
        .operation(OperationKind::GetStatistics)
        .unwrap()
        .requests;
    assert_eq!(statistics_reads, reported_reads + 1);
}

#[tokio::test(start_paused = true)]
async fn seeded_runs_issue_identical_operation_mix() {
    let mut counts = Vec::new();
    for _ in 0..2 {
        let (manager, _recorder) = offline();
        mock_healthy_service(&manager);
        let orchestrator = RunOrchestrator::new(settings(&short_config()), manager).unwrap();
        let report = orchestrator.run().await.unwrap();
        counts.push(
            report
                .metrics
                .operations
                .iter()
                .map(|op| (op.operation, op.requests, op.skipped))
                .collect::<Vec<_>>(),
        );
    }
    assert_eq!(counts[0], counts[1]);
}
