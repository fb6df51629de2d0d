// ABOUTME: Integration tests for the recreate strategy.
// ABOUTME: Covers termination ordering, service setup warnings and unsupported rollback.

mod support;

use std::sync::Arc;

use deckhand::context::DeployContext;
use deckhand::deploy::{
    DeployStrategy, ReasonCode, Recreate, ResourceStatus, Stage, StepError,
};
use deckhand::gateway::GatewayError;
use deckhand::health::HealthStatus;
use deckhand::progress::RecordingReporter;
use support::{Call, FakeCluster, init_tracing, web_config};

fn resources(result: &deckhand::deploy::DeploymentResult) -> Vec<(&str, ResourceStatus)> {
    result
        .resources
        .iter()
        .map(|r| (r.kind.as_str(), r.status))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn replaces_existing_workload_after_termination() {
    init_tracing();
    let cluster = FakeCluster::new()
        .with_exists([Ok(true), Ok(true), Ok(false)])
        .with_revisions(2)
        .shared();

    let result = Recreate
        .deploy(&DeployContext::new(), &web_config(&cluster))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.strategy, "recreate");
    assert_eq!(
        cluster.calls(),
        vec![
            Call::Exists,
            Call::History,
            Call::Scale(0),
            Call::Delete,
            Call::Exists,
            Call::Exists,
            Call::Apply {
                namespace: "default".to_string(),
                dry_run: false
            },
            Call::WaitForRollout,
            Call::Health {
                selector: "app=web".to_string()
            },
            Call::EnsureService,
        ]
    );
    assert_eq!(result.previous_version.as_deref(), Some("revision-2"));
    assert!(!result.rollback_available);
    assert_eq!(
        resources(&result),
        vec![
            ("Deployment", ResourceStatus::Terminated),
            ("Deployment", ResourceStatus::Updated),
            ("Service", ResourceStatus::Created),
        ]
    );
    assert_eq!(result.health_status, Some(HealthStatus::Healthy));
}

#[tokio::test]
async fn fresh_install_skips_termination() {
    let cluster = FakeCluster::new().shared();

    let result = Recreate
        .deploy(&DeployContext::new(), &web_config(&cluster))
        .await
        .unwrap();

    assert_eq!(
        result.skipped_stages(),
        vec![Stage::Termination, Stage::TerminationWait]
    );
    assert_eq!(result.previous_version, None);
    assert_eq!(cluster.count(|c| matches!(c, Call::Scale(_))), 0);
    assert_eq!(cluster.count(|c| *c == Call::Delete), 0);
    assert_eq!(cluster.count(|c| *c == Call::History), 0);
}

#[tokio::test]
async fn progress_skips_unplanned_termination() {
    let cluster = FakeCluster::new().shared();
    let recorder = Arc::new(RecordingReporter::new());
    let config = web_config(&cluster).with_progress(recorder.clone());

    Recreate
        .deploy(&DeployContext::new(), &config)
        .await
        .unwrap();

    let progress: Vec<f64> = recorder.events().iter().map(|e| e.progress).collect();
    assert_eq!(progress, vec![0.1, 0.2, 0.5, 0.7, 0.9, 0.95, 1.0]);
    assert_eq!(
        recorder.descriptions().last().map(String::as_str),
        Some("Recreate deployment completed successfully")
    );
}

#[tokio::test]
async fn service_failure_is_a_warning() {
    let cluster = FakeCluster::new()
        .with_service(Err(GatewayError::Api("service port conflict".to_string())))
        .shared();

    let result = Recreate
        .deploy(&DeployContext::new(), &web_config(&cluster))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("service port conflict"));
    assert_eq!(resources(&result), vec![("Deployment", ResourceStatus::Updated)]);
}

#[tokio::test]
async fn empty_apply_output_still_lists_the_deployment() {
    let cluster = FakeCluster::new().with_apply(Ok(Vec::new())).shared();

    let result = Recreate
        .deploy(&DeployContext::new(), &web_config(&cluster))
        .await
        .unwrap();

    assert_eq!(
        resources(&result),
        vec![
            ("Deployment", ResourceStatus::Created),
            ("Service", ResourceStatus::Created),
        ]
    );
}

#[tokio::test]
async fn termination_failure_adds_recreate_advice() {
    let cluster = FakeCluster::new()
        .with_exists([Ok(true)])
        .with_revisions(5)
        .with_delete(Err(GatewayError::Api("finalizer stuck".to_string())))
        .shared();

    let err = Recreate
        .deploy(&DeployContext::new(), &web_config(&cluster))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Termination);
    assert_eq!(err.kind(), ReasonCode::DeploymentFailed);

    let suggestions: Vec<&String> = err.analysis().suggestions.iter().collect();
    assert_eq!(suggestions.len(), 8);
    assert_eq!(
        suggestions.last().map(|s| s.as_str()),
        Some("Consider using rolling update strategy for zero-downtime deployments")
    );

    let result = err.result().unwrap();
    assert_eq!(result.previous_version.as_deref(), Some("revision-5"));
    assert!(result.resources.is_empty());
    assert_eq!(cluster.count(|c| matches!(c, Call::Apply { .. })), 0);
}

#[tokio::test(start_paused = true)]
async fn termination_that_never_finishes_times_out() {
    let cluster = FakeCluster::new().with_exists([Ok(true)]).shared();

    let err = Recreate
        .deploy(&DeployContext::new(), &web_config(&cluster))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::TerminationWait);
    assert_eq!(err.kind(), ReasonCode::DeploymentTimeout);
    assert_eq!(
        err.step_error().to_string(),
        "wait for termination timeout after 30s"
    );
    assert_eq!(cluster.count(|c| matches!(c, Call::Apply { .. })), 0);
}

#[tokio::test]
async fn dry_run_stops_after_creation() {
    let cluster = FakeCluster::new().shared();
    let config = web_config(&cluster).with_dry_run(true);

    let result = Recreate
        .deploy(&DeployContext::new(), &config)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(
        result.skipped_stages(),
        vec![
            Stage::Termination,
            Stage::TerminationWait,
            Stage::ReadinessCheck,
            Stage::HealthValidation,
            Stage::ServiceSetup,
        ]
    );
    assert_eq!(cluster.health_calls(), 0);
    assert_eq!(cluster.count(|c| *c == Call::EnsureService), 0);
}

#[tokio::test]
async fn dry_run_leaves_existing_workload_running() {
    let cluster = FakeCluster::new()
        .with_exists([Ok(true), Ok(false)])
        .with_revisions(2)
        .shared();
    let config = web_config(&cluster).with_dry_run(true);

    let result = Recreate
        .deploy(&DeployContext::new(), &config)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(
        cluster.calls(),
        vec![
            Call::Exists,
            Call::History,
            Call::Apply {
                namespace: "default".to_string(),
                dry_run: true
            },
        ]
    );
    assert_eq!(cluster.count(|c| matches!(c, Call::Scale(_))), 0);
    assert_eq!(cluster.count(|c| *c == Call::Delete), 0);
    assert_eq!(result.previous_version.as_deref(), Some("revision-2"));
    assert!(
        !resources(&result)
            .iter()
            .any(|(_, status)| *status == ResourceStatus::Terminated)
    );
    assert_eq!(
        result.skipped_stages(),
        vec![
            Stage::Termination,
            Stage::TerminationWait,
            Stage::ReadinessCheck,
            Stage::HealthValidation,
            Stage::ServiceSetup,
        ]
    );
}

#[tokio::test]
async fn rollback_is_unsupported() {
    let cluster = FakeCluster::new().with_revisions(3).shared();

    let err = Recreate
        .rollback(&DeployContext::new(), &web_config(&cluster))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Rollback);
    assert!(matches!(
        err.step_error(),
        StepError::RollbackUnsupported {
            strategy: "recreate"
        }
    ));
    assert_eq!(
        err.step_error().to_string(),
        "rollback not supported for recreate strategy"
    );
    assert!(!err.can_retry());
    assert!(!err.can_rollback());
    assert!(cluster.calls().is_empty());
}
