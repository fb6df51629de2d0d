// ABOUTME: Helpers shared by every strategy: validation, bounded gateway calls, waits.
// ABOUTME: Every gateway call made here is scoped by the caller's context and a deadline.

use std::future::Future;
use std::time::Duration;

use snafu::ResultExt;

use super::config::{DeploymentConfig, ResolvedConfig};
use super::error::{GatewaySnafu, StepError};
use super::state::DeploymentState;
use crate::context::DeployContext;
use crate::gateway::{
    AppliedResource, ApplyOptions, ApplyRequest, GatewayError, Revision,
};
use crate::health::{HealthReconciler, HealthVerdict, Poller};

/// Validate a config without touching the cluster.
pub(crate) fn validate(
    ctx: &DeployContext,
    config: &DeploymentConfig,
    strategy: &str,
) -> Result<ResolvedConfig, StepError> {
    ctx.check()
        .map_err(|why| StepError::interrupted("validation", Duration::ZERO, why))?;

    let resolved = config.resolve().map_err(|message| StepError::Prerequisite {
        message: format!("{message} for {strategy} deployment"),
    })?;

    tracing::debug!(
        app = %resolved.app(),
        namespace = %resolved.namespace(),
        strategy,
        "prerequisites validated"
    );
    Ok(resolved)
}

/// Run one gateway call under `scope`, naming the operation in any error.
pub(crate) async fn call<T, F>(
    scope: &DeployContext,
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, StepError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match scope.run(fut).await {
        Ok(result) => result.context(GatewaySnafu { operation }),
        Err(why) => Err(StepError::interrupted(operation, limit, why)),
    }
}

/// Apply the manifest and wait for the gateway to settle it.
pub(crate) async fn apply_manifest(
    ctx: &DeployContext,
    target: &ResolvedConfig,
) -> Result<Vec<AppliedResource>, StepError> {
    let request = ApplyRequest {
        manifest: target.manifest.clone(),
        namespace: target.namespace().clone(),
        options: ApplyOptions {
            wait: true,
            wait_timeout: target.wait_timeout,
            dry_run: target.dry_run,
            force: false,
            validate: true,
            replicas: target.replicas,
        },
    };

    tracing::info!(
        app = %target.app(),
        namespace = %target.namespace(),
        manifest = %target.manifest,
        image = %target.image,
        replicas = target.replicas,
        dry_run = target.dry_run,
        "applying manifest"
    );

    let scope = ctx.with_timeout(target.wait_timeout);
    call(
        &scope,
        target.wait_timeout,
        "apply manifest",
        target.gateway.apply_manifest(&scope, &request),
    )
    .await
}

/// Block until the workload's rollout completes.
pub(crate) async fn wait_for_rollout(
    ctx: &DeployContext,
    target: &ResolvedConfig,
) -> Result<(), StepError> {
    tracing::debug!(workload = %target.target, "waiting for rollout");
    let scope = ctx.with_timeout(target.wait_timeout);
    call(
        &scope,
        target.wait_timeout,
        "wait for rollout",
        target
            .gateway
            .wait_for_rollout(&scope, &target.target, target.wait_timeout),
    )
    .await
}

/// Rollout history, oldest first. A missing workload has no history.
pub(crate) async fn rollout_history(
    ctx: &DeployContext,
    target: &ResolvedConfig,
) -> Result<Vec<Revision>, StepError> {
    let scope = ctx.with_timeout(target.wait_timeout);
    match call(
        &scope,
        target.wait_timeout,
        "get rollout history",
        target.gateway.rollout_history(&scope, &target.target),
    )
    .await
    {
        Err(StepError::Gateway { source, .. }) if source.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}

/// The revision a rollback would restore: the one before the latest.
pub(crate) fn previous_revision(history: &[Revision]) -> Option<&Revision> {
    history.iter().rev().nth(1)
}

/// Poll health until the workload converges, then require a healthy verdict.
///
/// Records every observation on the deployment result, including a failing one.
pub(crate) async fn health_gate(
    ctx: &DeployContext,
    target: &ResolvedConfig,
    state: &mut DeploymentState,
) -> Result<HealthVerdict, StepError> {
    let verdict = verify_health(ctx, target, &mut state.last_health).await;
    if let Some(result) = &state.last_health {
        let observed = target
            .health
            .classify(result.summary.ready_pods, result.summary.total_pods);
        state.result.record_health(&observed);
    }
    verdict
}

/// Health gate without a deployment result to record on.
pub(crate) async fn verify_health(
    ctx: &DeployContext,
    target: &ResolvedConfig,
    last_health: &mut Option<crate::gateway::HealthCheckResult>,
) -> Result<HealthVerdict, StepError> {
    let reconciler = HealthReconciler::new(target.gateway.as_ref(), &target.health);
    let outcome = reconciler
        .reconcile(
            ctx,
            target.namespace(),
            &target.label_selector,
            target.wait_timeout,
        )
        .await
        .map_err(|why| StepError::interrupted("health check", target.wait_timeout, why))?;

    tracing::info!(
        app = %target.app(),
        converged = outcome.converged,
        status = %outcome.verdict.status,
        ready = outcome.verdict.ready,
        total = outcome.verdict.total,
        attempts = outcome.attempts,
        "health check completed"
    );

    *last_health = outcome.last_result.clone();

    if outcome.is_healthy() {
        Ok(outcome.verdict)
    } else {
        Err(StepError::unhealthy(
            outcome.verdict,
            outcome.converged,
            target.wait_timeout,
        ))
    }
}

/// Scale to zero, then delete. Pods drain before the workload object goes away.
pub(crate) async fn terminate(
    ctx: &DeployContext,
    target: &ResolvedConfig,
) -> Result<(), StepError> {
    let scope = ctx.with_timeout(target.wait_timeout);
    let gateway = &target.gateway;

    tracing::info!(workload = %target.target, "scaling workload to 0 replicas");
    call(
        &scope,
        target.wait_timeout,
        "scale workload",
        gateway.scale_workload(&scope, &target.target, 0),
    )
    .await?;

    tracing::info!(workload = %target.target, "deleting workload");
    call(
        &scope,
        target.wait_timeout,
        "delete workload",
        gateway.delete_workload(&scope, &target.target),
    )
    .await
}

/// Whether the workload or its pods still exist.
pub(crate) async fn workload_exists(
    ctx: &DeployContext,
    target: &ResolvedConfig,
) -> Result<bool, StepError> {
    let scope = ctx.with_timeout(target.wait_timeout);
    call(
        &scope,
        target.wait_timeout,
        "check workload",
        target.gateway.workload_exists(&scope, &target.target),
    )
    .await
}

/// Poll until the workload is observed gone.
pub(crate) async fn wait_for_absence(
    ctx: &DeployContext,
    target: &ResolvedConfig,
) -> Result<(), StepError> {
    const OPERATION: &str = "wait for termination";

    let scope = ctx.with_timeout(target.wait_timeout);
    let mut poller = Poller::new(&scope, target.health.poll_interval);

    loop {
        poller
            .tick()
            .await
            .map_err(|why| StepError::interrupted(OPERATION, target.wait_timeout, why))?;

        let exists = call(
            &scope,
            target.wait_timeout,
            OPERATION,
            target.gateway.workload_exists(&scope, &target.target),
        )
        .await?;

        if !exists {
            tracing::info!(workload = %target.target, attempts = poller.attempts(), "termination complete");
            return Ok(());
        }
    }
}

/// Create or update the workload's Service.
pub(crate) async fn ensure_service(
    ctx: &DeployContext,
    target: &ResolvedConfig,
) -> Result<(), StepError> {
    let scope = ctx.with_timeout(target.wait_timeout);
    call(
        &scope,
        target.wait_timeout,
        "ensure service",
        target.gateway.ensure_service(&scope, &target.target),
    )
    .await
}
