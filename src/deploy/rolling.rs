// ABOUTME: Rolling update strategy built on the cluster's native rollout.
// ABOUTME: Never deletes the prior instance; adds validation and health gating around it.

use async_trait::async_trait;
use tokio::time::Instant;

use super::base;
use super::config::{DeploymentConfig, ResolvedConfig};
use super::error::{DeployError, StepError};
use super::pipeline::{Pipeline, StepFailure, StepSpec};
use super::result::{DeployedResource, DeploymentResult, RollbackReport};
use super::stage::Stage;
use super::state::{DeploymentState, rollback_failure};
use super::strategy::DeployStrategy;
use crate::context::DeployContext;
use crate::diagnostics::Warning;

pub(crate) static ROLLING_STEPS: [StepSpec; 6] = [
    StepSpec::new(Stage::Validation, 0.1, "Initializing rolling update"),
    StepSpec::new(Stage::InspectPreviousVersion, 0.2, "Checking existing deployment"),
    StepSpec::new(Stage::ApplyManifest, 0.4, "Applying manifest updates"),
    StepSpec::new(Stage::Rollout, 0.6, "Waiting for rollout completion"),
    StepSpec::new(Stage::HealthCheck, 0.8, "Performing health checks"),
    StepSpec::new(Stage::Finalize, 1.0, "Rolling update completed successfully"),
];

static ROLLBACK_STEPS: [StepSpec; 4] = [
    StepSpec::new(Stage::Validation, 0.1, "Preparing rollback"),
    StepSpec::new(Stage::Rollback, 0.3, "Rolling back to previous revision"),
    StepSpec::new(Stage::Rollout, 0.6, "Waiting for rollback rollout"),
    StepSpec::new(Stage::HealthCheck, 0.9, "Verifying health after rollback"),
];

/// Rolling update: apply the new manifest and let the cluster replace pods gradually.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollingUpdate;

impl RollingUpdate {
    async fn run(
        &self,
        ctx: &DeployContext,
        config: &DeploymentConfig,
        pipeline: &mut Pipeline<'_>,
        state: &mut DeploymentState,
    ) -> Result<ResolvedConfig, StepFailure> {
        let target = pipeline
            .step(Stage::Validation, self.validate_prerequisites(ctx, config))
            .await?;

        tracing::info!(
            app = %target.app(),
            namespace = %target.namespace(),
            image = %target.image,
            "starting rolling update"
        );

        pipeline
            .step(Stage::InspectPreviousVersion, async {
                match base::rollout_history(ctx, &target).await {
                    Ok(history) => {
                        state.previous_exists = !history.is_empty();
                        if let Some(previous) = base::previous_revision(&history) {
                            state.result.previous_version = Some(previous.label());
                            state.result.rollback_available = true;
                        }
                        Ok(())
                    }
                    Err(err @ StepError::Cancelled { .. }) => Err(err),
                    Err(err) => {
                        state.diagnostics.warn(Warning::previous_version(format!(
                            "could not retrieve previous version information: {err}"
                        )));
                        Ok(())
                    }
                }
            })
            .await?;

        let applied = pipeline
            .step(Stage::ApplyManifest, base::apply_manifest(ctx, &target))
            .await?;
        state
            .result
            .resources
            .extend(applied.into_iter().map(DeployedResource::from));

        if target.dry_run {
            tracing::info!(app = %target.app(), "dry run; skipping rollout and health checks");
            pipeline.skip(Stage::Rollout);
            pipeline.skip(Stage::HealthCheck);
        } else {
            pipeline
                .step(Stage::Rollout, base::wait_for_rollout(ctx, &target))
                .await?;
            pipeline
                .step(Stage::HealthCheck, base::health_gate(ctx, &target, state))
                .await?;
        }

        pipeline.mark(Stage::Finalize);
        Ok(target)
    }
}

#[async_trait]
impl DeployStrategy for RollingUpdate {
    fn name(&self) -> &'static str {
        "rolling"
    }

    fn description(&self) -> &'static str {
        "Rolling update deployment that gradually replaces old instances with new ones, ensuring zero downtime"
    }

    async fn deploy(
        &self,
        ctx: &DeployContext,
        config: &DeploymentConfig,
    ) -> Result<DeploymentResult, DeployError> {
        let mut state = DeploymentState::begin(self.name());
        let mut pipeline = Pipeline::new(&ROLLING_STEPS, config.progress.as_deref());

        let outcome = self.run(ctx, config, &mut pipeline, &mut state).await;
        let steps = pipeline.into_records();

        match outcome {
            Ok(target) => Ok(state.succeed(steps, &target.health)),
            Err(failure) => Err(state.fail(steps, failure, &[], &config.health)),
        }
    }

    async fn rollback(
        &self,
        ctx: &DeployContext,
        config: &DeploymentConfig,
    ) -> Result<RollbackReport, DeployError> {
        let started = Instant::now();
        let mut pipeline = Pipeline::new(&ROLLBACK_STEPS, config.progress.as_deref());

        let target = pipeline
            .step(Stage::Validation, self.validate_prerequisites(ctx, config))
            .await
            .map_err(rollback_failure)?;

        let restored_version = pipeline
            .step(Stage::Rollback, async {
                let history = base::rollout_history(ctx, &target).await?;
                let previous = base::previous_revision(&history)
                    .ok_or(StepError::NoPreviousVersion)?
                    .label();

                tracing::info!(
                    app = %target.app(),
                    previous_version = %previous,
                    "rolling back to previous version"
                );

                let scope = ctx.with_timeout(target.wait_timeout);
                base::call(
                    &scope,
                    target.wait_timeout,
                    "rollback",
                    target.gateway.rollback_workload(&scope, &target.target),
                )
                .await?;
                Ok::<_, StepError>(previous)
            })
            .await
            .map_err(rollback_failure)?;

        pipeline
            .step(Stage::Rollout, base::wait_for_rollout(ctx, &target))
            .await
            .map_err(rollback_failure)?;

        let mut last_health = None;
        let verdict = pipeline
            .step(
                Stage::HealthCheck,
                base::verify_health(ctx, &target, &mut last_health),
            )
            .await
            .map_err(rollback_failure)?;

        tracing::info!(
            app = %target.app(),
            restored_version = %restored_version,
            status = %verdict.status,
            ready = verdict.ready,
            total = verdict.total,
            "rollback completed"
        );

        Ok(RollbackReport {
            strategy: self.name(),
            restored_version,
            verdict,
            duration: started.elapsed(),
        })
    }
}
