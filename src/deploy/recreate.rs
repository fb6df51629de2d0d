// ABOUTME: Recreate strategy: terminate the existing workload, then create the replacement.
// ABOUTME: Waits for observed termination so two instances never run side by side.

use async_trait::async_trait;

use super::base;
use super::config::{DeploymentConfig, ResolvedConfig};
use super::error::{DeployError, StepError};
use super::pipeline::{Pipeline, StepFailure, StepSpec};
use super::result::{DeployedResource, DeploymentResult, ResourceStatus, RollbackReport};
use super::stage::Stage;
use super::state::{DeploymentState, rollback_failure};
use super::strategy::DeployStrategy;
use crate::context::DeployContext;
use crate::diagnostics::Warning;
use crate::gateway::Revision;

pub(crate) static RECREATE_STEPS: [StepSpec; 8] = [
    StepSpec::new(Stage::Validation, 0.1, "Initializing recreate deployment"),
    StepSpec::new(Stage::StateCheck, 0.2, "Checking current deployment state"),
    StepSpec::new(Stage::Termination, 0.3, "Terminating existing deployment"),
    StepSpec::new(Stage::TerminationWait, 0.4, "Waiting for termination to complete"),
    StepSpec::new(Stage::Creation, 0.5, "Creating new deployment"),
    StepSpec::new(Stage::ReadinessCheck, 0.7, "Waiting for new deployment to be ready"),
    StepSpec::new(Stage::HealthValidation, 0.9, "Validating deployment health"),
    StepSpec::new(Stage::ServiceSetup, 0.95, "Ensuring service"),
];

const RECREATE_SUGGESTIONS: [&str; 4] = [
    "Check if the previous deployment was cleanly terminated",
    "Verify that no resources are stuck in terminating state",
    "Ensure sufficient cluster resources for the new deployment",
    "Consider using rolling update strategy for zero-downtime deployments",
];

/// Recreate: accept downtime in exchange for never running old and new together.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recreate;

impl Recreate {
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
            "starting recreate deployment"
        );

        let current_version = pipeline
            .step(Stage::StateCheck, async {
                let exists = base::workload_exists(ctx, &target).await?;
                state.previous_exists = exists;
                if !exists {
                    return Ok(None);
                }
                let version = match base::rollout_history(ctx, &target).await {
                    Ok(history) => history.last().map(Revision::label),
                    Err(err @ StepError::Cancelled { .. }) => return Err(err),
                    Err(err) => {
                        tracing::debug!(error = %err, "current revision unavailable");
                        None
                    }
                };
                Ok::<_, StepError>(version)
            })
            .await?;

        tracing::info!(
            exists = state.previous_exists,
            current_version = ?current_version,
            "current deployment state determined"
        );
        state.result.previous_version = current_version;

        if state.previous_exists && target.dry_run {
            tracing::info!(app = %target.app(), "dry run; leaving the existing deployment in place");
            pipeline.skip(Stage::Termination);
            pipeline.skip(Stage::TerminationWait);
        } else if state.previous_exists {
            pipeline
                .step(Stage::Termination, base::terminate(ctx, &target))
                .await?;
            state.result.resources.push(DeployedResource::new(
                "Deployment",
                target.app().as_str(),
                target.namespace().as_str(),
                ResourceStatus::Terminated,
            ));
            pipeline
                .step(Stage::TerminationWait, base::wait_for_absence(ctx, &target))
                .await?;
        } else {
            pipeline.skip(Stage::Termination);
            pipeline.skip(Stage::TerminationWait);
        }

        let applied = pipeline
            .step(Stage::Creation, base::apply_manifest(ctx, &target))
            .await?;
        if applied.is_empty() {
            state.result.resources.push(DeployedResource::new(
                "Deployment",
                target.app().as_str(),
                target.namespace().as_str(),
                ResourceStatus::Created,
            ));
        } else {
            state
                .result
                .resources
                .extend(applied.into_iter().map(DeployedResource::from));
        }

        if target.dry_run {
            tracing::info!(app = %target.app(), "dry run; skipping readiness, health and service");
            pipeline.skip(Stage::ReadinessCheck);
            pipeline.skip(Stage::HealthValidation);
            pipeline.skip(Stage::ServiceSetup);
        } else {
            pipeline
                .step(Stage::ReadinessCheck, base::wait_for_rollout(ctx, &target))
                .await?;
            pipeline
                .step(Stage::HealthValidation, base::health_gate(ctx, &target, state))
                .await?;

            let service_ready = pipeline
                .step(Stage::ServiceSetup, async {
                    match base::ensure_service(ctx, &target).await {
                        Ok(()) => Ok(true),
                        Err(err @ StepError::Cancelled { .. }) => Err(err),
                        Err(err) => {
                            state.diagnostics.warn(Warning::service_setup(format!(
                                "service creation/update failed, continuing: {err}"
                            )));
                            Ok(false)
                        }
                    }
                })
                .await?;
            if service_ready {
                state.result.resources.push(DeployedResource::new(
                    "Service",
                    target.app().as_str(),
                    target.namespace().as_str(),
                    ResourceStatus::Created,
                ));
            }
        }

        state.result.rollback_available = false;
        pipeline.report(1.0, "Recreate deployment completed successfully");
        Ok(target)
    }
}

#[async_trait]
impl DeployStrategy for Recreate {
    fn name(&self) -> &'static str {
        "recreate"
    }

    fn description(&self) -> &'static str {
        "Recreate deployment that terminates all existing instances before creating new ones, with brief downtime"
    }

    async fn deploy(
        &self,
        ctx: &DeployContext,
        config: &DeploymentConfig,
    ) -> Result<DeploymentResult, DeployError> {
        let mut state = DeploymentState::begin(self.name());
        let mut pipeline = Pipeline::new(&RECREATE_STEPS, config.progress.as_deref());

        let outcome = self.run(ctx, config, &mut pipeline, &mut state).await;
        let steps = pipeline.into_records();

        match outcome {
            Ok(target) => Ok(state.succeed(steps, &target.health)),
            Err(failure) => Err(state.fail(steps, failure, &RECREATE_SUGGESTIONS, &config.health)),
        }
    }

    /// Previous revisions are not retained, so there is nothing to restore.
    async fn rollback(
        &self,
        _ctx: &DeployContext,
        config: &DeploymentConfig,
    ) -> Result<RollbackReport, DeployError> {
        tracing::warn!(
            app = %config.app_name,
            "rollback requested for recreate deployment"
        );
        Err(rollback_failure(StepFailure {
            stage: Stage::Rollback,
            error: StepError::RollbackUnsupported {
                strategy: self.name(),
            },
        }))
    }
}
