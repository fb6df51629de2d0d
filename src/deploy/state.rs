// ABOUTME: Per-deployment mutable accumulator owned by the running strategy.
// ABOUTME: Finalizes into a successful DeploymentResult or a DeployError.

use tokio::time::Instant;

use chrono::Utc;

use super::error::DeployError;
use super::failure::FailureAnalysis;
use super::pipeline::StepFailure;
use super::result::{DeploymentResult, StepRecord};
use crate::diagnostics::Diagnostics;
use crate::gateway::HealthCheckResult;
use crate::health::{HealthPolicy, HealthValidator};

/// State for one `deploy` call. Never shared between deployments.
#[derive(Debug)]
pub(crate) struct DeploymentState {
    pub result: DeploymentResult,
    pub previous_exists: bool,
    pub last_health: Option<HealthCheckResult>,
    pub diagnostics: Diagnostics,
    started: Instant,
}

impl DeploymentState {
    pub fn begin(strategy: &'static str) -> Self {
        Self {
            result: DeploymentResult::begin(strategy),
            previous_exists: false,
            last_health: None,
            diagnostics: Diagnostics::default(),
            started: Instant::now(),
        }
    }

    fn finish(&mut self, steps: Vec<StepRecord>, policy: &HealthPolicy) {
        self.result.finished_at = Some(Utc::now());
        self.result.duration = Some(self.started.elapsed());
        self.result.steps = steps;
        self.result.warnings = self.diagnostics.drain_messages();
        if let Some(health) = &self.last_health {
            self.result.health_report = Some(HealthValidator::new(policy.clone()).analyze(health));
        }
    }

    pub fn succeed(mut self, steps: Vec<StepRecord>, policy: &HealthPolicy) -> DeploymentResult {
        self.finish(steps, policy);
        self.result.success = true;

        tracing::info!(
            strategy = self.result.strategy,
            duration = ?self.result.duration,
            ready = ?self.result.ready_replicas,
            total = ?self.result.total_replicas,
            "deployment completed"
        );
        self.result
    }

    pub fn fail(
        mut self,
        steps: Vec<StepRecord>,
        failure: StepFailure,
        extra_suggestions: &[&str],
        policy: &HealthPolicy,
    ) -> DeployError {
        self.finish(steps, policy);
        self.result.success = false;

        let analysis = FailureAnalysis::for_step(failure.stage, &failure.error)
            .with_extra_suggestions(extra_suggestions.iter().copied());
        self.result.failure_analysis = Some(analysis.clone());

        tracing::error!(
            strategy = self.result.strategy,
            stage = %failure.stage,
            reason = %analysis.reason,
            duration = ?self.result.duration,
            "deployment failed"
        );

        DeployError::Deployment {
            source: failure.error,
            analysis,
            result: Box::new(self.result),
        }
    }
}

/// Analysis for a failed rollback.
pub(crate) fn rollback_failure(failure: StepFailure) -> DeployError {
    let analysis = FailureAnalysis::for_step(failure.stage, &failure.error);
    tracing::error!(stage = %failure.stage, reason = %analysis.reason, "rollback failed");
    DeployError::Rollback {
        source: failure.error,
        analysis,
    }
}
