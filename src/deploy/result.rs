// ABOUTME: Structured output of a deployment and of a rollback.
// ABOUTME: Built up while steps run, then finalized once on return.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::failure::FailureAnalysis;
use super::stage::Stage;
use crate::gateway::{AppliedResource, ApplyAction};
use crate::health::{HealthReport, HealthStatus, HealthVerdict};

/// What happened to a resource during a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Created,
    Updated,
    Terminated,
}

/// One resource touched by a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedResource {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub status: ResourceStatus,
}

impl DeployedResource {
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        status: ResourceStatus,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.into(),
            status,
        }
    }
}

impl From<AppliedResource> for DeployedResource {
    fn from(applied: AppliedResource) -> Self {
        let status = match applied.action {
            ApplyAction::Created => ResourceStatus::Created,
            ApplyAction::Configured | ApplyAction::Unchanged => ResourceStatus::Updated,
        };
        Self {
            kind: applied.kind,
            name: applied.name,
            namespace: applied.namespace,
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Completed,
    Skipped,
}

/// A pipeline step and how it ended. Failed steps are not recorded here;
/// the failure analysis names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub stage: Stage,
    pub outcome: StepOutcome,
}

/// Output of one deployment.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentResult {
    pub strategy: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(with = "humantime_serde")]
    pub duration: Option<Duration>,
    pub success: bool,
    pub resources: Vec<DeployedResource>,
    /// Set only once a health check has run.
    pub health_status: Option<HealthStatus>,
    pub ready_replicas: Option<u32>,
    pub total_replicas: Option<u32>,
    pub previous_version: Option<String>,
    pub rollback_available: bool,
    pub failure_analysis: Option<FailureAnalysis>,
    pub health_report: Option<HealthReport>,
    pub steps: Vec<StepRecord>,
    pub warnings: Vec<String>,
}

impl DeploymentResult {
    pub(crate) fn begin(strategy: &'static str) -> Self {
        Self {
            strategy,
            started_at: Utc::now(),
            finished_at: None,
            duration: None,
            success: false,
            resources: Vec::new(),
            health_status: None,
            ready_replicas: None,
            total_replicas: None,
            previous_version: None,
            rollback_available: false,
            failure_analysis: None,
            health_report: None,
            steps: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn record_health(&mut self, verdict: &HealthVerdict) {
        self.health_status = Some(verdict.status);
        self.ready_replicas = Some(verdict.ready);
        self.total_replicas = Some(verdict.total);
    }

    /// Stages that ran to completion, in order.
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Completed)
            .map(|s| s.stage)
            .collect()
    }

    pub fn skipped_stages(&self) -> Vec<Stage> {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Skipped)
            .map(|s| s.stage)
            .collect()
    }
}

/// Output of a successful rollback.
#[derive(Debug, Clone, Serialize)]
pub struct RollbackReport {
    pub strategy: &'static str,
    /// Revision the workload was rolled back to, e.g. `revision-3`.
    pub restored_version: String,
    pub verdict: HealthVerdict,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}
