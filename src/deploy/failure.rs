// ABOUTME: Maps step failures to reason codes, remediation advice and retry/rollback flags.
// ABOUTME: Structured errors classify directly; anything else falls back to message text.

use nonempty::NonEmpty;
use serde::Serialize;

use super::error::StepError;
use super::stage::Stage;
use crate::gateway::GatewayError;

/// Coarse failure category. The string forms are a stable contract for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    ClusterConnectionFailed,
    InsufficientPermissions,
    NamespaceNotFound,
    ImagePullFailed,
    DeploymentTimeout,
    ResourceQuotaExceeded,
    DeploymentFailed,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::ClusterConnectionFailed => "cluster_connection_failed",
            ReasonCode::InsufficientPermissions => "insufficient_permissions",
            ReasonCode::NamespaceNotFound => "namespace_not_found",
            ReasonCode::ImagePullFailed => "image_pull_failed",
            ReasonCode::DeploymentTimeout => "deployment_timeout",
            ReasonCode::ResourceQuotaExceeded => "resource_quota_exceeded",
            ReasonCode::DeploymentFailed => "deployment_failed",
        }
    }

    /// Classify free-form error text. Checks run in a fixed order; first match wins.
    pub fn from_message(message: &str) -> Self {
        let text = message.to_lowercase();
        let has = |needle: &str| text.contains(needle);

        if has("connection refused") || has("unable to connect") {
            ReasonCode::ClusterConnectionFailed
        } else if has("unauthorized") || has("forbidden") {
            ReasonCode::InsufficientPermissions
        } else if has("not found") && has("namespace") {
            ReasonCode::NamespaceNotFound
        } else if has("image") && (has("pull") || has("not found")) {
            ReasonCode::ImagePullFailed
        } else if has("timeout") {
            ReasonCode::DeploymentTimeout
        } else if has("quota") || has("limit") {
            ReasonCode::ResourceQuotaExceeded
        } else {
            ReasonCode::DeploymentFailed
        }
    }

    fn from_gateway(err: &GatewayError) -> Self {
        match err {
            GatewayError::Connection(_) => ReasonCode::ClusterConnectionFailed,
            GatewayError::Unauthorized(_) | GatewayError::Forbidden(_) => {
                ReasonCode::InsufficientPermissions
            }
            GatewayError::NotFound { kind, .. } if kind.eq_ignore_ascii_case("namespace") => {
                ReasonCode::NamespaceNotFound
            }
            GatewayError::Timeout(_) => ReasonCode::DeploymentTimeout,
            GatewayError::QuotaExceeded(_) => ReasonCode::ResourceQuotaExceeded,
            other => ReasonCode::from_message(&other.to_string()),
        }
    }

    /// Classify a step error, preferring its structure over its text.
    pub fn for_step_error(err: &StepError) -> Self {
        match err {
            StepError::Cancelled { .. } | StepError::TimedOut { .. } => {
                ReasonCode::DeploymentTimeout
            }
            StepError::Unhealthy {
                converged: false, ..
            } => ReasonCode::DeploymentTimeout,
            StepError::Unhealthy { converged: true, .. } => ReasonCode::DeploymentFailed,
            StepError::Gateway { source, .. } => ReasonCode::from_gateway(source),
            StepError::NoPreviousVersion | StepError::RollbackUnsupported { .. } => {
                ReasonCode::DeploymentFailed
            }
            StepError::Prerequisite { message } => ReasonCode::from_message(message),
        }
    }

    /// Remediation advice, most specific first.
    pub fn suggestions(&self) -> NonEmpty<String> {
        let lines: [&str; 4] = match self {
            ReasonCode::ClusterConnectionFailed => [
                "Check if the cluster is running and accessible",
                "Verify the cluster client configuration and current context",
                "Check network connectivity to the cluster",
                "Ensure cluster certificates are valid and not expired",
            ],
            ReasonCode::InsufficientPermissions => [
                "Check RBAC permissions for the service account",
                "Verify authentication credentials",
                "Ensure proper ClusterRole/Role bindings are configured",
                "Check if the namespace exists and is accessible",
            ],
            ReasonCode::NamespaceNotFound => [
                "Create the target namespace before deployment",
                "Verify the namespace name is correct",
                "Check if you have permissions to access the namespace",
                "List available namespaces to confirm the target exists",
            ],
            ReasonCode::ImagePullFailed => [
                "Verify the image reference is correct and accessible",
                "Check image registry authentication",
                "Ensure the image exists in the specified registry",
                "Verify network connectivity to the image registry",
            ],
            ReasonCode::DeploymentTimeout => [
                "Increase the wait timeout duration",
                "Check if resources are sufficient for the deployment",
                "Verify pod startup time and resource requirements",
                "Check for any blocking conditions in the cluster",
            ],
            ReasonCode::ResourceQuotaExceeded => [
                "Check resource quotas in the namespace",
                "Reduce resource requests/limits in the manifest",
                "Scale down other applications to free up resources",
                "Request quota increase from cluster administrator",
            ],
            ReasonCode::DeploymentFailed => [
                "Check the deployment manifest for syntax errors",
                "Verify all required fields are specified",
                "Review cluster events for additional context",
                "Check pod logs for application-specific errors",
            ],
        };
        let [first, rest @ ..] = lines;
        NonEmpty::from((
            first.to_string(),
            rest.iter().map(|s| s.to_string()).collect(),
        ))
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a caller needs to decide what to do about a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureAnalysis {
    pub stage: Stage,
    pub reason: ReasonCode,
    pub message: String,
    pub suggestions: NonEmpty<String>,
    pub can_retry: bool,
    pub can_rollback: bool,
}

impl FailureAnalysis {
    /// Build the analysis for a failed step.
    pub fn for_step(stage: Stage, err: &StepError) -> Self {
        let reason = ReasonCode::for_step_error(err);
        let mut analysis = Self::build(stage, reason, err.to_string());
        if err.is_structural() {
            analysis.can_retry = false;
        }
        if matches!(
            err,
            StepError::NoPreviousVersion | StepError::RollbackUnsupported { .. }
        ) {
            analysis.can_rollback = false;
        }
        analysis
    }

    /// Build the analysis for raw error text, as produced by an external collaborator.
    pub fn from_message(stage: Stage, message: &str) -> Self {
        Self::build(stage, ReasonCode::from_message(message), message.to_string())
    }

    fn build(stage: Stage, reason: ReasonCode, message: String) -> Self {
        Self {
            stage,
            reason,
            message,
            suggestions: reason.suggestions(),
            can_retry: can_retry(reason),
            can_rollback: can_rollback(stage, reason),
        }
    }

    /// Append strategy-specific advice after the generic suggestions.
    pub fn with_extra_suggestions<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in extra {
            let line = line.into();
            if !self.suggestions.iter().any(|s| *s == line) {
                self.suggestions.push(line);
            }
        }
        self
    }
}

/// Rollback needs a reachable cluster, an existing namespace and something to roll back.
pub fn can_rollback(stage: Stage, reason: ReasonCode) -> bool {
    stage.may_have_mutated()
        && !matches!(
            reason,
            ReasonCode::ClusterConnectionFailed | ReasonCode::NamespaceNotFound
        )
}

/// A missing namespace stays missing until someone creates it.
pub fn can_retry(reason: ReasonCode) -> bool {
    reason != ReasonCode::NamespaceNotFound
}
