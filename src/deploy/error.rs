// ABOUTME: Step-level errors (SNAFU context selectors) and the caller-facing DeployError.
// ABOUTME: DeployError always carries a failure analysis; deployments also carry the result.

use std::time::Duration;

use snafu::Snafu;

use super::failure::{FailureAnalysis, ReasonCode};
use super::result::DeploymentResult;
use super::stage::Stage;
use crate::context::Interrupted;
use crate::gateway::GatewayError;
use crate::health::HealthVerdict;

/// Why a single pipeline step failed.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StepError {
    /// Missing or invalid input; nothing was touched.
    #[snafu(display("{message}"))]
    Prerequisite { message: String },

    #[snafu(display("{operation} failed: {source}"))]
    Gateway {
        operation: &'static str,
        source: GatewayError,
    },

    #[snafu(display("{operation} cancelled"))]
    Cancelled { operation: &'static str },

    #[snafu(display("{operation} timeout after {}s", limit.as_secs()))]
    TimedOut {
        operation: &'static str,
        limit: Duration,
    },

    /// The health gate did not see a healthy workload.
    #[snafu(display("{detail}"))]
    Unhealthy {
        detail: String,
        verdict: HealthVerdict,
        converged: bool,
    },

    #[snafu(display("no previous version available for rollback"))]
    NoPreviousVersion,

    #[snafu(display("rollback not supported for {strategy} strategy"))]
    RollbackUnsupported { strategy: &'static str },
}

impl StepError {
    pub(crate) fn interrupted(operation: &'static str, limit: Duration, why: Interrupted) -> Self {
        match why {
            Interrupted::Cancelled => StepError::Cancelled { operation },
            Interrupted::DeadlineExceeded => StepError::TimedOut { operation, limit },
        }
    }

    pub(crate) fn unhealthy(verdict: HealthVerdict, converged: bool, limit: Duration) -> Self {
        let detail = if converged {
            format!(
                "deployment is not healthy: {} ({}/{} pods ready)",
                verdict.status, verdict.ready, verdict.total
            )
        } else {
            format!(
                "deployment did not become healthy within timeout of {}s: {} ({}/{} pods ready)",
                limit.as_secs(),
                verdict.status,
                verdict.ready,
                verdict.total
            )
        };
        StepError::Unhealthy {
            detail,
            verdict,
            converged,
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            StepError::Prerequisite { .. }
                | StepError::NoPreviousVersion
                | StepError::RollbackUnsupported { .. }
        )
    }

    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            StepError::Gateway { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A failed deployment or rollback.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("{} deployment failed during {}: {source}", .result.strategy, .analysis.stage)]
    Deployment {
        source: StepError,
        analysis: FailureAnalysis,
        result: Box<DeploymentResult>,
    },

    #[error("rollback failed during {}: {source}", .analysis.stage)]
    Rollback {
        source: StepError,
        analysis: FailureAnalysis,
    },
}

impl DeployError {
    /// Reason code for programmatic handling.
    pub fn kind(&self) -> ReasonCode {
        self.analysis().reason
    }

    pub fn analysis(&self) -> &FailureAnalysis {
        match self {
            DeployError::Deployment { analysis, .. } | DeployError::Rollback { analysis, .. } => {
                analysis
            }
        }
    }

    pub fn stage(&self) -> Stage {
        self.analysis().stage
    }

    /// The finalized result of a failed deployment.
    pub fn result(&self) -> Option<&DeploymentResult> {
        match self {
            DeployError::Deployment { result, .. } => Some(result),
            DeployError::Rollback { .. } => None,
        }
    }

    pub fn into_result(self) -> Option<DeploymentResult> {
        match self {
            DeployError::Deployment { result, .. } => Some(*result),
            DeployError::Rollback { .. } => None,
        }
    }

    pub fn step_error(&self) -> &StepError {
        match self {
            DeployError::Deployment { source, .. } | DeployError::Rollback { source, .. } => source,
        }
    }

    pub fn can_retry(&self) -> bool {
        self.analysis().can_retry
    }

    pub fn can_rollback(&self) -> bool {
        self.analysis().can_rollback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_out_mentions_timeout() {
        let err = StepError::interrupted(
            "wait for rollout",
            Duration::from_secs(30),
            Interrupted::DeadlineExceeded,
        );
        assert_eq!(err.to_string(), "wait for rollout timeout after 30s");
    }

    #[test]
    fn gateway_errors_keep_their_message() {
        let err = StepError::Gateway {
            operation: "apply manifest",
            source: GatewayError::Api("boom".to_string()),
        };
        assert_eq!(err.to_string(), "apply manifest failed: boom");
        assert!(err.gateway_error().is_some());
    }

    #[test]
    fn structural_errors() {
        assert!(StepError::NoPreviousVersion.is_structural());
        assert!(
            !StepError::Cancelled {
                operation: "health check"
            }
            .is_structural()
        );
    }
}
