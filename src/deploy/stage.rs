// ABOUTME: Named pipeline stages shared by every strategy.
// ABOUTME: Stage names are part of the failure-analysis contract.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// The pipeline step active when something happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    InspectPreviousVersion,
    StateCheck,
    Termination,
    TerminationWait,
    ApplyManifest,
    Rollout,
    Creation,
    ReadinessCheck,
    HealthCheck,
    HealthValidation,
    ServiceSetup,
    Finalize,
    Rollback,
}

impl Stage {
    pub const ALL: [Stage; 14] = [
        Stage::Validation,
        Stage::InspectPreviousVersion,
        Stage::StateCheck,
        Stage::Termination,
        Stage::TerminationWait,
        Stage::ApplyManifest,
        Stage::Rollout,
        Stage::Creation,
        Stage::ReadinessCheck,
        Stage::HealthCheck,
        Stage::HealthValidation,
        Stage::ServiceSetup,
        Stage::Finalize,
        Stage::Rollback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::InspectPreviousVersion => "inspect_previous_version",
            Stage::StateCheck => "state_check",
            Stage::Termination => "termination",
            Stage::TerminationWait => "termination_wait",
            Stage::ApplyManifest => "apply_manifest",
            Stage::Rollout => "rollout",
            Stage::Creation => "creation",
            Stage::ReadinessCheck => "readiness_check",
            Stage::HealthCheck => "health_check",
            Stage::HealthValidation => "health_validation",
            Stage::ServiceSetup => "service_setup",
            Stage::Finalize => "finalize",
            Stage::Rollback => "rollback",
        }
    }

    /// Whether cluster state may have been touched by the time this stage runs.
    pub fn may_have_mutated(&self) -> bool {
        *self != Stage::Validation
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_stage_name() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>(), Ok(stage));
        }
    }

    #[test]
    fn accepts_hyphenated_names() {
        assert_eq!("apply-manifest".parse::<Stage>(), Ok(Stage::ApplyManifest));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("deploy".parse::<Stage>().is_err());
    }
}
