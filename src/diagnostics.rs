// ABOUTME: Non-fatal warnings raised while a deployment runs.
// ABOUTME: Each warning names the stage that tolerated it; all are drained into the result.

use crate::deploy::Stage;

/// Warnings a step chose to tolerate instead of failing the deployment.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning and log it at the stage that raised it.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(stage = %warning.stage(), kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Render every warning as `stage: message`, leaving the accumulator empty.
    pub fn drain_messages(&mut self) -> Vec<String> {
        self.warnings
            .drain(..)
            .map(|w| format!("{}: {}", w.stage(), w.message))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Rollout history could not be read; rollback availability is unknown.
    pub fn previous_version(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PreviousVersionLookup,
            message: message.into(),
        }
    }

    /// The Service fronting the workload could not be created or updated.
    pub fn service_setup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ServiceSetup,
            message: message.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.kind.stage()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    PreviousVersionLookup,
    ServiceSetup,
}

impl WarningKind {
    pub fn stage(self) -> Stage {
        match self {
            WarningKind::PreviousVersionLookup => Stage::InspectPreviousVersion,
            WarningKind::ServiceSetup => Stage::ServiceSetup,
        }
    }
}
