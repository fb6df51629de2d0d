// ABOUTME: Health classification, polling reconciliation and post-hoc analysis.
// ABOUTME: Thresholds live in HealthPolicy; nothing here mutates cluster state.

mod analysis;
mod poll;
mod policy;
mod reconciler;

pub use analysis::{
    ContainerIssue, HealthReport, HealthValidator, IssueCategory, PodIssue, RestartAnalysis,
    RestartPattern, RestartReason, Severity, TroubleshootingContext,
};
pub use poll::Poller;
pub use policy::{
    DEFAULT_DEGRADED_RATIO, DEFAULT_HEALTHY_RATIO, DEFAULT_POLL_INTERVAL, HealthPolicy,
    HealthStatus, HealthVerdict, classify,
};
pub use reconciler::{HealthReconciler, ReconcileOutcome};
