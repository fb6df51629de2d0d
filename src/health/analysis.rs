// ABOUTME: Post-hoc analysis of a health check result into issues and advice.
// ABOUTME: Read-only; never feeds back into the deployment decision.

use std::collections::BTreeMap;

use serde::Serialize;

use super::policy::{HealthPolicy, HealthStatus, HealthVerdict};
use crate::gateway::{HealthCheckResult, PodStatus};

/// How urgent an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Warning => "warning",
        }
    }

    /// Severity of a not-ready pod from its status reason.
    pub fn for_pod_status(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "failed" | "error" | "crashloopbackoff" => Severity::Critical,
            "pending" => Severity::Major,
            "running" => Severity::Minor,
            _ => Severity::Warning,
        }
    }

    /// Severity of a container from its restart count.
    pub fn for_restarts(count: u32) -> Self {
        match count {
            c if c > 10 => Severity::Critical,
            c if c > 5 => Severity::Major,
            c if c > 1 => Severity::Minor,
            _ => Severity::Warning,
        }
    }
}

/// What area an issue most likely belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Resource,
    Configuration,
    Stability,
    Registry,
    General,
}

impl IssueCategory {
    pub fn for_pod_status(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "pending" => IssueCategory::Resource,
            "failed" | "error" => IssueCategory::Configuration,
            "crashloopbackoff" => IssueCategory::Stability,
            "imagepullbackoff" => IssueCategory::Registry,
            _ => IssueCategory::General,
        }
    }
}

fn pod_suggestion(status: &str) -> &'static str {
    match status.to_lowercase().as_str() {
        "pending" => "Check node resources and scheduling constraints",
        "failed" | "error" => "Check container logs and configuration",
        "crashloopbackoff" => {
            "Application is crashing repeatedly - check logs and startup configuration"
        }
        "imagepullbackoff" => {
            "Cannot pull container image - check image name and registry access"
        }
        _ => "Check pod events and conditions for more details",
    }
}

fn restart_suggestion(count: u32) -> &'static str {
    if count > 10 {
        "Frequent restarts indicate a serious stability issue - investigate immediately"
    } else if count > 5 {
        "Multiple restarts detected - check for resource constraints or configuration issues"
    } else {
        "Some restarts detected - monitor for patterns and check logs"
    }
}

/// A not-ready pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodIssue {
    pub pod: String,
    pub description: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub suggestion: String,
}

/// A container that has restarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerIssue {
    pub pod: String,
    pub container: String,
    pub restarts: u32,
    pub severity: Severity,
    pub suggestion: String,
}

/// Aggregate restart behaviour across the workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartPattern {
    None,
    Minimal,
    Occasional,
    Frequent,
    Continuous,
}

impl RestartPattern {
    /// Classify from the share of pods that restarted and their average restarts.
    pub fn classify(total_restarts: u32, restarting_pods: usize, total_pods: usize) -> Self {
        if total_restarts == 0 || restarting_pods == 0 || total_pods == 0 {
            return RestartPattern::None;
        }

        let ratio = restarting_pods as f64 / total_pods as f64;
        let average = f64::from(total_restarts) / restarting_pods as f64;

        if ratio > 0.8 && average > 5.0 {
            RestartPattern::Continuous
        } else if ratio > 0.5 || average > 3.0 {
            RestartPattern::Frequent
        } else if ratio > 0.2 || average > 1.0 {
            RestartPattern::Occasional
        } else {
            RestartPattern::Minimal
        }
    }
}

/// Bucket for a single container's restart count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartReason {
    FrequentRestarts,
    ModerateRestarts,
    OccasionalRestarts,
}

impl RestartReason {
    fn for_count(count: u32) -> Self {
        if count > 10 {
            RestartReason::FrequentRestarts
        } else if count > 3 {
            RestartReason::ModerateRestarts
        } else {
            RestartReason::OccasionalRestarts
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartAnalysis {
    pub total_restarts: u32,
    pub pattern: RestartPattern,
    pub reasons: BTreeMap<RestartReason, u32>,
    /// Pods with at least one restarting container, in observation order.
    pub affected_pods: Vec<String>,
    pub recommended_action: String,
}

fn restart_recommendation(total_restarts: u32) -> &'static str {
    if total_restarts > 20 {
        "Critical: high restart count indicates serious stability issues - investigate application configuration and resource constraints"
    } else if total_restarts > 10 {
        "Warning: moderate restart activity detected - monitor application logs and resource usage"
    } else if total_restarts > 3 {
        "Info: some restart activity detected - verify application startup behavior"
    } else {
        "Minimal restart activity - application appears stable"
    }
}

/// Distribution data for an operator chasing a problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TroubleshootingContext {
    pub pods_by_phase: BTreeMap<String, u32>,
    pub pods_by_node: BTreeMap<String, u32>,
    pub total_pods: usize,
    pub total_services: usize,
    pub issues_by_category: BTreeMap<IssueCategory, u32>,
    pub issues_by_severity: BTreeMap<Severity, u32>,
}

/// Everything the validator derives from one health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub namespace: String,
    pub verdict: HealthVerdict,
    pub pod_issues: Vec<PodIssue>,
    pub container_issues: Vec<ContainerIssue>,
    pub restarts: RestartAnalysis,
    pub context: TroubleshootingContext,
    /// Ordered, without duplicates.
    pub recommendations: Vec<String>,
}

impl HealthReport {
    pub fn status(&self) -> HealthStatus {
        self.verdict.status
    }
}

/// Turns a [`HealthCheckResult`] into a [`HealthReport`].
#[derive(Debug, Clone, Default)]
pub struct HealthValidator {
    policy: HealthPolicy,
}

impl HealthValidator {
    pub fn new(policy: HealthPolicy) -> Self {
        Self { policy }
    }

    pub fn analyze(&self, result: &HealthCheckResult) -> HealthReport {
        let verdict = self.verdict(result);
        let pod_issues = pod_issues(&result.pods);
        let container_issues = container_issues(&result.pods);
        let restarts = restart_analysis(&result.pods, &container_issues);
        let context = troubleshooting_context(result, &pod_issues);
        let recommendations =
            recommendations(verdict.status, &pod_issues, &restarts, result.pods.is_empty());

        tracing::debug!(
            namespace = %result.namespace,
            status = %verdict.status,
            pod_issues = pod_issues.len(),
            container_issues = container_issues.len(),
            "health analysis complete"
        );

        HealthReport {
            namespace: result.namespace.clone(),
            verdict,
            pod_issues,
            container_issues,
            restarts,
            context,
            recommendations,
        }
    }

    fn verdict(&self, result: &HealthCheckResult) -> HealthVerdict {
        if result.pods.is_empty() {
            return self
                .policy
                .classify(result.summary.ready_pods, result.summary.total_pods);
        }
        let ready = result.pods.iter().filter(|p| p.ready).count() as u32;
        self.policy.classify(ready, result.pods.len() as u32)
    }
}

fn pod_issues(pods: &[PodStatus]) -> Vec<PodIssue> {
    pods.iter()
        .filter(|pod| !pod.ready)
        .map(|pod| PodIssue {
            pod: pod.name.clone(),
            description: format!("pod is not ready (status: {})", pod.status),
            severity: Severity::for_pod_status(&pod.status),
            category: IssueCategory::for_pod_status(&pod.status),
            suggestion: pod_suggestion(&pod.status).to_string(),
        })
        .collect()
}

fn container_issues(pods: &[PodStatus]) -> Vec<ContainerIssue> {
    pods.iter()
        .flat_map(|pod| {
            pod.containers
                .iter()
                .filter(|c| c.restart_count > 0)
                .map(move |c| ContainerIssue {
                    pod: pod.name.clone(),
                    container: c.name.clone(),
                    restarts: c.restart_count,
                    severity: Severity::for_restarts(c.restart_count),
                    suggestion: restart_suggestion(c.restart_count).to_string(),
                })
        })
        .collect()
}

fn restart_analysis(pods: &[PodStatus], issues: &[ContainerIssue]) -> RestartAnalysis {
    let total_restarts = issues.iter().map(|i| i.restarts).sum();

    let mut reasons = BTreeMap::new();
    for issue in issues {
        *reasons.entry(RestartReason::for_count(issue.restarts)).or_insert(0) += 1;
    }

    let mut affected_pods: Vec<String> = Vec::new();
    for issue in issues {
        if !affected_pods.contains(&issue.pod) {
            affected_pods.push(issue.pod.clone());
        }
    }

    RestartAnalysis {
        total_restarts,
        pattern: RestartPattern::classify(total_restarts, affected_pods.len(), pods.len()),
        reasons,
        affected_pods,
        recommended_action: restart_recommendation(total_restarts).to_string(),
    }
}

fn troubleshooting_context(
    result: &HealthCheckResult,
    pod_issues: &[PodIssue],
) -> TroubleshootingContext {
    let mut context = TroubleshootingContext {
        total_pods: result.pods.len(),
        total_services: result.services.len(),
        ..TroubleshootingContext::default()
    };

    for pod in &result.pods {
        *context.pods_by_phase.entry(pod.phase.clone()).or_insert(0) += 1;
        if let Some(node) = pod.node.as_deref().filter(|n| !n.is_empty()) {
            *context.pods_by_node.entry(node.to_string()).or_insert(0) += 1;
        }
    }

    for issue in pod_issues {
        *context.issues_by_category.entry(issue.category).or_insert(0) += 1;
        *context.issues_by_severity.entry(issue.severity).or_insert(0) += 1;
    }

    context
}

fn recommendations(
    status: HealthStatus,
    pod_issues: &[PodIssue],
    restarts: &RestartAnalysis,
    no_pods: bool,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |line: String| {
        if !out.contains(&line) {
            out.push(line);
        }
    };

    let (headline, next) = match status {
        HealthStatus::Healthy => (
            "Application is healthy and all pods are ready",
            "Consider setting up monitoring and alerting for continued health",
        ),
        HealthStatus::Degraded => (
            "Application is partially healthy - some pods are not ready",
            "Investigate non-ready pods and their logs",
        ),
        HealthStatus::Unhealthy => (
            "Application is unhealthy - significant issues detected",
            "Immediate attention required - check pod logs and events",
        ),
        HealthStatus::Unknown => (
            "Unable to determine application health",
            "Verify deployment exists and label selector is correct",
        ),
    };
    push(headline.to_string());
    push(next.to_string());

    for issue in pod_issues {
        push(format!("{}: {}", issue.pod, issue.suggestion));
    }

    if restarts.total_restarts > 0 {
        push(restarts.recommended_action.clone());
    }

    if no_pods {
        push("No pods found - check if application is deployed".to_string());
        push("Verify namespace and label selector are correct".to_string());
    }

    out
}
