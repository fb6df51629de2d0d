// ABOUTME: Shared types used across cluster gateway trait definitions.
// ABOUTME: Apply requests, workload references, rollout revisions and health results.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AppName, Namespace};

/// Where the manifest to apply comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// A rendered manifest file on disk.
    Path(PathBuf),
    /// Rendered manifest content held in memory.
    Inline(String),
}

impl std::fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestSource::Path(path) => write!(f, "{}", path.display()),
            ManifestSource::Inline(content) => write!(f, "<inline manifest, {} bytes>", content.len()),
        }
    }
}

/// Options for applying a manifest.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Block until the gateway considers the apply settled.
    pub wait: bool,
    /// Upper bound for `wait`.
    pub wait_timeout: Duration,
    /// Validate server-side without persisting.
    pub dry_run: bool,
    /// Replace conflicting objects.
    pub force: bool,
    /// Schema-validate before applying.
    pub validate: bool,
    /// Desired replica count for the workload.
    pub replicas: u32,
}

/// A manifest apply request.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub manifest: ManifestSource,
    pub namespace: Namespace,
    pub options: ApplyOptions,
}

/// What the gateway did with one object during apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyAction {
    Created,
    Configured,
    Unchanged,
}

/// One object touched by an apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedResource {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub action: ApplyAction,
}

/// Kind of workload a rollout operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkloadKind {
    #[default]
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "deployment",
            WorkloadKind::StatefulSet => "statefulset",
            WorkloadKind::DaemonSet => "daemonset",
        }
    }
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addresses one workload: resource type, name and namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRef {
    pub kind: WorkloadKind,
    pub name: AppName,
    pub namespace: Namespace,
}

impl WorkloadRef {
    pub fn deployment(name: AppName, namespace: Namespace) -> Self {
        Self {
            kind: WorkloadKind::Deployment,
            name,
            namespace,
        }
    }
}

impl std::fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} in {}", self.kind, self.name, self.namespace)
    }
}

/// A historical rollout revision, oldest first in history listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub number: u64,
    pub change_cause: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Revision {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            change_cause: None,
            created_at: None,
        }
    }

    /// Identifier recorded as a deployment's previous version.
    pub fn label(&self) -> String {
        format!("revision-{}", self.number)
    }
}

/// Parameters for a single application health check.
#[derive(Debug, Clone)]
pub struct HealthQuery {
    pub namespace: Namespace,
    pub label_selector: String,
    pub timeout: Duration,
}

/// Aggregate pod readiness reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub ready_pods: u32,
    pub total_pods: u32,
    #[serde(default)]
    pub healthy_ratio: f64,
}

/// Per-container status inside a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub restart_count: u32,
    #[serde(default)]
    pub state: String,
}

/// Per-pod status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStatus {
    pub name: String,
    #[serde(default)]
    pub ready: bool,
    /// Reason-level status such as `Running` or `CrashLoopBackOff`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub restarts: u32,
    #[serde(default)]
    pub containers: Vec<ContainerStatus>,
}

/// Per-service status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub cluster_ip: Option<String>,
}

/// Result of one application health check. Read-only to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub success: bool,
    pub namespace: String,
    #[serde(default, with = "humantime_serde")]
    pub duration: Duration,
    pub summary: HealthSummary,
    #[serde(default)]
    pub pods: Vec<PodStatus>,
    #[serde(default)]
    pub services: Vec<ServiceStatus>,
    #[serde(default)]
    pub error: Option<String>,
}
