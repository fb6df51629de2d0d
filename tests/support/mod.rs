// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup and a scriptable in-memory cluster gateway.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use deckhand::context::DeployContext;
use deckhand::deploy::DeploymentConfig;
use deckhand::gateway::{
    AppliedResource, ApplyAction, ApplyRequest, ContainerStatus, GatewayError,
    HealthCheckResult, HealthOps, HealthQuery, HealthSummary, ManifestOps, ManifestSource,
    PodStatus, Revision, RolloutOps, WorkloadOps, WorkloadRef,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("deckhand=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Gateway operations observed by [`FakeCluster`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Apply { namespace: String, dry_run: bool },
    WaitForRollout,
    History,
    Rollback,
    Scale(u32),
    Delete,
    Exists,
    EnsureService,
    Health { selector: String },
}

/// Scripted responses. Queues keep returning their last entry once drained to one.
struct Script {
    apply: Result<Vec<AppliedResource>, GatewayError>,
    rollout: Result<(), GatewayError>,
    rollout_delay: Option<Duration>,
    history: Result<Vec<Revision>, GatewayError>,
    rollback: Result<(), GatewayError>,
    scale: Result<(), GatewayError>,
    delete: Result<(), GatewayError>,
    service: Result<(), GatewayError>,
    exists: VecDeque<Result<bool, GatewayError>>,
    health: VecDeque<Result<HealthCheckResult, GatewayError>>,
}

/// In-memory cluster gateway with a call log.
pub struct FakeCluster {
    calls: Mutex<Vec<Call>>,
    requests: Mutex<Vec<ApplyRequest>>,
    script: Mutex<Script>,
}

#[allow(dead_code)]
impl FakeCluster {
    /// A cluster where every call succeeds and health is 3/3 ready.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(Script {
                apply: Ok(vec![applied("Deployment", "web", ApplyAction::Configured)]),
                rollout: Ok(()),
                rollout_delay: None,
                history: Ok(Vec::new()),
                rollback: Ok(()),
                scale: Ok(()),
                delete: Ok(()),
                service: Ok(()),
                exists: VecDeque::from([Ok(false)]),
                health: VecDeque::from([Ok(health(3, 3))]),
            }),
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn with_apply(self, result: Result<Vec<AppliedResource>, GatewayError>) -> Self {
        self.script.lock().apply = result;
        self
    }

    pub fn with_rollout(self, result: Result<(), GatewayError>) -> Self {
        self.script.lock().rollout = result;
        self
    }

    /// Make `wait_for_rollout` take this long before answering.
    pub fn with_rollout_delay(self, delay: Duration) -> Self {
        self.script.lock().rollout_delay = Some(delay);
        self
    }

    pub fn with_history(self, result: Result<Vec<Revision>, GatewayError>) -> Self {
        self.script.lock().history = result;
        self
    }

    /// History with revisions numbered `1..=count`.
    pub fn with_revisions(self, count: u64) -> Self {
        self.with_history(Ok((1..=count).map(Revision::new).collect()))
    }

    pub fn with_rollback(self, result: Result<(), GatewayError>) -> Self {
        self.script.lock().rollback = result;
        self
    }

    pub fn with_delete(self, result: Result<(), GatewayError>) -> Self {
        self.script.lock().delete = result;
        self
    }

    pub fn with_service(self, result: Result<(), GatewayError>) -> Self {
        self.script.lock().service = result;
        self
    }

    pub fn with_exists<I>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = Result<bool, GatewayError>>,
    {
        self.script.lock().exists = answers.into_iter().collect();
        self
    }

    pub fn with_health<I>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = Result<HealthCheckResult, GatewayError>>,
    {
        self.script.lock().health = answers.into_iter().collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    /// Every apply request received, in order.
    pub fn apply_requests(&self) -> Vec<ApplyRequest> {
        self.requests.lock().clone()
    }

    pub fn health_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Health { .. }))
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

fn next<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[async_trait]
impl ManifestOps for FakeCluster {
    async fn apply_manifest(
        &self,
        _ctx: &DeployContext,
        request: &ApplyRequest,
    ) -> Result<Vec<AppliedResource>, GatewayError> {
        self.record(Call::Apply {
            namespace: request.namespace.to_string(),
            dry_run: request.options.dry_run,
        });
        self.requests.lock().push(request.clone());
        self.script.lock().apply.clone()
    }
}

#[async_trait]
impl RolloutOps for FakeCluster {
    async fn wait_for_rollout(
        &self,
        _ctx: &DeployContext,
        _target: &WorkloadRef,
        _timeout: Duration,
    ) -> Result<(), GatewayError> {
        self.record(Call::WaitForRollout);
        let (delay, result) = {
            let script = self.script.lock();
            (script.rollout_delay, script.rollout.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn rollout_history(
        &self,
        _ctx: &DeployContext,
        _target: &WorkloadRef,
    ) -> Result<Vec<Revision>, GatewayError> {
        self.record(Call::History);
        self.script.lock().history.clone()
    }

    async fn rollback_workload(
        &self,
        _ctx: &DeployContext,
        _target: &WorkloadRef,
    ) -> Result<(), GatewayError> {
        self.record(Call::Rollback);
        self.script.lock().rollback.clone()
    }
}

#[async_trait]
impl WorkloadOps for FakeCluster {
    async fn scale_workload(
        &self,
        _ctx: &DeployContext,
        _target: &WorkloadRef,
        replicas: u32,
    ) -> Result<(), GatewayError> {
        self.record(Call::Scale(replicas));
        self.script.lock().scale.clone()
    }

    async fn delete_workload(
        &self,
        _ctx: &DeployContext,
        _target: &WorkloadRef,
    ) -> Result<(), GatewayError> {
        self.record(Call::Delete);
        self.script.lock().delete.clone()
    }

    async fn workload_exists(
        &self,
        _ctx: &DeployContext,
        _target: &WorkloadRef,
    ) -> Result<bool, GatewayError> {
        self.record(Call::Exists);
        next(&mut self.script.lock().exists).unwrap_or(Ok(false))
    }

    async fn ensure_service(
        &self,
        _ctx: &DeployContext,
        _target: &WorkloadRef,
    ) -> Result<(), GatewayError> {
        self.record(Call::EnsureService);
        self.script.lock().service.clone()
    }
}

#[async_trait]
impl HealthOps for FakeCluster {
    async fn check_application_health(
        &self,
        _ctx: &DeployContext,
        query: &HealthQuery,
    ) -> Result<HealthCheckResult, GatewayError> {
        self.record(Call::Health {
            selector: query.label_selector.clone(),
        });
        next(&mut self.script.lock().health)
            .unwrap_or_else(|| Err(GatewayError::Api("no health scripted".to_string())))
    }
}

/// A health check result; success when every pod is ready.
#[allow(dead_code)]
pub fn health(ready: u32, total: u32) -> HealthCheckResult {
    let pods = (0..total)
        .map(|i| PodStatus {
            name: format!("web-{i}"),
            ready: i < ready,
            status: if i < ready { "Running" } else { "Pending" }.to_string(),
            phase: if i < ready { "Running" } else { "Pending" }.to_string(),
            node: Some("node-a".to_string()),
            restarts: 0,
            containers: vec![ContainerStatus {
                name: "web".to_string(),
                ready: i < ready,
                restart_count: 0,
                state: "running".to_string(),
            }],
        })
        .collect();

    HealthCheckResult {
        success: total > 0 && ready == total,
        namespace: "default".to_string(),
        duration: Duration::from_millis(20),
        summary: HealthSummary {
            ready_pods: ready,
            total_pods: total,
            healthy_ratio: if total == 0 {
                0.0
            } else {
                f64::from(ready) / f64::from(total)
            },
        },
        pods,
        services: Vec::new(),
        error: None,
    }
}

#[allow(dead_code)]
pub fn applied(kind: &str, name: &str, action: ApplyAction) -> AppliedResource {
    AppliedResource {
        kind: kind.to_string(),
        name: name.to_string(),
        namespace: "default".to_string(),
        action,
    }
}

/// A deployment of `web` against `cluster`, with a short wait timeout.
#[allow(dead_code)]
pub fn web_config(cluster: &Arc<FakeCluster>) -> DeploymentConfig {
    DeploymentConfig::new(
        "web",
        "registry.example.com/web:1.4.2",
        ManifestSource::Path(PathBuf::from("k8s/web.yaml")),
    )
    .with_gateway(cluster.clone())
    .with_wait_timeout(Duration::from_secs(30))
}
