// ABOUTME: Polls application health until it converges, times out, or is cancelled.
// ABOUTME: Exits on the first successful check; never outlives its deadline.

use std::time::Duration;

use tokio::time::Instant;

use super::poll::Poller;
use super::policy::{HealthPolicy, HealthVerdict};
use crate::context::{DeployContext, Interrupted};
use crate::gateway::{GatewayError, HealthCheckResult, HealthOps, HealthQuery};
use crate::types::Namespace;

/// What a reconciliation observed.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// The gateway reported success before the deadline.
    pub converged: bool,
    /// Classification of the last observation; unknown if nothing was observed.
    pub verdict: HealthVerdict,
    pub last_result: Option<HealthCheckResult>,
    pub last_error: Option<GatewayError>,
    pub attempts: u32,
    pub elapsed: Duration,
}

impl ReconcileOutcome {
    /// Converged and classified healthy.
    pub fn is_healthy(&self) -> bool {
        self.converged && self.verdict.is_healthy()
    }
}

/// Drives health polling against a gateway.
pub struct HealthReconciler<'a, G: HealthOps + ?Sized> {
    gateway: &'a G,
    policy: &'a HealthPolicy,
}

impl<'a, G: HealthOps + ?Sized> HealthReconciler<'a, G> {
    pub fn new(gateway: &'a G, policy: &'a HealthPolicy) -> Self {
        Self { gateway, policy }
    }

    /// Poll until the gateway reports success or `timeout` elapses.
    ///
    /// Deadline expiry is a normal, non-converged outcome. Cancellation is an
    /// error and issues no further health call.
    pub async fn reconcile(
        &self,
        ctx: &DeployContext,
        namespace: &Namespace,
        label_selector: &str,
        timeout: Duration,
    ) -> Result<ReconcileOutcome, Interrupted> {
        let scope = ctx.with_timeout(timeout);
        let started = Instant::now();
        let mut poller = Poller::new(&scope, self.policy.poll_interval);

        let mut last_result: Option<HealthCheckResult> = None;
        let mut last_error: Option<GatewayError> = None;

        loop {
            let attempt = match poller.tick().await {
                Ok(attempt) => attempt,
                Err(Interrupted::Cancelled) => return Err(Interrupted::Cancelled),
                Err(Interrupted::DeadlineExceeded) => break,
            };

            let query = HealthQuery {
                namespace: namespace.clone(),
                label_selector: label_selector.to_string(),
                timeout: scope.remaining().unwrap_or(timeout),
            };

            match scope
                .run(self.gateway.check_application_health(&scope, &query))
                .await
            {
                Ok(Ok(result)) => {
                    let verdict = self
                        .policy
                        .classify(result.summary.ready_pods, result.summary.total_pods);
                    tracing::debug!(
                        attempt,
                        namespace = %namespace,
                        ready = result.summary.ready_pods,
                        total = result.summary.total_pods,
                        status = %verdict.status,
                        "health poll"
                    );

                    if result.success {
                        return Ok(ReconcileOutcome {
                            converged: true,
                            verdict,
                            last_result: Some(result),
                            last_error,
                            attempts: attempt,
                            elapsed: started.elapsed(),
                        });
                    }
                    last_result = Some(result);
                }
                Ok(Err(err)) => {
                    tracing::warn!(attempt, namespace = %namespace, error = %err, "health check failed; continuing to poll");
                    last_error = Some(err);
                }
                Err(Interrupted::Cancelled) => return Err(Interrupted::Cancelled),
                Err(Interrupted::DeadlineExceeded) => break,
            }
        }

        let verdict = last_result
            .as_ref()
            .map(|r| self.policy.classify(r.summary.ready_pods, r.summary.total_pods))
            .unwrap_or_else(HealthVerdict::unknown);

        tracing::warn!(
            namespace = %namespace,
            attempts = poller.attempts(),
            timeout = ?timeout,
            "health did not converge before the deadline"
        );

        Ok(ReconcileOutcome {
            converged: false,
            verdict,
            last_result,
            last_error,
            attempts: poller.attempts(),
            elapsed: started.elapsed(),
        })
    }
}
