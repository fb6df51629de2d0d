// ABOUTME: Rollout operations for cluster gateways.
// ABOUTME: Wait for rollouts, read revision history, undo to the previous revision.

use std::time::Duration;

use async_trait::async_trait;

use super::error::GatewayError;
use super::shared_types::{Revision, WorkloadRef};
use crate::context::DeployContext;

/// Rollout lifecycle operations.
#[async_trait]
pub trait RolloutOps: Send + Sync {
    /// Block until the workload's rollout completes or `timeout` elapses.
    async fn wait_for_rollout(
        &self,
        ctx: &DeployContext,
        target: &WorkloadRef,
        timeout: Duration,
    ) -> Result<(), GatewayError>;

    /// Revision history, oldest first.
    async fn rollout_history(
        &self,
        ctx: &DeployContext,
        target: &WorkloadRef,
    ) -> Result<Vec<Revision>, GatewayError>;

    /// Undo the workload to its previous revision.
    async fn rollback_workload(
        &self,
        ctx: &DeployContext,
        target: &WorkloadRef,
    ) -> Result<(), GatewayError>;
}
