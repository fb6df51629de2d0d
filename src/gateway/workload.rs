// ABOUTME: Workload lifecycle operations used by replace-style strategies.
// ABOUTME: Scale, delete, existence checks and service setup.

use async_trait::async_trait;

use super::error::GatewayError;
use super::shared_types::WorkloadRef;
use crate::context::DeployContext;

/// Workload lifecycle operations.
#[async_trait]
pub trait WorkloadOps: Send + Sync {
    /// Set the workload's replica count.
    async fn scale_workload(
        &self,
        ctx: &DeployContext,
        target: &WorkloadRef,
        replicas: u32,
    ) -> Result<(), GatewayError>;

    /// Delete the workload. Pods terminate asynchronously.
    async fn delete_workload(
        &self,
        ctx: &DeployContext,
        target: &WorkloadRef,
    ) -> Result<(), GatewayError>;

    /// Whether the workload or any of its pods still exist.
    async fn workload_exists(
        &self,
        ctx: &DeployContext,
        target: &WorkloadRef,
    ) -> Result<bool, GatewayError>;

    /// Create or update the Service fronting the workload.
    async fn ensure_service(
        &self,
        ctx: &DeployContext,
        target: &WorkloadRef,
    ) -> Result<(), GatewayError>;
}
