// ABOUTME: Application health probing for cluster gateways.
// ABOUTME: Reports pod readiness for a label selector in one namespace.

use async_trait::async_trait;

use super::error::GatewayError;
use super::shared_types::{HealthCheckResult, HealthQuery};
use crate::context::DeployContext;

/// Health probing.
#[async_trait]
pub trait HealthOps: Send + Sync {
    /// Inspect pods and services matching the query.
    async fn check_application_health(
        &self,
        ctx: &DeployContext,
        query: &HealthQuery,
    ) -> Result<HealthCheckResult, GatewayError>;
}
