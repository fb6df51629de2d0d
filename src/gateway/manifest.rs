// ABOUTME: Manifest apply operations for cluster gateways.
// ABOUTME: Applies rendered manifests and reports the objects touched.

use async_trait::async_trait;

use super::error::GatewayError;
use super::shared_types::{AppliedResource, ApplyRequest};
use crate::context::DeployContext;

/// Manifest operations.
#[async_trait]
pub trait ManifestOps: Send + Sync {
    /// Apply a rendered manifest and return every object it created or changed.
    async fn apply_manifest(
        &self,
        ctx: &DeployContext,
        request: &ApplyRequest,
    ) -> Result<Vec<AppliedResource>, GatewayError>;
}
