// ABOUTME: Composable capability traits for the cluster the engine deploys to.
// ABOUTME: Defines ManifestOps, RolloutOps, WorkloadOps, HealthOps and ClusterGateway.

mod error;
mod health;
mod manifest;
mod rollout;
mod shared_types;
mod workload;

pub use error::GatewayError;
pub use health::HealthOps;
pub use manifest::ManifestOps;
pub use rollout::RolloutOps;
pub use shared_types::*;
pub use workload::WorkloadOps;

/// Every capability a strategy may need.
///
/// Implemented automatically for any type providing all capability traits.
/// Implementations are shared across concurrent deployments and must be safe
/// for concurrent use; the engine performs no locking around them.
pub trait ClusterGateway: ManifestOps + RolloutOps + WorkloadOps + HealthOps {}

impl<T> ClusterGateway for T where T: ManifestOps + RolloutOps + WorkloadOps + HealthOps {}
