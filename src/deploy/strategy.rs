// ABOUTME: Deployment strategy contract and selection by name.
// ABOUTME: Rolling and recreate are implemented; blue-green and canary are reserved.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::base;
use super::config::{DeploymentConfig, ResolvedConfig};
use super::error::{DeployError, StepError};
use super::recreate::Recreate;
use super::result::{DeploymentResult, RollbackReport};
use super::rolling::RollingUpdate;
use crate::context::DeployContext;

/// A way of moving a workload from its current state to the desired one.
///
/// Each call runs its steps strictly in order on the caller's task. The engine
/// holds no lock: callers serialize deployments of the same application.
/// Cancelling `ctx` stops the active step; already-applied cluster changes are
/// left in place.
#[async_trait]
pub trait DeployStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Check and default the config. No side effects.
    async fn validate_prerequisites(
        &self,
        ctx: &DeployContext,
        config: &DeploymentConfig,
    ) -> Result<ResolvedConfig, StepError> {
        base::validate(ctx, config, self.name())
    }

    async fn deploy(
        &self,
        ctx: &DeployContext,
        config: &DeploymentConfig,
    ) -> Result<DeploymentResult, DeployError>;

    async fn rollback(
        &self,
        ctx: &DeployContext,
        config: &DeploymentConfig,
    ) -> Result<RollbackReport, DeployError>;
}

/// Strategy names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Gradually replace pods using the cluster's native rolling update.
    #[default]
    Rolling,
    /// Terminate the existing workload, then create the new one.
    Recreate,
    /// Reserved.
    BlueGreen,
    /// Reserved.
    Canary,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Rolling => "rolling",
            StrategyKind::Recreate => "recreate",
            StrategyKind::BlueGreen => "blue-green",
            StrategyKind::Canary => "canary",
        }
    }

    /// Whether the name is reserved without an implementation behind it.
    pub fn is_reserved(&self) -> bool {
        matches!(self, StrategyKind::BlueGreen | StrategyKind::Canary)
    }

    pub fn build(&self) -> Result<Box<dyn DeployStrategy>, UnsupportedStrategy> {
        match self {
            StrategyKind::Rolling => Ok(Box::new(RollingUpdate)),
            StrategyKind::Recreate => Ok(Box::new(Recreate)),
            StrategyKind::BlueGreen | StrategyKind::Canary => {
                Err(UnsupportedStrategy(self.as_str().to_string()))
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = UnsupportedStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rolling" | "rolling-update" => Ok(StrategyKind::Rolling),
            "recreate" => Ok(StrategyKind::Recreate),
            "blue-green" | "bluegreen" => Ok(StrategyKind::BlueGreen),
            "canary" => Ok(StrategyKind::Canary),
            _ => Err(UnsupportedStrategy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported deployment strategy: {0}")]
pub struct UnsupportedStrategy(pub String);
