// ABOUTME: Strategy-driven deployment engine: config, pipeline, strategies and failure analysis.
// ABOUTME: Exports the DeployStrategy contract, the built-in strategies and result types.

mod base;
mod config;
mod error;
mod failure;
mod pipeline;
mod recreate;
mod result;
mod rolling;
mod stage;
mod state;
mod strategy;

pub use config::{DEFAULT_REPLICAS, DEFAULT_WAIT_TIMEOUT, DeploymentConfig, ResolvedConfig};
pub use error::{DeployError, StepError};
pub use failure::{FailureAnalysis, ReasonCode, can_retry, can_rollback};
pub use pipeline::{Pipeline, StepFailure, StepSpec};
pub use recreate::Recreate;
pub use result::{
    DeployedResource, DeploymentResult, ResourceStatus, RollbackReport, StepOutcome, StepRecord,
};
pub use rolling::RollingUpdate;
pub use stage::{Stage, UnknownStage};
pub use strategy::{DeployStrategy, StrategyKind, UnsupportedStrategy};
