// ABOUTME: Configuration types and parsing for deckhand.yml.
// ABOUTME: Handles YAML parsing, validation, destination merging and engine bridging.

mod deserialize;
mod init;

pub use init::init_config;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::deploy::{DEFAULT_WAIT_TIMEOUT, DeploymentConfig, StrategyKind, UnsupportedStrategy};
use crate::error::{Error, Result};
use crate::gateway::{ClusterGateway, ManifestSource};
use crate::health::HealthPolicy;
use crate::types::{AppName, ImageRef, Namespace};
use deserialize::{deserialize_app_name, deserialize_image_ref, deserialize_namespace_option};

pub const CONFIG_FILENAME: &str = "deckhand.yml";
pub const CONFIG_FILENAME_ALT: &str = "deckhand.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".deckhand/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_app_name")]
    pub app: AppName,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub image: ImageRef,

    /// Rendered manifest to apply, relative to the working directory.
    pub manifest: PathBuf,

    #[serde(default, deserialize_with = "deserialize_namespace_option")]
    pub namespace: Option<Namespace>,

    #[serde(default)]
    pub replicas: Option<u32>,

    #[serde(default)]
    pub strategy: StrategyKind,

    #[serde(default = "default_wait_timeout", with = "humantime_serde")]
    pub wait_timeout: Duration,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub health: HealthPolicy,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default, deserialize_with = "deserialize_namespace_option")]
    pub namespace: Option<Namespace>,

    #[serde(default)]
    pub replicas: Option<u32>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub manifest: Option<PathBuf>,

    #[serde(default)]
    pub strategy: Option<StrategyKind>,

    #[serde(default, with = "humantime_serde")]
    pub wait_timeout: Option<Duration>,

    #[serde(default)]
    pub health: Option<HealthPolicy>,
}

fn default_wait_timeout() -> Duration {
    DEFAULT_WAIT_TIMEOUT
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if dest.namespace.is_some() {
            merged.namespace = dest.namespace.clone();
        }

        if dest.replicas.is_some() {
            merged.replicas = dest.replicas;
        }

        if let Some(ref image) = dest.image {
            merged.image = ImageRef::parse(image)
                .map_err(|e| Error::InvalidConfig(format!("destination {name}: {e}")))?;
        }

        if let Some(ref manifest) = dest.manifest {
            merged.manifest = manifest.clone();
        }

        if let Some(strategy) = dest.strategy {
            merged.strategy = strategy;
        }

        if let Some(timeout) = dest.wait_timeout {
            merged.wait_timeout = timeout;
        }

        if let Some(ref health) = dest.health {
            merged.health = health.clone();
        }

        Ok(merged)
    }

    /// Reject settings the engine would refuse at deploy time.
    pub fn validate(&self) -> Result<()> {
        if self.strategy.is_reserved() {
            return Err(UnsupportedStrategy(self.strategy.to_string()).into());
        }
        if self.replicas == Some(0) {
            return Err(Error::InvalidConfig(
                "replicas must be at least 1".to_string(),
            ));
        }
        if self.wait_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "wait_timeout must be greater than zero".to_string(),
            ));
        }
        if self.manifest.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("manifest path is required".to_string()));
        }
        self.health.validate().map_err(Error::InvalidConfig)
    }

    /// Namespace the deployment targets.
    pub fn namespace(&self) -> Namespace {
        self.namespace.clone().unwrap_or_default()
    }

    /// Build the engine input for this config against a cluster gateway.
    pub fn to_deployment_config(&self, gateway: Arc<dyn ClusterGateway>) -> DeploymentConfig {
        let mut config = DeploymentConfig::new(
            self.app.as_str(),
            self.image.to_string(),
            ManifestSource::Path(self.manifest.clone()),
        )
        .with_gateway(gateway)
        .with_wait_timeout(self.wait_timeout)
        .with_dry_run(self.dry_run)
        .with_health_policy(self.health.clone());

        if let Some(ref namespace) = self.namespace {
            config = config.with_namespace(namespace.as_str());
        }
        if let Some(replicas) = self.replicas {
            config = config.with_replicas(replicas);
        }
        config
    }

    pub fn template() -> Self {
        Config {
            app: AppName::new("my-app").unwrap(),
            image: ImageRef::parse("my-registry/my-app:latest").unwrap(),
            manifest: PathBuf::from("k8s/deployment.yaml"),
            namespace: None,
            replicas: None,
            strategy: StrategyKind::default(),
            wait_timeout: default_wait_timeout(),
            dry_run: false,
            health: HealthPolicy::default(),
            destinations: HashMap::new(),
        }
    }
}
