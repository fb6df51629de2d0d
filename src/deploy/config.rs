// ABOUTME: Input to one deployment and its validated, defaulted form.
// ABOUTME: Defaults are applied once during validation; the input is never mutated.

use std::sync::Arc;
use std::time::Duration;

use crate::gateway::{ClusterGateway, ManifestSource, WorkloadRef};
use crate::health::HealthPolicy;
use crate::progress::ProgressReporter;
use crate::types::{AppName, ImageRef, Namespace};

/// Wait timeout used when the caller leaves it at zero.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Replica count used when the caller leaves it unset.
pub const DEFAULT_REPLICAS: u32 = 1;

/// Everything a strategy needs to run one deployment.
#[derive(Clone)]
pub struct DeploymentConfig {
    pub app_name: String,
    pub namespace: Option<String>,
    pub manifest: ManifestSource,
    pub image: String,
    pub replicas: Option<u32>,
    /// Zero means [`DEFAULT_WAIT_TIMEOUT`].
    pub wait_timeout: Duration,
    pub dry_run: bool,
    pub gateway: Option<Arc<dyn ClusterGateway>>,
    pub progress: Option<Arc<dyn ProgressReporter>>,
    pub health: HealthPolicy,
}

impl std::fmt::Debug for DeploymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentConfig")
            .field("app_name", &self.app_name)
            .field("namespace", &self.namespace)
            .field("manifest", &self.manifest)
            .field("image", &self.image)
            .field("replicas", &self.replicas)
            .field("wait_timeout", &self.wait_timeout)
            .field("dry_run", &self.dry_run)
            .field("gateway", &self.gateway.is_some())
            .field("progress", &self.progress.is_some())
            .field("health", &self.health)
            .finish()
    }
}

impl DeploymentConfig {
    pub fn new(
        app_name: impl Into<String>,
        image: impl Into<String>,
        manifest: ManifestSource,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            namespace: None,
            manifest,
            image: image.into(),
            replicas: None,
            wait_timeout: Duration::ZERO,
            dry_run: false,
            gateway: None,
            progress: None,
            health: HealthPolicy::default(),
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn ClusterGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.replicas = Some(replicas);
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_health_policy(mut self, policy: HealthPolicy) -> Self {
        self.health = policy;
        self
    }

    /// Validate and apply defaults. Pure; calling it twice gives the same answer.
    pub fn resolve(&self) -> Result<ResolvedConfig, String> {
        let gateway = self
            .gateway
            .clone()
            .ok_or_else(|| "cluster gateway is required".to_string())?;

        if self.app_name.trim().is_empty() {
            return Err("app name is required".to_string());
        }
        let app = AppName::new(&self.app_name).map_err(|e| e.to_string())?;

        if self.image.trim().is_empty() {
            return Err("image reference is required".to_string());
        }
        let image = ImageRef::parse(&self.image).map_err(|e| e.to_string())?;

        let namespace = match self.namespace.as_deref() {
            None | Some("") => Namespace::default(),
            Some(ns) => Namespace::new(ns).map_err(|e| e.to_string())?,
        };

        if let ManifestSource::Inline(content) = &self.manifest
            && content.trim().is_empty()
        {
            return Err("manifest content is empty".to_string());
        }

        let replicas = self.replicas.unwrap_or(DEFAULT_REPLICAS);

        let wait_timeout = if self.wait_timeout.is_zero() {
            DEFAULT_WAIT_TIMEOUT
        } else {
            self.wait_timeout
        };

        self.health.validate()?;
        let label_selector = self.health.selector_for(&app);

        Ok(ResolvedConfig {
            target: WorkloadRef::deployment(app, namespace),
            image,
            manifest: self.manifest.clone(),
            replicas,
            wait_timeout,
            dry_run: self.dry_run,
            label_selector,
            health: self.health.clone(),
            gateway,
        })
    }
}

/// A validated [`DeploymentConfig`] with defaults applied.
#[derive(Clone)]
pub struct ResolvedConfig {
    pub target: WorkloadRef,
    pub image: ImageRef,
    pub manifest: ManifestSource,
    pub replicas: u32,
    pub wait_timeout: Duration,
    pub dry_run: bool,
    pub label_selector: String,
    pub health: HealthPolicy,
    pub gateway: Arc<dyn ClusterGateway>,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("target", &self.target)
            .field("image", &self.image)
            .field("manifest", &self.manifest)
            .field("replicas", &self.replicas)
            .field("wait_timeout", &self.wait_timeout)
            .field("dry_run", &self.dry_run)
            .field("label_selector", &self.label_selector)
            .finish_non_exhaustive()
    }
}

impl ResolvedConfig {
    pub fn app(&self) -> &AppName {
        &self.target.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.target.namespace
    }
}
