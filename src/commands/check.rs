// ABOUTME: Check command implementation.
// ABOUTME: Discovers and validates configuration, then prints the resolved plan.

use std::path::Path;

use deckhand::config::Config;
use deckhand::error::Result;
use deckhand::output::Output;
use serde::Serialize;

#[derive(Serialize)]
struct Plan<'a> {
    app: &'a str,
    image: String,
    namespace: String,
    manifest: String,
    replicas: Option<u32>,
    strategy: &'static str,
    description: &'static str,
    wait_timeout_secs: u64,
    label_selector: String,
    dry_run: bool,
}

/// Validate the configuration found in `dir`.
pub fn check(dir: &Path, destination: Option<&str>, mut output: Output) -> Result<()> {
    output.start_timer();

    let config = Config::discover(dir)?;
    let config = match destination {
        Some(dest) => config.for_destination(dest)?,
        None => config,
    };
    config.validate()?;

    let strategy = config.strategy.build()?;
    let namespace = config.namespace();
    let plan = Plan {
        app: config.app.as_str(),
        image: config.image.to_string(),
        namespace: namespace.to_string(),
        manifest: config.manifest.display().to_string(),
        replicas: config.replicas,
        strategy: strategy.name(),
        description: strategy.description(),
        wait_timeout_secs: config.wait_timeout.as_secs(),
        label_selector: config.health.selector_for(&config.app),
        dry_run: config.dry_run,
    };

    tracing::debug!(app = plan.app, strategy = plan.strategy, "configuration resolved");

    output.progress(&format!("Deployment plan for {}", plan.app));
    output.detail("image", &plan.image);
    output.detail("namespace", &plan.namespace);
    output.detail("manifest", &plan.manifest);
    output.detail(
        "replicas",
        plan.replicas
            .map(|r| r.to_string())
            .unwrap_or_else(|| "from manifest".to_string()),
    );
    output.detail("strategy", format!("{} ({})", plan.strategy, plan.description));
    output.detail("wait timeout", format!("{}s", plan.wait_timeout_secs));
    output.detail("selector", &plan.label_selector);
    if plan.dry_run {
        output.warning("dry_run is enabled; rollout and health checks will be skipped");
    }
    if config.image.is_latest() {
        output.warning("image uses the latest tag; pin a tag or digest for repeatable rollouts");
    }
    output.json("plan", &plan)?;

    output.success("Configuration is valid");
    Ok(())
}
