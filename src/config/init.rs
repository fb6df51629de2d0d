// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates deckhand.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{AppName, ImageRef};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, app: Option<&str>, image: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(a) = app {
        config.app = AppName::new(a).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    if let Some(i) = image {
        config.image = ImageRef::parse(i).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"app: {}
image: {}
manifest: {}
strategy: {}
wait_timeout: {}s
# namespace: default
# replicas: 3
health:
  poll_interval: {}s
  healthy_ratio: {:?}
  degraded_ratio: {:?}
# destinations:
#   staging:
#     namespace: staging
#     replicas: 1
"#,
        config.app,
        config.image,
        config.manifest.display(),
        config.strategy,
        config.wait_timeout.as_secs(),
        config.health.poll_interval.as_secs(),
        config.health.healthy_ratio,
        config.health.degraded_ratio,
    )
}
