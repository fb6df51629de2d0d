// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, discovery, destination merging, and engine bridging.

mod support;

use deckhand::config::*;
use deckhand::deploy::StrategyKind;
use deckhand::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const MINIMAL: &str = r#"
app: web
image: registry.example.com/web:1.4.2
manifest: k8s/web.yaml
"#;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.app.as_str(), "web");
        assert_eq!(config.image.registry(), Some("registry.example.com"));
        assert_eq!(config.image.tag(), Some("1.4.2"));
        assert_eq!(config.manifest, PathBuf::from("k8s/web.yaml"));
        assert_eq!(config.namespace, None);
        assert_eq!(config.namespace().as_str(), "default");
        assert_eq!(config.strategy, StrategyKind::Rolling);
        assert_eq!(config.wait_timeout, Duration::from_secs(300));
        assert!(!config.dry_run);
        assert_eq!(config.health.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
app: web
image: ghcr.io/shop/web@sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef
manifest: deploy/web.yaml
namespace: shop
replicas: 3
strategy: recreate
wait_timeout: 2m
dry_run: true
health:
  poll_interval: 2s
  healthy_ratio: 0.9
  degraded_ratio: 0.5
  label_selector: tier=frontend
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.namespace().as_str(), "shop");
        assert_eq!(config.replicas, Some(3));
        assert_eq!(config.strategy, StrategyKind::Recreate);
        assert_eq!(config.wait_timeout, Duration::from_secs(120));
        assert!(config.dry_run);
        assert!(config.image.is_pinned());
        assert_eq!(config.health.poll_interval, Duration::from_secs(2));
        assert_eq!(config.health.selector_for(&config.app), "tier=frontend");
        config.validate().unwrap();
    }

    #[test]
    fn missing_app_returns_error() {
        let yaml = r#"
image: nginx:latest
manifest: k8s/web.yaml
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn invalid_app_name_returns_error() {
        let yaml = r#"
app: Web_App
image: nginx:latest
manifest: k8s/web.yaml
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("app name must be lowercase"));
    }

    #[test]
    fn invalid_namespace_returns_error() {
        let yaml = r#"
app: web
image: nginx:latest
manifest: k8s/web.yaml
namespace: -shop
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn unknown_strategy_returns_error() {
        let yaml = r#"
app: web
image: nginx:latest
manifest: k8s/web.yaml
strategy: shadow
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }
}

mod validation {
    use super::*;

    #[test]
    fn reserved_strategy_is_rejected() {
        let mut config = Config::from_yaml(MINIMAL).unwrap();
        config.strategy = StrategyKind::Canary;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::UnsupportedStrategy(_)));
        assert_eq!(err.to_string(), "unsupported deployment strategy: canary");
    }

    #[test]
    fn zero_replicas_is_rejected() {
        let mut config = Config::from_yaml(MINIMAL).unwrap();
        config.replicas = Some(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn inverted_health_thresholds_are_rejected() {
        let mut config = Config::from_yaml(MINIMAL).unwrap();
        config.health.degraded_ratio = 0.95;
        config.health.healthy_ratio = 0.8;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}

mod destinations {
    use super::*;

    const WITH_DESTINATIONS: &str = r#"
app: web
image: registry.example.com/web:1.4.2
manifest: k8s/web.yaml
replicas: 3
destinations:
  staging:
    namespace: staging
    replicas: 1
    image: registry.example.com/web:1.5.0-rc1
    wait_timeout: 90s
  production:
    namespace: prod
    strategy: recreate
    health:
      poll_interval: 10s
"#;

    #[test]
    fn destination_overrides_fields() {
        let config = Config::from_yaml(WITH_DESTINATIONS).unwrap();
        let staging = config.for_destination("staging").unwrap();

        assert_eq!(staging.namespace().as_str(), "staging");
        assert_eq!(staging.replicas, Some(1));
        assert_eq!(staging.image.tag(), Some("1.5.0-rc1"));
        assert_eq!(staging.wait_timeout, Duration::from_secs(90));
        assert_eq!(staging.strategy, StrategyKind::Rolling);
    }

    #[test]
    fn destination_keeps_unset_fields() {
        let config = Config::from_yaml(WITH_DESTINATIONS).unwrap();
        let production = config.for_destination("production").unwrap();

        assert_eq!(production.replicas, Some(3));
        assert_eq!(production.image.tag(), Some("1.4.2"));
        assert_eq!(production.strategy, StrategyKind::Recreate);
        assert_eq!(production.health.poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn unknown_destination_returns_error() {
        let config = Config::from_yaml(WITH_DESTINATIONS).unwrap();
        let err = config.for_destination("qa").unwrap_err();
        assert!(matches!(err, Error::UnknownDestination(ref d) if d == "qa"));
    }

    #[test]
    fn invalid_destination_image_returns_error() {
        let yaml = format!(
            "{MINIMAL}destinations:\n  broken:\n    image: \"\"\n"
        );
        let config = Config::from_yaml(&yaml).unwrap();
        assert!(matches!(
            config.for_destination("broken"),
            Err(Error::InvalidConfig(_))
        ));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn finds_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("deckhand.yml"), MINIMAL).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.app.as_str(), "web");
    }

    #[test]
    fn finds_config_in_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".deckhand")).unwrap();
        fs::write(dir.path().join(".deckhand/config.yml"), MINIMAL).unwrap();

        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn primary_file_wins_over_alternatives() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("deckhand.yml"), MINIMAL).unwrap();
        fs::write(
            dir.path().join("deckhand.yaml"),
            MINIMAL.replace("app: web", "app: other"),
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.app.as_str(), "web");
    }

    #[test]
    fn missing_config_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}

mod init {
    use super::*;

    #[test]
    fn template_round_trips_through_discovery() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("checkout"), Some("ghcr.io/shop/checkout:2.0.0"), false)
            .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.app.as_str(), "checkout");
        assert_eq!(config.image.tag(), Some("2.0.0"));
        assert_eq!(config.health.healthy_ratio, 1.0);
        assert_eq!(config.health.degraded_ratio, 0.7);
        config.validate().unwrap();
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), None, None, false).unwrap();

        let err = init_config(dir.path(), None, None, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        init_config(dir.path(), Some("web"), None, true).unwrap();
    }

    #[test]
    fn rejects_invalid_app_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = init_config(dir.path(), Some("-web"), None, false).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

mod engine {
    use super::*;
    use deckhand::context::DeployContext;
    use deckhand::deploy::DeployStrategy;
    use support::FakeCluster;

    #[tokio::test]
    async fn config_drives_a_deployment() {
        let yaml = format!("{MINIMAL}namespace: shop\nreplicas: 2\nwait_timeout: 20s\n");
        let config = Config::from_yaml(&yaml).unwrap();
        let cluster = FakeCluster::new().shared();

        let deployment = config.to_deployment_config(cluster.clone());
        assert_eq!(deployment.namespace.as_deref(), Some("shop"));
        assert_eq!(deployment.replicas, Some(2));
        assert_eq!(deployment.wait_timeout, Duration::from_secs(20));

        let strategy = config.strategy.build().unwrap();
        let result = strategy
            .deploy(&DeployContext::new(), &deployment)
            .await
            .unwrap();
        assert!(result.success);
        assert!(cluster.calls().contains(&support::Call::Apply {
            namespace: "shop".to_string(),
            dry_run: false
        }));
    }
}
