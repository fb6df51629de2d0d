// ABOUTME: Health thresholds, poll interval and the readiness classifier.
// ABOUTME: Classification is a pure function of ready and total pod counts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Interval between health polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Readiness ratio at or above which a workload is healthy.
pub const DEFAULT_HEALTHY_RATIO: f64 = 1.0;

/// Readiness ratio at or above which a workload is degraded rather than unhealthy.
pub const DEFAULT_DEGRADED_RATIO: f64 = 0.7;

/// Coarse health verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one readiness observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthVerdict {
    pub status: HealthStatus,
    /// `ready / total * 100`, truncated and clamped to `[0, 100]`. `None` without pods.
    pub score: Option<u8>,
    pub ready: u32,
    pub total: u32,
}

impl HealthVerdict {
    /// Verdict for "nothing observed".
    pub fn unknown() -> Self {
        Self {
            status: HealthStatus::Unknown,
            score: None,
            ready: 0,
            total: 0,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Tunable health gate policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPolicy {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_healthy_ratio")]
    pub healthy_ratio: f64,

    #[serde(default = "default_degraded_ratio")]
    pub degraded_ratio: f64,

    /// Pod selector; `app=<name>` when unset.
    #[serde(default)]
    pub label_selector: Option<String>,
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_healthy_ratio() -> f64 {
    DEFAULT_HEALTHY_RATIO
}

fn default_degraded_ratio() -> f64 {
    DEFAULT_DEGRADED_RATIO
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            healthy_ratio: DEFAULT_HEALTHY_RATIO,
            degraded_ratio: DEFAULT_DEGRADED_RATIO,
            label_selector: None,
        }
    }
}

impl HealthPolicy {
    /// Check thresholds are ordered and the interval is usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_zero() {
            return Err("health poll interval must be greater than zero".to_string());
        }
        if !(self.healthy_ratio > 0.0 && self.healthy_ratio <= 1.0) {
            return Err(format!(
                "healthy ratio must be in (0, 1], got {}",
                self.healthy_ratio
            ));
        }
        if !(self.degraded_ratio > 0.0 && self.degraded_ratio <= self.healthy_ratio) {
            return Err(format!(
                "degraded ratio must be in (0, healthy ratio], got {}",
                self.degraded_ratio
            ));
        }
        Ok(())
    }

    /// Selector for the application's pods.
    pub fn selector_for(&self, app: &crate::types::AppName) -> String {
        self.label_selector
            .clone()
            .unwrap_or_else(|| app.selector())
    }

    /// Classify a readiness observation against this policy.
    pub fn classify(&self, ready: u32, total: u32) -> HealthVerdict {
        if total == 0 {
            return HealthVerdict::unknown();
        }

        let clamped = ready.min(total);
        let score = (u64::from(clamped) * 100 / u64::from(total)) as u8;
        let ratio = f64::from(ready) / f64::from(total);

        let status = if ratio >= self.healthy_ratio {
            HealthStatus::Healthy
        } else if ratio >= self.degraded_ratio {
            HealthStatus::Degraded
        } else if ratio > 0.0 {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Unknown
        };

        HealthVerdict {
            status,
            score: Some(score),
            ready,
            total,
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(ready: u32, total: u32) -> HealthVerdict {
    HealthPolicy::default().classify(ready, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_readiness_is_healthy() {
        let v = classify(3, 3);
        assert_eq!(v.status, HealthStatus::Healthy);
        assert_eq!(v.score, Some(100));
    }

    #[test]
    fn two_of_three_is_degraded() {
        let v = classify(2, 3);
        assert_eq!(v.status, HealthStatus::Degraded);
        assert_eq!(v.score, Some(66));
    }

    #[test]
    fn one_of_three_is_unhealthy() {
        let v = classify(1, 3);
        assert_eq!(v.status, HealthStatus::Unhealthy);
        assert_eq!(v.score, Some(33));
    }

    #[test]
    fn no_pods_is_unknown_without_score() {
        let v = classify(0, 0);
        assert_eq!(v.status, HealthStatus::Unknown);
        assert_eq!(v.score, None);
    }

    #[test]
    fn zero_ready_is_unknown() {
        let v = classify(0, 4);
        assert_eq!(v.status, HealthStatus::Unknown);
        assert_eq!(v.score, Some(0));
    }

    #[test]
    fn score_clamps_when_gateway_overcounts() {
        let v = classify(5, 3);
        assert_eq!(v.status, HealthStatus::Healthy);
        assert_eq!(v.score, Some(100));
    }

    #[test]
    fn thresholds_are_overridable() {
        let policy = HealthPolicy {
            healthy_ratio: 0.5,
            degraded_ratio: 0.25,
            ..HealthPolicy::default()
        };
        assert_eq!(policy.classify(2, 3).status, HealthStatus::Healthy);
        assert_eq!(policy.classify(1, 3).status, HealthStatus::Degraded);
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let policy = HealthPolicy {
            healthy_ratio: 0.6,
            degraded_ratio: 0.9,
            ..HealthPolicy::default()
        };
        assert!(policy.validate().is_err());
        assert!(HealthPolicy::default().validate().is_ok());
    }
}
