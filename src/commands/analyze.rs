// ABOUTME: Analyze command implementation.
// ABOUTME: Runs the health validator over a captured health check result.

use std::path::Path;

use deckhand::config::Config;
use deckhand::error::Result;
use deckhand::gateway::HealthCheckResult;
use deckhand::health::{HealthPolicy, HealthValidator};
use deckhand::output::Output;

pub fn analyze(file: &Path, dir: &Path, output: Output) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let result: HealthCheckResult = serde_json::from_str(&content)?;

    // Thresholds come from the project config when one is present.
    let policy = match Config::discover(dir) {
        Ok(config) => config.health,
        Err(e) => {
            tracing::debug!(error = %e, "using default health policy");
            HealthPolicy::default()
        }
    };

    let report = HealthValidator::new(policy).analyze(&result);

    let verdict = report.verdict;
    output.progress(&format!(
        "Namespace {}: {} ({}/{} ready)",
        report.namespace, verdict.status, verdict.ready, verdict.total
    ));
    for issue in &report.pod_issues {
        output.progress(&format!(
            "  [{}] {}: {}",
            issue.severity.as_str(),
            issue.pod,
            issue.description
        ));
    }
    for issue in &report.container_issues {
        output.progress(&format!(
            "  [{}] {}/{} restarted {} times",
            issue.severity.as_str(),
            issue.pod,
            issue.container,
            issue.restarts
        ));
    }
    output.detail("restarts", report.restarts.total_restarts);
    output.detail("restart action", &report.restarts.recommended_action);
    if !report.recommendations.is_empty() {
        output.progress("Recommendations:");
        for rec in &report.recommendations {
            output.progress(&format!("  - {rec}"));
        }
    }
    output.json("health_report", &report)?;

    output.success(report.status().as_str());
    Ok(())
}
