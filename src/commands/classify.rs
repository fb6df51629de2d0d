// ABOUTME: Classify command implementation.
// ABOUTME: Maps a failure message to a reason code with retry and rollback guidance.

use deckhand::deploy::{FailureAnalysis, Stage};
use deckhand::error::Result;
use deckhand::output::Output;

pub fn classify(message: &str, stage: &str, output: Output) -> Result<()> {
    let stage: Stage = stage.parse()?;
    let analysis = FailureAnalysis::from_message(stage, message);

    output.progress(&format!("Failure at {}: {}", analysis.stage, analysis.reason));
    output.detail("can retry", analysis.can_retry);
    output.detail("can rollback", analysis.can_rollback);
    output.progress("Suggestions:");
    for suggestion in analysis.suggestions.iter() {
        output.progress(&format!("  - {suggestion}"));
    }
    output.json("failure_analysis", &analysis)?;

    output.success(analysis.reason.as_str());
    Ok(())
}
