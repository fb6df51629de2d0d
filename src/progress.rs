// ABOUTME: Progress reporting capability for deployment pipelines.
// ABOUTME: Fire-and-forget listeners; a failing listener never aborts a deployment.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;

/// Receives fractional progress and a stage description.
pub trait ProgressReporter: Send + Sync {
    /// `progress` is in `[0.0, 1.0]` and never decreases within one run.
    fn report_stage(&self, progress: f64, description: &str);
}

/// Delivers each report to zero or more listeners in registration order.
#[derive(Clone, Default)]
pub struct ProgressFanout {
    listeners: Vec<Arc<dyn ProgressReporter>>,
}

impl std::fmt::Debug for ProgressFanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressFanout")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ProgressFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: Arc<dyn ProgressReporter>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn push(&mut self, listener: Arc<dyn ProgressReporter>) {
        self.listeners.push(listener);
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl ProgressReporter for ProgressFanout {
    fn report_stage(&self, progress: f64, description: &str) {
        for listener in &self.listeners {
            deliver(listener.as_ref(), progress, description);
        }
    }
}

/// Hand one report to `listener`, containing a panic instead of unwinding into the caller.
pub(crate) fn deliver(listener: &dyn ProgressReporter, progress: f64, description: &str) {
    let delivered = catch_unwind(AssertUnwindSafe(|| {
        listener.report_stage(progress, description)
    }));
    if delivered.is_err() {
        tracing::warn!(progress, description, "progress listener panicked; ignoring");
    }
}

/// One recorded progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub progress: f64,
    pub description: String,
}

/// Keeps every report in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.description.clone())
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report_stage(&self, progress: f64, description: &str) {
        self.events.lock().push(ProgressEvent {
            progress,
            description: description.to_string(),
        });
    }
}

/// Logs every report through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report_stage(&self, progress: f64, description: &str) {
        tracing::info!(progress = format!("{:.0}%", progress * 100.0), "{description}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Exploding;

    impl ProgressReporter for Exploding {
        fn report_stage(&self, _progress: f64, _description: &str) {
            panic!("listener blew up");
        }
    }

    #[test]
    fn fanout_delivers_to_every_listener() {
        let a = Arc::new(RecordingReporter::new());
        let b = Arc::new(RecordingReporter::new());
        let fanout = ProgressFanout::new().with(a.clone()).with(b.clone());

        fanout.report_stage(0.5, "halfway");

        assert_eq!(a.descriptions(), vec!["halfway"]);
        assert_eq!(b.descriptions(), vec!["halfway"]);
    }

    #[test]
    fn panicking_listener_does_not_stop_delivery() {
        let recorder = Arc::new(RecordingReporter::new());
        let fanout = ProgressFanout::new()
            .with(Arc::new(Exploding))
            .with(recorder.clone());

        fanout.report_stage(0.1, "start");

        assert_eq!(recorder.events().len(), 1);
    }

    #[test]
    fn empty_fanout_is_a_no_op() {
        let fanout = ProgressFanout::new();
        assert!(fanout.is_empty());
        fanout.report_stage(1.0, "done");
    }
}
