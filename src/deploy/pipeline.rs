// ABOUTME: Generic ordered step runner shared by every strategy.
// ABOUTME: Reports monotonic progress, records step outcomes, stops at the first failure.

use std::future::Future;

use tokio::time::Instant;

use super::error::StepError;
use super::result::{StepOutcome, StepRecord};
use super::stage::Stage;
use crate::progress::{ProgressReporter, deliver};

/// One planned step: its stage, the progress reported before it runs, and a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSpec {
    pub stage: Stage,
    pub progress: f64,
    pub description: &'static str,
}

impl StepSpec {
    pub const fn new(stage: Stage, progress: f64, description: &'static str) -> Self {
        Self {
            stage,
            progress,
            description,
        }
    }
}

/// A step that returned an error.
#[derive(Debug)]
pub struct StepFailure {
    pub stage: Stage,
    pub error: StepError,
}

/// Walks a fixed plan in order.
///
/// Steps can only move forward through the plan. Planned steps passed over
/// on the way to a later one are recorded as skipped.
pub struct Pipeline<'a> {
    plan: &'static [StepSpec],
    cursor: usize,
    reporter: Option<&'a dyn ProgressReporter>,
    reported: f64,
    records: Vec<StepRecord>,
}

impl<'a> Pipeline<'a> {
    pub fn new(plan: &'static [StepSpec], reporter: Option<&'a dyn ProgressReporter>) -> Self {
        Self {
            plan,
            cursor: 0,
            reporter,
            reported: 0.0,
            records: Vec::new(),
        }
    }

    /// Report progress, clamped to `[0, 1]` and never below the last report.
    pub fn report(&mut self, progress: f64, description: &str) {
        let progress = progress.clamp(0.0, 1.0).max(self.reported);
        self.reported = progress;
        if let Some(reporter) = self.reporter {
            deliver(reporter, progress, description);
        }
    }

    /// Run one step. Progress is reported before the step's future is first polled.
    pub async fn step<T, F>(&mut self, stage: Stage, step: F) -> Result<T, StepFailure>
    where
        F: Future<Output = Result<T, StepError>>,
    {
        self.enter(stage);
        let started = Instant::now();

        match step.await {
            Ok(value) => {
                tracing::debug!(stage = %stage, elapsed = ?started.elapsed(), "step completed");
                self.records.push(StepRecord {
                    stage,
                    outcome: StepOutcome::Completed,
                });
                Ok(value)
            }
            Err(error) => {
                tracing::error!(stage = %stage, elapsed = ?started.elapsed(), error = %error, "step failed");
                Err(StepFailure { stage, error })
            }
        }
    }

    /// Complete a step that has no work that can fail.
    pub fn mark(&mut self, stage: Stage) {
        self.enter(stage);
        self.records.push(StepRecord {
            stage,
            outcome: StepOutcome::Completed,
        });
    }

    /// Skip a planned step without reporting progress for it.
    pub fn skip(&mut self, stage: Stage) {
        if let Some(offset) = self.position(stage) {
            self.skip_until(self.cursor + offset);
            self.cursor += 1;
        }
        tracing::debug!(stage = %stage, "step skipped");
        self.records.push(StepRecord {
            stage,
            outcome: StepOutcome::Skipped,
        });
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<StepRecord> {
        self.records
    }

    fn position(&self, stage: Stage) -> Option<usize> {
        self.plan[self.cursor..]
            .iter()
            .position(|spec| spec.stage == stage)
    }

    fn skip_until(&mut self, index: usize) {
        while self.cursor < index {
            let passed = self.plan[self.cursor].stage;
            tracing::debug!(stage = %passed, "step skipped");
            self.records.push(StepRecord {
                stage: passed,
                outcome: StepOutcome::Skipped,
            });
            self.cursor += 1;
        }
    }

    fn enter(&mut self, stage: Stage) {
        match self.position(stage) {
            Some(offset) => {
                self.skip_until(self.cursor + offset);
                let spec = self.plan[self.cursor];
                self.cursor += 1;
                self.report(spec.progress, spec.description);
            }
            None => {
                tracing::warn!(stage = %stage, "step is not in the remaining plan");
            }
        }
    }
}
