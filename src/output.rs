// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::progress::ProgressReporter;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    fn elapsed(&self) -> Option<f64> {
        self.start_time.map(|t| t.elapsed().as_secs_f64())
    }

    /// Print a progress message (normal mode only).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print an indented `label: value` line (normal mode only).
    pub fn detail(&self, label: &str, value: impl std::fmt::Display) {
        if self.mode == OutputMode::Normal {
            println!("  {label}: {value}");
        }
    }

    pub fn success(&self, message: &str) {
        match (self.mode, self.elapsed()) {
            (OutputMode::Normal, Some(secs)) => println!("{message} ({secs:.1}s)"),
            (OutputMode::Normal | OutputMode::Quiet, _) => println!("{message}"),
            (OutputMode::Json, secs) => self.message_event(Stream::Stdout, "success", message, secs),
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.message_event(Stream::Stderr, "warning", message, None),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => {
                self.message_event(Stream::Stderr, "error", message, self.elapsed())
            }
        }
    }

    /// Emit `{"event": .., "data": ..}` as one line (json mode only).
    pub fn json<T: Serialize>(&self, event: &str, data: &T) -> serde_json::Result<()> {
        if self.mode == OutputMode::Json {
            let line = serde_json::to_string(&DataEvent { event, data })?;
            println!("{line}");
        }
        Ok(())
    }

    fn message_event(&self, stream: Stream, event: &str, message: &str, duration_secs: Option<f64>) {
        emit(
            stream,
            &MessageEvent {
                event,
                message,
                duration_secs,
            },
        );
    }
}

/// Status lines are best-effort; a value that fails to serialize is dropped.
fn emit(stream: Stream, value: &impl Serialize) {
    let Ok(line) = serde_json::to_string(value) else {
        return;
    };
    match stream {
        Stream::Stdout => println!("{line}"),
        Stream::Stderr => eprintln!("{line}"),
    }
}

impl ProgressReporter for Output {
    fn report_stage(&self, progress: f64, description: &str) {
        match self.mode {
            OutputMode::Normal => println!("  → [{:>3.0}%] {description}", progress * 100.0),
            OutputMode::Quiet => {}
            OutputMode::Json => emit(
                Stream::Stdout,
                &ProgressEvent {
                    event: "progress",
                    progress,
                    description,
                },
            ),
        }
    }
}

#[derive(Serialize)]
struct MessageEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct DataEvent<'a, T> {
    event: &'a str,
    data: &'a T,
}

#[derive(Serialize)]
struct ProgressEvent<'a> {
    event: &'a str,
    progress: f64,
    description: &'a str,
}
