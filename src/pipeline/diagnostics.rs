//! Run diagnostics.
//!
//! The orchestrator and agents report progress through a [`DiagnosticSink`]
//! handed to them for the length of one run. The binary uses
//! [`TracingSink`], which forwards everything to `tracing` (and therefore to
//! stderr); tests use [`RecordingSink`] to assert on what was reported.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Gathering,
    Curation,
    Build,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Stage::Gathering => 1,
            Stage::Curation => 2,
            Stage::Build => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Gathering => "Gathering News",
            Stage::Curation => "Curating Articles",
            Stage::Build => "Building Webpage",
        };
        write!(f, "Stage {}: {}", self.number(), name)
    }
}

/// Summary of a finished (or failed) stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Units of work that succeeded (agents for stage 1, otherwise 0 or 1).
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
    /// Free-form lines (per-agent breakdown, selection size, page size, ...).
    pub details: Vec<String>,
}

impl StageReport {
    pub fn new(stage: Stage, elapsed: Duration) -> Self {
        Self {
            stage,
            succeeded: 0,
            failed: 0,
            elapsed,
            details: Vec::new(),
        }
    }

    pub fn with_counts(mut self, succeeded: usize, failed: usize) -> Self {
        self.succeeded = succeeded;
        self.failed = failed;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Whether nothing in the stage failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    StageStarted(Stage),
    StageFinished(StageReport),
    Message {
        level: Level,
        source: String,
        text: String,
    },
}

/// Receiver of run diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: RunEvent);

    fn info(&self, source: &str, text: &str) {
        self.message(Level::Info, source, text);
    }

    fn warn(&self, source: &str, text: &str) {
        self.message(Level::Warn, source, text);
    }

    fn error(&self, source: &str, text: &str) {
        self.message(Level::Error, source, text);
    }

    fn message(&self, level: Level, source: &str, text: &str) {
        self.emit(RunEvent::Message {
            level,
            source: source.to_string(),
            text: text.to_string(),
        });
    }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: RunEvent) {
        match event {
            RunEvent::StageStarted(stage) => {
                tracing::info!(stage = stage.number(), "{}", stage);
            }
            RunEvent::StageFinished(report) => {
                let elapsed_secs = report.elapsed.as_secs_f64();
                if report.is_clean() {
                    tracing::info!(
                        stage = report.stage.number(),
                        succeeded = report.succeeded,
                        failed = report.failed,
                        elapsed_secs,
                        "{} complete",
                        report.stage
                    );
                } else {
                    tracing::warn!(
                        stage = report.stage.number(),
                        succeeded = report.succeeded,
                        failed = report.failed,
                        elapsed_secs,
                        "{} finished with failures",
                        report.stage
                    );
                }
                for detail in &report.details {
                    tracing::info!(stage = report.stage.number(), "  {}", detail);
                }
            }
            RunEvent::Message {
                level,
                source,
                text,
            } => match level {
                Level::Info => tracing::info!(source = %source, "{}", text),
                Level::Warn => tracing::warn!(source = %source, "{}", text),
                Level::Error => tracing::error!(source = %source, "{}", text),
            },
        }
    }
}

/// Stores every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Stage reports in the order they were emitted.
    pub fn stage_reports(&self) -> Vec<StageReport> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RunEvent::StageFinished(report) => Some(report),
                _ => None,
            })
            .collect()
    }

    /// Message texts at the given level.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RunEvent::Message { level: l, text, .. } if l == level => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: RunEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
