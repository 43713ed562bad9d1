//! Rolling log of recent page designs.
//!
//! After every successful build a one-paragraph brief is extracted from the
//! generated page and appended to a small JSON file. The builder reads the
//! most recent entries back as context so consecutive days look different.
//!
//! The store is the only state carried between runs. It is read tolerantly
//! (missing or corrupt means empty history) and written through a temporary
//! file so an interrupted run never leaves a half-written store behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// Number of summaries kept on disk.
pub const DEFAULT_CAPACITY: usize = 7;

/// Brief stored when the page carries no design annotation.
pub const NO_BRIEF_PLACEHOLDER: &str = "No design brief found in generated HTML";

/// Briefs longer than this are shortened in prompt context.
const MAX_BRIEF_CHARS: usize = 300;

static BRIEF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--\s*DESIGN BRIEF:\s*(.*?)\s*-->").expect("Invalid regex for design brief")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex for whitespace"));

/// Summary of the design used on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSummary {
    pub date: NaiveDate,
    pub brief: String,
}

/// Order in which [`DesignMemory::recent`] returns entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrder {
    OldestFirst,
    NewestFirst,
}

/// File-backed design history.
#[derive(Debug, Clone)]
pub struct DesignMemory {
    path: PathBuf,
    capacity: usize,
}

impl DesignMemory {
    /// Opens (lazily) the store at `path` with the default capacity.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Override the number of entries retained.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full history, oldest first.
    ///
    /// A missing, unreadable or corrupt store yields an empty history.
    pub fn load(&self) -> Vec<DesignSummary> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No design memory yet");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not read design memory, starting fresh");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<DesignSummary>>(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Design memory is corrupt, starting fresh");
                Vec::new()
            }
        }
    }

    /// Returns up to `n` of the most recent summaries in the requested order.
    pub fn recent(&self, n: usize, order: HistoryOrder) -> Vec<DesignSummary> {
        let mut entries = self.load();
        let skip = entries.len().saturating_sub(n);
        let mut recent: Vec<DesignSummary> = entries.drain(skip..).collect();
        if order == HistoryOrder::NewestFirst {
            recent.reverse();
        }
        recent
    }

    /// Appends a summary and keeps only the most recent `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be serialized or written.
    pub fn save(&self, summary: DesignSummary) -> Result<(), MemoryError> {
        let mut entries = self.load();
        entries.push(summary);
        let excess = entries.len().saturating_sub(self.capacity);
        entries.drain(..excess);

        let json = serde_json::to_string_pretty(&entries)?;
        self.write_atomically(&json)?;

        tracing::debug!(path = %self.path.display(), entries = entries.len(), "Design memory saved");
        Ok(())
    }

    fn write_atomically(&self, content: &str) -> Result<(), MemoryError> {
        let io_error = |source| MemoryError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, content).map_err(io_error)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            io_error(e)
        })
    }
}

/// Pulls the design brief annotation out of a rendered page.
pub fn extract_summary(html: &str, date: NaiveDate) -> DesignSummary {
    let brief = BRIEF_PATTERN
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| WHITESPACE.replace_all(m.as_str().trim(), " ").into_owned())
        .filter(|brief| !brief.is_empty())
        .unwrap_or_else(|| NO_BRIEF_PLACEHOLDER.to_string());

    DesignSummary { date, brief }
}

/// Formats summaries as a `<recent_designs>` prompt block, keeping the given order.
pub fn format_recent(designs: &[DesignSummary]) -> String {
    if designs.is_empty() {
        return "<recent_designs>\nNo previous designs on record. This is your first design!\n</recent_designs>"
            .to_string();
    }

    let mut lines = vec![
        "<recent_designs>".to_string(),
        "The following designs were used in recent days, newest first. DO NOT repeat these approaches; find something different.\n".to_string(),
    ];

    for design in designs {
        lines.push(format!(
            "**{}**: {}\n",
            design.date.format("%Y-%m-%d"),
            truncate_brief(&design.brief)
        ));
    }

    lines.push("</recent_designs>".to_string());
    lines.join("\n")
}

fn truncate_brief(brief: &str) -> String {
    if brief.chars().count() <= MAX_BRIEF_CHARS {
        return brief.to_string();
    }
    let kept: String = brief.chars().take(MAX_BRIEF_CHARS - 3).collect();
    format!("{kept}...")
}
