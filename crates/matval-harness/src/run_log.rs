//! Structured JSONL run log.
//!
//! Optional observability channel: one JSON object per line describing the
//! harness's own lifecycle (build step, discovery, per-fixture completion,
//! final timing). It carries no pass/fail verdicts; comparing captured
//! output against expectations is out of scope for the harness.
//!
//! Provides:
//! - [`LogEntry`]: canonical JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file, assigning sequence numbers.

use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Canonical structured log entry.
///
/// Required fields: `seq`, `timestamp`, `level`, `event`. The optional
/// fields carry event-specific context and are omitted when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Monotonic per-emitter sequence number, assigned at emit time.
    pub seq: u64,
    /// Seconds since the UNIX epoch at construction time.
    pub timestamp: f64,
    pub level: LogLevel,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<f64>,
}

impl LogEntry {
    /// Create an entry; `seq` is filled in by the emitter.
    #[must_use]
    pub fn new(level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            seq: 0,
            timestamp: unix_timestamp(),
            level,
            event: event.into(),
            fixture: None,
            detail: None,
            exit_code: None,
            elapsed_secs: None,
        }
    }

    #[must_use]
    pub fn with_fixture(mut self, fixture: impl Into<String>) -> Self {
        self.fixture = Some(fixture.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    #[must_use]
    pub fn with_elapsed_secs(mut self, secs: f64) -> Self {
        self.elapsed_secs = Some(secs);
        self
    }

    /// Serialize to one JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Writes JSONL entries to a file.
pub struct LogEmitter {
    writer: Box<dyn Write>,
    seq: u64,
}

impl LogEmitter {
    /// Create an emitter that writes to a file.
    pub fn to_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self {
            writer: Box::new(std::io::BufWriter::new(file)),
            seq: 0,
        })
    }

    /// Emit one entry, assigning the next sequence number. Serialization or
    /// write failures are swallowed: logging must never abort a run.
    pub fn emit(&mut self, mut entry: LogEntry) {
        self.seq += 1;
        entry.seq = self.seq;
        if let Ok(line) = entry.to_jsonl() {
            let _ = writeln!(self.writer, "{line}");
            let _ = self.writer.flush();
        }
    }
}
