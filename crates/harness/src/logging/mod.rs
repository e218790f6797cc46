//! Audit logging for test runs.
//!
//! Every run produces one plain-text log file. Lines are appended while the
//! suite executes (interleaved across concurrent tests) and regrouped per test
//! once the run is over.
//!
//! - [`store`] - append-only file + console sink
//! - [`correlation`] - request id allocation and request/response pairing
//! - [`finalizer`] - end-of-run regrouping of the log file
//!
//! # Line Format
//!
//! ```text
//! 2026-10-19 09:15:02.417 |REQUEST| [API 1: Get All Products List] GET request #1 to: https://...
//! 2026-10-19 09:15:02.803 |RESPONSE| [API 1: Get All Products List] Response #1 status: 200 (386ms)
//! ```
//!
//! A log entry is a timestamped first line plus any continuation lines (for
//! example a pretty-printed JSON payload). The bracketed tag on the first line
//! names the owning test.

pub mod correlation;
pub mod finalizer;
pub mod store;

use std::fmt;

use serde::Serialize;

pub use correlation::{CorrelationLogger, PendingRequest};
pub use finalizer::{FinalizeSummary, LogDocument, LogFinalizer};
pub use store::{ConsoleSink, LogStore};

/// Width of the banner borders and group separators.
pub const RULE_WIDTH: usize = 80;

/// Group key for entries that carry no `[test title]` tag.
pub const GENERAL_GROUP: &str = "__general__";

/// Severity of an audit log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Success,
    Warn,
    Error,
    Request,
    Response,
}

impl LogLevel {
    /// The label written between the pipes.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Request => "REQUEST",
            LogLevel::Response => "RESPONSE",
        }
    }

    /// Level for a response status line: 4xx/5xx error, 3xx warn, else success tier.
    pub fn for_status(status: u16) -> Self {
        if status >= 400 {
            LogLevel::Error
        } else if status >= 300 {
            LogLevel::Warn
        } else {
            LogLevel::Response
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Banner border: a run of `═`.
pub fn border() -> String {
    "═".repeat(RULE_WIDTH)
}

/// Separator written after each test's block in the finalized file.
pub fn separator() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Current UTC time as `YYYY-MM-DD HH:MM:SS.mmm` (23 characters).
pub fn timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Formats one log entry (without the trailing newline).
pub fn format_line(timestamp: &str, level: LogLevel, message: &str) -> String {
    format!("{} |{}| {}", timestamp, level, message)
}

/// Renders a labelled, pretty-printed JSON dump for a multi-line entry.
pub fn format_block<T: Serialize + ?Sized>(label: &str, value: &T) -> String {
    let rendered = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("<unserializable: {}>", e));
    format!("{}:\n{}", label, rendered)
}
