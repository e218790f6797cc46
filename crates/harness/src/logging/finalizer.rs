//! End-of-run log regrouping.
//!
//! During a run, entries from concurrent tests interleave in the log file.
//! Finalization rewrites the file so that each test's entries are contiguous:
//!
//! ```text
//! <banner header, kept as-is>
//!
//! <entries of the first test seen, original order>
//! --------------------------------------------------------------------------------
//! <entries of the second test seen>
//! --------------------------------------------------------------------------------
//!
//! ════════════════════════════════════════════════════════════════════════════════
//! API TEST EXECUTION COMPLETED
//! Completed at: 2026-10-19 09:20:11
//! ════════════════════════════════════════════════════════════════════════════════
//! ```
//!
//! Parsing drops blank lines, group separators and completion footers, so
//! finalizing an already finalized file yields the same grouping again.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, info};

use super::{GENERAL_GROUP, RULE_WIDTH, border, separator};
use crate::error::HarnessResult;

static TIMESTAMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3} ").expect("timestamp pattern is valid")
});

/// The `[title]` tag directly after the level marker. A title may contain `]`
/// as long as it is not followed by a space.
static TEST_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+ \S+ \|[A-Z]+\| \[(.+?)\](?: |$)").expect("tag pattern is valid")
});

/// Minimum run of border characters that marks the end of the header.
const HEADER_PROBE_LEN: usize = 10;

/// One logical log event: a timestamped line plus its continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Owning test title, or [`GENERAL_GROUP`].
    pub group: String,
    pub lines: Vec<String>,
}

impl LogEntry {
    fn start(first_line: &str) -> Self {
        let group = TEST_TAG
            .captures(first_line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| GENERAL_GROUP.to_string());
        Self {
            group,
            lines: vec![first_line.to_string()],
        }
    }
}

/// A parsed log file: its banner header and its body entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogDocument {
    pub header: Vec<String>,
    pub entries: Vec<LogEntry>,
}

/// Outcome of a finalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeSummary {
    /// Number of entries written.
    pub entries: usize,
    /// Group names in output order.
    pub groups: Vec<String>,
}

impl LogDocument {
    /// Parses raw or previously finalized log content.
    pub fn parse(content: &str) -> Self {
        let lines: Vec<&str> = content.lines().collect();
        let probe = "═".repeat(HEADER_PROBE_LEN);

        let header_end = lines
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, line)| line.contains(&probe))
            .map(|(i, _)| i + 1)
            .unwrap_or(0);

        let header = lines[..header_end].iter().map(|l| l.to_string()).collect();
        let separator = separator();

        let mut entries: Vec<LogEntry> = Vec::new();
        let mut in_footer = false;

        for line in &lines[header_end..] {
            if is_border(line) {
                in_footer = !in_footer;
                continue;
            }
            if in_footer || line.trim().is_empty() || *line == separator {
                continue;
            }

            if TIMESTAMP_PREFIX.is_match(line) {
                entries.push(LogEntry::start(line));
            } else {
                match entries.last_mut() {
                    Some(entry) => entry.lines.push(line.to_string()),
                    None => entries.push(LogEntry {
                        group: GENERAL_GROUP.to_string(),
                        lines: vec![line.to_string()],
                    }),
                }
            }
        }

        Self { header, entries }
    }

    /// Groups entries by test, in order of first appearance.
    pub fn grouped(&self) -> Vec<(&str, Vec<&LogEntry>)> {
        let mut groups: Vec<(&str, Vec<&LogEntry>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for entry in &self.entries {
            let slot = *index.entry(entry.group.as_str()).or_insert_with(|| {
                groups.push((entry.group.as_str(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(entry);
        }
        groups
    }

    /// Summary of what [`render`](Self::render) will write.
    pub fn summary(&self) -> FinalizeSummary {
        FinalizeSummary {
            entries: self.entries.len(),
            groups: self
                .grouped()
                .into_iter()
                .map(|(name, _)| name.to_string())
                .collect(),
        }
    }

    /// Renders the grouped file, stamping the footer with `completed_at`.
    pub fn render(&self, completed_at: &str) -> String {
        let separator = separator();
        let mut out = String::new();

        if !self.header.is_empty() {
            out.push_str(&self.header.join("\n"));
            out.push_str("\n\n");
        }

        for (_, entries) in self.grouped() {
            for entry in entries {
                out.push_str(&entry.lines.join("\n"));
                out.push('\n');
            }
            out.push_str(&separator);
            out.push('\n');
        }

        let rule = border();
        out.push_str(&format!(
            "\n{rule}\nAPI TEST EXECUTION COMPLETED\nCompleted at: {completed_at}\n{rule}\n"
        ));
        out
    }
}

fn is_border(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= RULE_WIDTH && trimmed.chars().all(|c| c == '═')
}

/// Rewrites a run log into per-test groups once the run is over.
#[derive(Debug, Clone)]
pub struct LogFinalizer {
    path: PathBuf,
}

impl LogFinalizer {
    /// Creates a finalizer for the log at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log this finalizer rewrites.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads, regroups and rewrites the log, returning any I/O failure.
    ///
    /// Must not run while entries are still being appended.
    pub fn try_finalize(&self) -> HarnessResult<FinalizeSummary> {
        let content = fs::read_to_string(&self.path)?;
        let document = LogDocument::parse(&content);
        let completed_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        // Rewritten in place so an open append handle keeps pointing at this file.
        fs::write(&self.path, document.render(&completed_at))?;
        Ok(document.summary())
    }

    /// Finalizes the log, logging instead of returning failures.
    ///
    /// Test outcomes are already decided when this runs, so a failure here
    /// must never change them.
    pub fn finalize(&self) -> Option<FinalizeSummary> {
        match self.try_finalize() {
            Ok(summary) => {
                info!(
                    path = %self.path.display(),
                    entries = summary.entries,
                    groups = summary.groups.len(),
                    "Log file finalized"
                );
                Some(summary)
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to finalize log file");
                None
            }
        }
    }
}
