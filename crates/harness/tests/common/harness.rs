//! Logger and executor construction for tests.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use apicheck_harness::{CorrelationLogger, LogStore, RequestExecutor, RetryPolicy};
use tempfile::TempDir;

/// A temporary run log plus the logger writing to it.
pub struct TestLog {
    pub dir: TempDir,
    pub logger: Arc<CorrelationLogger>,
}

impl TestLog {
    /// Creates a fresh run log in a temporary directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = LogStore::with_console(
            dir.path().join("logs").join("Api_test-run.log"),
            "test-run",
            Box::new(std::io::sink()),
        )
        .expect("Failed to open log store");
        Self {
            dir,
            logger: Arc::new(CorrelationLogger::new(store)),
        }
    }

    /// Current contents of the log file.
    pub fn contents(&self) -> String {
        fs::read_to_string(self.logger.store().path()).expect("Failed to read log")
    }

    /// Log lines that start a new entry (timestamped), header excluded.
    pub fn entry_lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| l.len() > 23 && l.as_bytes()[4] == b'-' && l.contains(" |"))
            .map(str::to_string)
            .collect()
    }

    /// An executor for `title` with a fast retry policy.
    pub fn executor(&self, base_url: &str, title: &str) -> RequestExecutor {
        RequestExecutor::new(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .expect("Failed to build client"),
            base_url,
            title,
            Arc::clone(&self.logger),
            fast_retry(),
        )
    }
}

/// Default attempt count with millisecond delays.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        min_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        ..RetryPolicy::default()
    }
}
