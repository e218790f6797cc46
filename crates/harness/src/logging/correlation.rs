//! Request/response correlation.
//!
//! [`CorrelationLogger`] is the long-lived logger service of a run. It owns the
//! request id counter and the table of requests that have been dispatched but
//! not yet answered. One instance is created per process and shared behind an
//! `Arc`; the counter is atomic and the table is mutex-guarded, so concurrent
//! tests can use it freely.
//!
//! # Example
//!
//! ```rust,ignore
//! let id = logger.begin("API 1: Get All Products List", HttpMethod::Get, &url);
//! // ... network call ...
//! logger.complete(id, 200, Some(386));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{error, warn};

use super::{LogLevel, LogStore};
use crate::request::HttpMethod;

/// A dispatched request still waiting for its response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub request_id: u64,
    pub test_title: String,
    pub method: HttpMethod,
    pub endpoint: String,
    pub started_at: DateTime<Utc>,
}

/// Allocates request ids and pairs requests with their responses in the log.
pub struct CorrelationLogger {
    store: LogStore,
    counter: AtomicU64,
    pending: Mutex<HashMap<u64, PendingRequest>>,
}

impl CorrelationLogger {
    /// Creates a logger writing to the given store.
    pub fn new(store: LogStore) -> Self {
        Self {
            store,
            counter: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Writes an entry. Store failures are reported through tracing, never returned.
    pub fn log(&self, level: LogLevel, message: &str) {
        if let Err(e) = self.store.append(level, message) {
            error!(error = %e, path = %self.store.path().display(), "Failed to write log entry");
        }
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn request(&self, message: &str) {
        self.log(LogLevel::Request, message);
    }

    pub fn response(&self, message: &str) {
        self.log(LogLevel::Response, message);
    }

    /// Registers an outbound request and logs it. Returns its correlation id.
    ///
    /// Ids start at 1 and strictly increase for the lifetime of the logger.
    pub fn begin(&self, test_title: &str, method: HttpMethod, endpoint: &str) -> u64 {
        let request_id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;

        self.pending.lock().insert(
            request_id,
            PendingRequest {
                request_id,
                test_title: test_title.to_string(),
                method,
                endpoint: endpoint.to_string(),
                started_at: Utc::now(),
            },
        );

        self.request(&format!(
            "[{}] {} request #{} to: {}",
            test_title, method, request_id, endpoint
        ));
        request_id
    }

    /// Pairs a response with its request and logs the status line.
    ///
    /// An unknown id (never issued, or already completed) is logged as an
    /// error and otherwise ignored.
    pub fn complete(&self, request_id: u64, status: u16, elapsed_ms: Option<u64>) {
        let Some(request) = self.pending.lock().remove(&request_id) else {
            warn!(request_id, "Response logged for unknown request");
            self.error(&format!("Missing response mapping for ID: {}", request_id));
            return;
        };

        let timing = elapsed_ms
            .map(|ms| format!(" ({}ms)", ms))
            .unwrap_or_default();
        self.log(
            LogLevel::for_status(status),
            &format!(
                "[{}] Response #{} status: {}{}",
                request.test_title, request_id, status, timing
            ),
        );
    }

    /// Clears a request whose attempt failed before any response arrived.
    pub fn fail(&self, request_id: u64, reason: &str) {
        let Some(request) = self.pending.lock().remove(&request_id) else {
            warn!(request_id, "Failure logged for unknown request");
            self.error(&format!("Missing response mapping for ID: {}", request_id));
            return;
        };

        self.error(&format!(
            "[{}] Request #{} {} {} failed: {}",
            request.test_title, request_id, request.method, request.endpoint, reason
        ));
    }

    /// Number of requests still awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Removes and returns every unanswered request, oldest id first.
    pub fn take_orphans(&self) -> Vec<PendingRequest> {
        let mut orphans: Vec<PendingRequest> =
            self.pending.lock().drain().map(|(_, request)| request).collect();
        orphans.sort_by_key(|request| request.request_id);
        orphans
    }

    /// Logs a warning for every unanswered request and returns how many there were.
    pub fn report_orphans(&self) -> usize {
        let orphans = self.take_orphans();
        for request in &orphans {
            warn!(
                request_id = request.request_id,
                test = %request.test_title,
                "Request never received a response"
            );
            self.warn(&format!(
                "[{}] No response logged for request #{} ({} {}, started {})",
                request.test_title,
                request.request_id,
                request.method,
                request.endpoint,
                request.started_at.format("%H:%M:%S%.3f")
            ));
        }
        orphans.len()
    }
}
