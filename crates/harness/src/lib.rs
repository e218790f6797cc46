//! # apicheck-harness - HTTP execution core for API test suites
//!
//! This crate drives HTTP calls against a REST API on behalf of test cases,
//! retries transport failures, and keeps an audit log that pairs every request
//! with its response even when many tests run concurrently.
//!
//! ## Features
//!
//! - **Request Executor**: GET payloads as query parameters, other methods as
//!   JSON or form bodies with a `Referer` header; bodies parsed as JSON with a
//!   raw-text fallback
//! - **Retry Policy**: bounded exponential backoff on transport failures only
//! - **Correlation Logger**: monotonic request ids, request/response pairing,
//!   orphan detection
//! - **Log Finalizer**: idempotent end-of-run regrouping of the log per test
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use apicheck_harness::{
//!     build_http_client, CorrelationLogger, HarnessConfig, LogStore, RequestExecutor,
//!     RunLifecycle, to_payload,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = HarnessConfig::from_env();
//!     let store = LogStore::open(config.log_file_path(), config.run_id())?;
//!     let logger = Arc::new(CorrelationLogger::new(store));
//!     let lifecycle = RunLifecycle::new(Arc::clone(&logger));
//!     lifecycle.start();
//!
//!     let executor = RequestExecutor::new(
//!         build_http_client(&config)?,
//!         config.base_url.clone(),
//!         "smoke",
//!         Arc::clone(&logger),
//!         config.retry_policy(),
//!     );
//!     let response = executor.get("/productsList", &to_payload(serde_json::json!({}))).await?;
//!     println!("{}", response.status);
//!
//!     lifecycle.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Run configuration (flags and environment variables)
//! - [`error`] - Error taxonomy
//! - [`request`] - Outbound request model and normalized results
//! - [`retry`] - Backoff policy
//! - [`executor`] - Request execution
//! - [`logging`] - Log store, correlation and finalization
//! - [`lifecycle`] - Run start/stop hook

// Enforce documentation
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod logging;
pub mod request;
pub mod retry;

// Re-export commonly used types
pub use config::HarnessConfig;
pub use error::{
    AssertionError, ConfigurationError, HarnessError, HarnessResult, SchemaValidationError,
    TransportError, TransportErrorKind,
};
pub use executor::RequestExecutor;
pub use lifecycle::RunLifecycle;
pub use logging::{CorrelationLogger, LogLevel, LogStore};
pub use request::{ApiResponse, ContentMode, HttpMethod, Payload, ResponseBody, to_payload};
pub use retry::RetryPolicy;

/// Builds the HTTP client shared by every executor of a run.
pub fn build_http_client(config: &HarnessConfig) -> HarnessResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("apicheck/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()).into())
}

/// Initializes the tracing subscriber for diagnostics.
///
/// Diagnostics go to stderr; stdout carries the audit log echo.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("apicheck={level},apicheck_harness={level}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
