//! Error types for the API test harness.
//!
//! This module defines the failure taxonomy shared by the execution core and
//! the suite built on top of it. Only transport-level failures are retried;
//! everything else surfaces to the test case immediately.
//!
//! # Error Taxonomy
//!
//! | Error | Raised by | Retried | Effect |
//! |-------|-----------|---------|--------|
//! | Transport | request executor | yes | test fails after retries are exhausted |
//! | HttpErrorResponse | caller opt-in | no | test fails |
//! | SchemaValidation | schema validator | no | test fails |
//! | Assertion | response assertions | no | test fails |
//! | Configuration | config / fixture loading | no | suite setup fails |
//! | Timeout | suite runner | no | test fails |

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the harness.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// The umbrella error for every harness operation.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Network or connection failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A non-2xx response the caller chose to treat as a failure.
    #[error("HTTP {status} response: {body}")]
    HttpErrorResponse { status: u16, body: String },

    /// Response shape violates its contract.
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    /// Expected vs actual mismatch.
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// Missing or unreadable configuration or fixture data.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The persistent log could not be read or written.
    #[error("log store error: {0}")]
    Log(#[from] std::io::Error),

    /// A test exceeded its overall deadline.
    #[error("test exceeded its {deadline:?} deadline")]
    Timeout { deadline: Duration },
}

impl HarnessError {
    /// Returns true when the failure is transport-level and may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HarnessError::Transport(_))
    }

    /// Short category name used in log lines and reports.
    pub fn category(&self) -> &'static str {
        match self {
            HarnessError::Transport(_) => "transport",
            HarnessError::HttpErrorResponse { .. } => "http-error-response",
            HarnessError::SchemaValidation(_) => "schema-validation",
            HarnessError::Assertion(_) => "assertion",
            HarnessError::Configuration(_) => "configuration",
            HarnessError::Log(_) => "log",
            HarnessError::Timeout { .. } => "timeout",
        }
    }
}

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not connect to the remote host.
    Connect,
    /// The attempt timed out.
    Timeout,
    /// The request could not be sent.
    Request,
    /// The response body could not be received.
    Body,
    /// Anything else reported by the HTTP client.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A network-level failure. The only retryable error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport error ({kind}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    /// Creates a transport error of the given kind.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else if err.is_request() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// A response body violated its named schema.
#[derive(Error, Debug, Clone)]
#[error("Schema validation failed for '{schema}':\n{}", .errors.join("\n"))]
pub struct SchemaValidationError {
    pub schema: String,
    pub errors: Vec<String>,
}

/// One or more expected-vs-actual mismatches on a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .mismatches.join(" | "))]
pub struct AssertionError {
    pub mismatches: Vec<String>,
}

/// Configuration and fixture-data failures, fatal at suite setup.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error(
        "could not open test data at {path}: {reason}. Set environment variable API_DATA_PATH \
         to a valid Excel workbook or a directory of <Sheet>.csv files, or place apiData.xlsx in data/"
    )]
    DataSourceUnavailable { path: String, reason: String },

    #[error("sheet \"{sheet}\" not found in test data")]
    SheetNotFound { sheet: String },

    #[error("test case \"{test_case}\" not found in sheet \"{sheet}\"")]
    TestCaseNotFound { sheet: String, test_case: String },

    #[error("invalid value for \"{field}\" in test case \"{test_case}\": {reason}")]
    InvalidField {
        test_case: String,
        field: String,
        reason: String,
    },

    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
