//! Harness configuration.
//!
//! Every setting can be given on the command line or through an environment
//! variable; the table below lists the variables and their defaults.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BASE_URL` | https://automationexercise.com/api | Target API base URL |
//! | `LOG_DIR` | logs | Directory for run logs |
//! | `LOG_RUN_ID` | generated | Run identifier (names the log file) |
//! | `API_DATA_PATH` | data/apiData.xlsx | Fixture workbook (or a directory of CSV sheets) |
//! | `API_WORKERS` | 4 | Tests run in parallel |
//! | `API_TEST_TIMEOUT` | 90 | Per-test deadline (seconds) |
//! | `API_REQUEST_TIMEOUT` | 30 | Per-attempt HTTP timeout (seconds) |
//! | `API_RETRIES` | 2 | Retries after the first attempt |
//! | `API_RETRY_FACTOR` | 2 | Backoff multiplier |
//! | `API_RETRY_MIN_DELAY_MS` | 300 | First backoff delay |
//! | `API_RETRY_MAX_DELAY_MS` | 1000 | Backoff cap |
//! | `API_LOG_LEVEL` | info | Diagnostic log level |
//!
//! # Example
//!
//! ```rust
//! use apicheck_harness::HarnessConfig;
//!
//! let mut config = HarnessConfig::default();
//! config.workers = 2;
//! assert!(config.validate().is_ok());
//! assert!(config.log_file_path().starts_with("logs"));
//! ```

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use clap::Parser;
use tracing::warn;

use crate::error::ConfigurationError;
use crate::retry::RetryPolicy;

/// Fallback target when `BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://automationexercise.com/api";

/// Configuration for a test run.
#[derive(Debug, Clone, Parser)]
#[command(name = "apicheck")]
#[command(about = "Data-driven REST API test runner")]
pub struct HarnessConfig {
    /// Base URL of the API under test.
    #[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory holding run logs.
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Run identifier; generated from the current time when absent.
    #[arg(long, env = "LOG_RUN_ID")]
    pub run_id: Option<String>,

    /// Fixture workbook, or a directory containing one CSV file per sheet.
    #[arg(long, env = "API_DATA_PATH", default_value = "data/apiData.xlsx")]
    pub data_path: PathBuf,

    /// Number of tests executed in parallel.
    #[arg(short, long, env = "API_WORKERS", default_value = "4")]
    pub workers: usize,

    /// Overall deadline for a single test, in seconds.
    #[arg(long, env = "API_TEST_TIMEOUT", default_value = "90")]
    pub test_timeout: u64,

    /// Timeout for a single HTTP attempt, in seconds.
    #[arg(long, env = "API_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Retries after the first attempt on transport failure.
    #[arg(long, env = "API_RETRIES", default_value = "2")]
    pub retries: u32,

    /// Backoff multiplier between retries.
    #[arg(long, env = "API_RETRY_FACTOR", default_value = "2")]
    pub retry_factor: f64,

    /// Delay before the first retry, in milliseconds.
    #[arg(long, env = "API_RETRY_MIN_DELAY_MS", default_value = "300")]
    pub retry_min_delay_ms: u64,

    /// Upper bound for a retry delay, in milliseconds.
    #[arg(long, env = "API_RETRY_MAX_DELAY_MS", default_value = "1000")]
    pub retry_max_delay_ms: u64,

    /// Diagnostic log level (error, warn, info, debug, trace).
    #[arg(long, env = "API_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(skip)]
    generated_run_id: OnceLock<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_dir: PathBuf::from("logs"),
            run_id: None,
            data_path: PathBuf::from("data/apiData.xlsx"),
            workers: 4,
            test_timeout: 90,
            request_timeout: 30,
            retries: 2,
            retry_factor: 2.0,
            retry_min_delay_ms: 300,
            retry_max_delay_ms: 1000,
            log_level: "info".to_string(),
            generated_run_id: OnceLock::new(),
        }
    }
}

impl HarnessConfig {
    /// Reads the configuration from the environment.
    ///
    /// Any malformed variable falls back to the full default configuration,
    /// with a warning naming the problem. Use [`try_from_env`](Self::try_from_env)
    /// to reject it instead.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring environment configuration; using defaults");
            Self::default()
        })
    }

    /// Reads the configuration from the environment, failing on malformed values.
    pub fn try_from_env() -> Result<Self, ConfigurationError> {
        Self::try_from_args(["apicheck"])
    }

    fn try_from_args<I, T>(args: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| ConfigurationError::Invalid(vec![e.to_string()]))
    }

    /// The run identifier: configured, or generated once and then reused.
    pub fn run_id(&self) -> &str {
        match &self.run_id {
            Some(id) => id,
            None => self.generated_run_id.get_or_init(generate_run_id),
        }
    }

    /// Path of this run's log file: `<log_dir>/Api_<run_id>.log`.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(format!("Api_{}.log", self.run_id()))
    }

    /// Retry policy derived from the retry settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            factor: self.retry_factor,
            min_delay: Duration::from_millis(self.retry_min_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    /// Per-attempt HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Per-test deadline.
    pub fn test_timeout(&self) -> Duration {
        Duration::from_secs(self.test_timeout)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = url::Url::parse(&self.base_url) {
            errors.push(format!("Base URL {} is invalid: {}", self.base_url, e));
        }

        if self.workers == 0 {
            errors.push("Workers cannot be 0".to_string());
        }

        if self.test_timeout == 0 {
            errors.push("Test timeout cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.retry_factor < 1.0 {
            errors.push("Retry factor cannot be below 1".to_string());
        }

        if self.retry_min_delay_ms == 0 {
            errors.push("Minimum retry delay cannot be 0".to_string());
        }

        if self.retry_min_delay_ms > self.retry_max_delay_ms {
            errors.push("Minimum retry delay cannot exceed maximum retry delay".to_string());
        }

        if matches!(&self.run_id, Some(id) if id.trim().is_empty()) {
            errors.push("Run ID cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing against a local server.
    ///
    /// Uses a single short retry delay and small timeouts so failing paths
    /// finish quickly.
    pub fn for_testing(base_url: &str, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.to_string(),
            log_dir: log_dir.into(),
            run_id: Some("test-run".to_string()),
            workers: 2,
            test_timeout: 10,
            request_timeout: 5,
            retry_min_delay_ms: 10,
            retry_max_delay_ms: 20,
            log_level: "debug".to_string(),
            ..Default::default()
        }
    }
}

/// A run id from the current UTC time, e.g. `2026-10-19T09-15-02-417Z`.
pub fn generate_run_id() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-")
}
