//! Fixture paths and run configuration.

use std::path::PathBuf;
use std::sync::Arc;

use apicheck::{SchemaValidator, SuiteRunner, TestData};
use apicheck_harness::{CorrelationLogger, HarnessConfig, LogStore};
use tempfile::TempDir;

/// The fixture workbook shipped with the repository.
pub fn workbook_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("data")
        .join("api_data")
}

/// The same fixtures as a spreadsheet workbook.
pub fn workbook_file() -> PathBuf {
    workbook_dir().with_file_name("apiData.xlsx")
}

/// A run configuration pointing at `base_url`, logging into `logs`.
pub fn config(base_url: &str, logs: &TempDir) -> HarnessConfig {
    let mut config = HarnessConfig::for_testing(base_url, logs.path());
    config.data_path = workbook_dir();
    config.workers = 4;
    config
}

/// A runner over the shipped workbook with its own log, plus that logger.
pub fn runner(config: &HarnessConfig) -> (SuiteRunner, Arc<CorrelationLogger>) {
    let store = LogStore::with_console(
        config.log_file_path(),
        config.run_id(),
        Box::new(std::io::sink()),
    )
    .expect("Failed to open log store");
    let logger = Arc::new(CorrelationLogger::new(store));
    let runner = SuiteRunner::new(
        config,
        Arc::clone(&logger),
        Arc::new(SchemaValidator::new().expect("Embedded schemas parse")),
        Arc::new(TestData::open(&config.data_path).expect("Workbook loads")),
    )
    .expect("Failed to build runner");
    (runner, logger)
}
