//! Parallel suite execution.
//!
//! [`SuiteRunner`] runs [`TestCase`]s on a bounded worker pool: every case is
//! spawned onto a `JoinSet` and waits for a semaphore permit before it starts,
//! so at most `workers` cases are in flight. Each case runs under the per-test
//! deadline with its own [`TestContext`]. The report lists results in the
//! order the cases were given, whatever order they finished in.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use apicheck_harness::logging::ConsoleSink;
use apicheck_harness::{
    CorrelationLogger, HarnessConfig, HarnessError, HarnessResult, LogLevel, LogStore,
    RequestExecutor, RunLifecycle, build_http_client,
};
use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::context::TestContext;
use crate::data::TestData;
use crate::schema::SchemaValidator;

/// The body of a test case.
pub type CaseFn = fn(TestContext) -> BoxFuture<'static, HarnessResult<()>>;

/// A named, runnable test.
#[derive(Clone, Copy)]
pub struct TestCase {
    pub title: &'static str,
    pub run: CaseFn,
}

impl TestCase {
    pub const fn new(title: &'static str, run: CaseFn) -> Self {
        Self { title, run }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("title", &self.title).finish()
    }
}

/// How a test ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed {
        /// [`HarnessError::category`] of the failure.
        category: &'static str,
        message: String,
    },
}

impl TestOutcome {
    fn from_error(err: &HarnessError) -> Self {
        TestOutcome::Failed {
            category: err.category(),
            message: err.to_string(),
        }
    }
}

/// Result of one test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub title: String,
    pub outcome: TestOutcome,
    pub elapsed: Duration,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.outcome == TestOutcome::Passed
    }
}

/// Results of a suite run, in declared order.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub results: Vec<TestResult>,
    pub elapsed: Duration,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// True when every test passed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Looks up a result by title.
    pub fn result(&self, title: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.title == title)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            match &result.outcome {
                TestOutcome::Passed => writeln!(
                    f,
                    "  PASS  {} ({}ms)",
                    result.title,
                    result.elapsed.as_millis()
                )?,
                TestOutcome::Failed { category, message } => {
                    let first_line = message.lines().next().unwrap_or_default();
                    writeln!(
                        f,
                        "  FAIL  {} ({}ms) [{}] {}",
                        result.title,
                        result.elapsed.as_millis(),
                        category,
                        first_line
                    )?
                }
            }
        }
        write!(
            f,
            "{} passed, {} failed in {:.1}s",
            self.passed(),
            self.failed(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Runs test cases concurrently against one target.
pub struct SuiteRunner {
    executor: RequestExecutor,
    workers: usize,
    test_timeout: Duration,
    validator: Arc<SchemaValidator>,
    data: Arc<TestData>,
}

impl SuiteRunner {
    /// Creates a runner from the run configuration and shared services.
    pub fn new(
        config: &HarnessConfig,
        logger: Arc<CorrelationLogger>,
        validator: Arc<SchemaValidator>,
        data: Arc<TestData>,
    ) -> HarnessResult<Self> {
        let executor = RequestExecutor::new(
            build_http_client(config)?,
            config.base_url.clone(),
            "suite",
            logger,
            config.retry_policy(),
        );
        Ok(Self {
            executor,
            workers: config.workers.max(1),
            test_timeout: config.test_timeout(),
            validator,
            data,
        })
    }

    /// Overrides the per-test deadline.
    pub fn with_test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = timeout;
        self
    }

    /// A fresh context for the test titled `title`.
    pub fn context(&self, title: &str) -> TestContext {
        TestContext::new(
            self.executor.with_title(title),
            Arc::clone(&self.validator),
            Arc::clone(&self.data),
        )
    }

    /// Runs every case and reports the results in the order given.
    pub async fn run(&self, cases: Vec<TestCase>) -> SuiteReport {
        let started = Instant::now();
        let total = cases.len();
        info!(tests = total, workers = self.workers, "Running suite");
        self.executor.logger().info(&format!(
            "Running {} tests with {} workers against {}",
            total,
            self.workers,
            self.executor.base_url()
        ));

        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut spawned = HashMap::new();

        for (index, case) in cases.into_iter().enumerate() {
            let context = self.context(case.title);
            let permits = Arc::clone(&permits);
            let deadline = self.test_timeout;
            let handle = tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, execute(case, context, deadline).await)
            });
            spawned.insert(handle.id(), (index, case.title));
        }

        let mut slots: Vec<Option<TestResult>> = vec![None; total];
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (index, result))) => slots[index] = Some(result),
                Err(err) => {
                    let Some(&(index, title)) = spawned.get(&err.id()) else {
                        continue;
                    };
                    warn!(test = title, error = %err, "Test task did not complete");
                    self.executor
                        .logger()
                        .error(&format!("[{}] FAIL [aborted]: {}", title, err));
                    slots[index] = Some(TestResult {
                        title: title.to_string(),
                        outcome: TestOutcome::Failed {
                            category: "aborted",
                            message: err.to_string(),
                        },
                        elapsed: Duration::ZERO,
                    });
                }
            }
        }

        let report = SuiteReport {
            results: slots.into_iter().flatten().collect(),
            elapsed: started.elapsed(),
        };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Suite finished"
        );
        report
    }
}

async fn execute(case: TestCase, context: TestContext, deadline: Duration) -> TestResult {
    context.log(LogLevel::Info, "Test started");
    let started = Instant::now();

    let outcome = match tokio::time::timeout(deadline, (case.run)(context.clone())).await {
        Ok(Ok(())) => TestOutcome::Passed,
        Ok(Err(err)) => TestOutcome::from_error(&err),
        Err(_) => TestOutcome::from_error(&HarnessError::Timeout { deadline }),
    };
    let elapsed = started.elapsed();

    match &outcome {
        TestOutcome::Passed => context.log(
            LogLevel::Success,
            &format!("PASS ({}ms)", elapsed.as_millis()),
        ),
        TestOutcome::Failed { category, message } => context.log(
            LogLevel::Error,
            &format!("FAIL [{}] ({}ms): {}", category, elapsed.as_millis(), message),
        ),
    }

    TestResult {
        title: case.title.to_string(),
        outcome,
        elapsed,
    }
}

/// Runs a complete suite: loads the fixtures, opens the run log, executes
/// the cases and finalizes the log.
///
/// Fixture and log setup failures are returned before any test starts. Test
/// failures are reported in the [`SuiteReport`], never as an error.
pub async fn run_suite(
    config: &HarnessConfig,
    cases: Vec<TestCase>,
    console: ConsoleSink,
) -> HarnessResult<SuiteReport> {
    let data = Arc::new(TestData::open(&config.data_path)?);
    let validator = Arc::new(SchemaValidator::new()?);

    let store = LogStore::with_console(config.log_file_path(), config.run_id(), console)?;
    let logger = Arc::new(CorrelationLogger::new(store));
    let runner = SuiteRunner::new(config, Arc::clone(&logger), validator, data)?;

    let lifecycle = RunLifecycle::new(logger);
    lifecycle.start();
    let report = runner.run(cases).await;
    lifecycle.stop();

    Ok(report)
}
