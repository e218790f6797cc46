//! Per-test fixture bundle.

use std::sync::Arc;

use apicheck_harness::{ApiResponse, HarnessResult, LogLevel, RequestExecutor};

use crate::assertions::assert_response;
use crate::clients::{BrandsClient, ProductsClient, UserClient};
use crate::data::{Row, TestData};
use crate::schema::{SchemaName, SchemaValidator};

/// Everything one test needs: an executor tagged with the test's title plus
/// the run-wide schema validator and fixture data.
///
/// Built fresh for every test by the suite runner.
#[derive(Clone)]
pub struct TestContext {
    executor: RequestExecutor,
    validator: Arc<SchemaValidator>,
    data: Arc<TestData>,
}

impl TestContext {
    pub fn new(
        executor: RequestExecutor,
        validator: Arc<SchemaValidator>,
        data: Arc<TestData>,
    ) -> Self {
        Self {
            executor,
            validator,
            data,
        }
    }

    pub fn title(&self) -> &str {
        self.executor.test_title()
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn data(&self) -> &TestData {
        &self.data
    }

    pub fn products(&self) -> ProductsClient<'_> {
        ProductsClient::new(&self.executor)
    }

    pub fn brands(&self) -> BrandsClient<'_> {
        BrandsClient::new(&self.executor)
    }

    pub fn users(&self) -> UserClient<'_> {
        UserClient::new(&self.executor)
    }

    /// Looks up a fixture row.
    pub fn fixture(&self, sheet: &str, test_case: &str) -> HarnessResult<&Row> {
        Ok(self.data.find_case(sheet, test_case)?)
    }

    /// Logs a message under this test's title.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.executor.log(level, message);
    }

    /// Checks a response against the expectations in `row`.
    pub fn check_response(&self, response: &ApiResponse, row: &Row) -> HarnessResult<()> {
        self.check(
            response,
            row.expected_status()?,
            row.expected_response_code()?,
            row.expected_message(),
        )
    }

    /// Checks a response against explicit expectations.
    ///
    /// A mismatch is logged as an `AssertionFailed` error line before it is
    /// returned.
    pub fn check(
        &self,
        response: &ApiResponse,
        status: u16,
        response_code: i64,
        message: Option<&str>,
    ) -> HarnessResult<()> {
        assert_response(response, status, response_code, message).map_err(|err| {
            self.log(LogLevel::Error, &format!("AssertionFailed: {}", err));
            err.into()
        })
    }

    /// Validates the response body against a named schema.
    pub fn validate_schema(&self, response: &ApiResponse, schema: SchemaName) -> HarnessResult<()> {
        match self.validator.validate(schema, response) {
            Ok(()) => {
                self.log(
                    LogLevel::Success,
                    &format!(
                        "Schema validation passed for '{}'.",
                        self.validator.title(schema)
                    ),
                );
                Ok(())
            }
            Err(err) => {
                self.log(LogLevel::Error, &err.to_string());
                Err(err.into())
            }
        }
    }
}
