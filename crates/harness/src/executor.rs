//! Request execution with retry and correlation logging.
//!
//! A [`RequestExecutor`] is bound to one test title. Every attempt:
//!
//! 1. registers the request with the [`CorrelationLogger`] (REQUEST line),
//! 2. performs the network call,
//! 3. logs the payload (when non-empty), the status line and the response
//!    body, all carrying the same correlation id.
//!
//! Elapsed time covers sending the request and receiving the complete body.
//! JSON parsing and all logging happen outside the measured window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{HarnessResult, TransportError};
use crate::logging::{CorrelationLogger, LogLevel, format_block};
use crate::request::{ApiResponse, ContentMode, HttpMethod, OutboundRequest, Payload, ResponseBody};
use crate::retry::RetryPolicy;

/// Executes requests against one base URL on behalf of one test.
#[derive(Clone)]
pub struct RequestExecutor {
    client: reqwest::Client,
    base_url: String,
    test_title: String,
    logger: Arc<CorrelationLogger>,
    retry: RetryPolicy,
}

impl RequestExecutor {
    /// Creates an executor for `test_title`, sharing the client and logger.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        test_title: impl Into<String>,
        logger: Arc<CorrelationLogger>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            test_title: test_title.into(),
            logger,
            retry,
        }
    }

    /// A copy sharing the client, logger and policy, logging under another title.
    pub fn with_title(&self, test_title: impl Into<String>) -> Self {
        Self {
            test_title: test_title.into(),
            ..self.clone()
        }
    }

    /// The test this executor logs for.
    pub fn test_title(&self) -> &str {
        &self.test_title
    }

    /// The target base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The shared logger service.
    pub fn logger(&self) -> &Arc<CorrelationLogger> {
        &self.logger
    }

    /// Logs a message tagged with this executor's test title.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.logger
            .log(level, &format!("[{}] {}", self.test_title, message));
    }

    /// Issues `method` on `endpoint`, retrying transport failures.
    ///
    /// Any received response (including 4xx and 5xx) is returned as data.
    pub async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: &Payload,
        mode: ContentMode,
    ) -> HarnessResult<ApiResponse> {
        let description = format!("{} {}", method, endpoint);
        self.retry
            .run(&self.logger, &self.test_title, &description, |_| {
                self.attempt(method, endpoint, payload, mode)
            })
            .await
    }

    /// GET with `params` as query parameters.
    pub async fn get(&self, endpoint: &str, params: &Payload) -> HarnessResult<ApiResponse> {
        self.execute(HttpMethod::Get, endpoint, params, ContentMode::Json)
            .await
    }

    /// POST with the payload encoded per `mode`.
    pub async fn post(
        &self,
        endpoint: &str,
        payload: &Payload,
        mode: ContentMode,
    ) -> HarnessResult<ApiResponse> {
        self.execute(HttpMethod::Post, endpoint, payload, mode).await
    }

    /// PUT with the payload encoded per `mode`.
    pub async fn put(
        &self,
        endpoint: &str,
        payload: &Payload,
        mode: ContentMode,
    ) -> HarnessResult<ApiResponse> {
        self.execute(HttpMethod::Put, endpoint, payload, mode).await
    }

    /// DELETE with the payload encoded per `mode`.
    pub async fn delete(
        &self,
        endpoint: &str,
        payload: &Payload,
        mode: ContentMode,
    ) -> HarnessResult<ApiResponse> {
        self.execute(HttpMethod::Delete, endpoint, payload, mode)
            .await
    }

    async fn attempt(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: &Payload,
        mode: ContentMode,
    ) -> HarnessResult<ApiResponse> {
        let request = OutboundRequest::build(method, &self.base_url, endpoint, payload, mode)?;
        let request_id = self
            .logger
            .begin(&self.test_title, method, request.url.as_str());

        let (status, bytes, elapsed) = match self.send(request).await {
            Ok(received) => received,
            Err(err) => {
                self.logger.fail(request_id, &err.to_string());
                return Err(err.into());
            }
        };
        let elapsed_ms = elapsed.as_millis() as u64;
        debug!(request_id, status, elapsed_ms, "Response received");

        let body = ResponseBody::parse(&bytes);

        if !payload.is_empty() {
            self.log(
                LogLevel::Info,
                &format!("#{} {}", request_id, format_block("Payload", payload)),
            );
        }
        self.logger.complete(request_id, status, Some(elapsed_ms));
        let body_level = if status >= 400 {
            LogLevel::Error
        } else {
            LogLevel::Response
        };
        self.log(
            body_level,
            &format!("#{} {}", request_id, format_block("Response Data", &body)),
        );

        Ok(ApiResponse { status, body })
    }

    /// The measured network window: send, then read the full body.
    async fn send(
        &self,
        request: OutboundRequest,
    ) -> Result<(u16, Vec<u8>, Duration), TransportError> {
        let builder = request.into_reqwest(&self.client);
        let started = Instant::now();
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok((status, bytes.to_vec(), started.elapsed()))
    }
}
