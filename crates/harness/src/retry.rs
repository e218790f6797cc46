//! Bounded exponential-backoff retry.
//!
//! Only errors for which [`HarnessError::is_retryable`] holds are retried. A
//! received HTTP response, whatever its status, is a normal return value.
//!
//! With the defaults (2 retries, factor 2, 300ms..1000ms) a request is tried at
//! most three times, sleeping 300ms and then 600ms between attempts.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::HarnessResult;
use crate::logging::CorrelationLogger;

/// Retry settings for one logical request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Multiplier applied to the delay after each failed attempt.
    pub factor: f64,
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            factor: 2.0,
            min_delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            retries: 0,
            ..Self::default()
        }
    }

    /// Total number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.min_delay.as_millis() as f64 * self.factor.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.round() as u64)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are exhausted. The last error is returned unchanged.
    ///
    /// Every failed attempt is logged as an error tagged with `test_title`;
    /// every retry is announced before it starts.
    pub async fn run<T, F, Fut>(
        &self,
        logger: &CorrelationLogger,
        test_title: &str,
        description: &str,
        mut op: F,
    ) -> HarnessResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = HarnessResult<T>>,
    {
        let mut attempt = 1;
        loop {
            if attempt > 1 {
                logger.info(&format!(
                    "[{}] Retry attempt {} for {}",
                    test_title, attempt, description
                ));
            }

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    logger.error(&format!(
                        "[{}] Attempt {} failed: {} | {}",
                        test_title, attempt, description, err
                    ));

                    if !err.is_retryable() || attempt >= self.max_attempts() {
                        return Err(err);
                    }

                    let delay = self.delay_for(attempt);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, %description, "Backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
