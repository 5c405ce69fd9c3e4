//! Retry with linearly growing backoff
//!
//! Transient failures (connection, timeout) wait `base_delay × (attempt + 1)`
//! before the next attempt. When rate-limit retries are enabled, throttled
//! calls wait twice as long. Everything else fails immediately.

use crate::error::{ClientError, ClientResult, LLMError};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Delay unit; attempt `n` (0-based) waits `base_delay × (n + 1)`
    pub base_delay: Duration,

    /// Whether rate-limited calls are retried with doubled backoff
    pub retry_rate_limits: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            retry_rate_limits: true,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            retry_rate_limits: true,
        }
    }

    /// Enable or disable rate-limit retries
    pub fn with_rate_limit_retries(mut self, enabled: bool) -> Self {
        self.retry_rate_limits = enabled;
        self
    }

    /// Delay after a transient failure on `attempt` (0-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }

    /// Delay after a rate-limited failure on `attempt` (0-based)
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        self.backoff_delay(attempt) * 2
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.max_attempts == 0 {
            return Err(ClientError::InvalidConfig(
                "max_retries must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Execute an async operation under this policy
    ///
    /// `operation_name` appears in logs and in the connection error message.
    pub async fn execute<F, Fut, T>(
        &self,
        operation_name: &'static str,
        mut operation: F,
    ) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LLMError>>,
    {
        self.validate()?;

        for attempt in 0..self.max_attempts {
            debug!(
                "Attempt {}/{} to {}",
                attempt + 1,
                self.max_attempts,
                operation_name
            );

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("'{}' succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            let is_last = attempt + 1 == self.max_attempts;

            if error.is_transient() {
                if is_last {
                    warn!(
                        "Failed to {} after {} attempts: {}",
                        operation_name, self.max_attempts, error
                    );
                    return Err(ClientError::Connection {
                        operation: operation_name,
                        attempts: self.max_attempts,
                        source: error,
                    });
                }
                let delay = self.backoff_delay(attempt);
                warn!(
                    "Attempt {}/{} to {} failed: {}. Retrying in {:?}",
                    attempt + 1,
                    self.max_attempts,
                    operation_name,
                    error,
                    delay
                );
                sleep(delay).await;
            } else if self.retry_rate_limits && error.is_rate_limited() && !is_last {
                let delay = self.rate_limit_delay(attempt);
                warn!(
                    "Rate limited on attempt {}/{} to {}. Retrying in {:?}",
                    attempt + 1,
                    self.max_attempts,
                    operation_name,
                    delay
                );
                sleep(delay).await;
            } else {
                debug!("'{}' failed with non-retryable error", operation_name);
                return Err(ClientError::Api(error));
            }
        }

        // The loop returns on every path of its final iteration.
        Err(ClientError::InvalidConfig(format!(
            "retry loop for '{operation_name}' ended without an outcome"
        )))
    }
}
