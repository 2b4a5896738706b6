//! Retry with linear backoff.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use wisent_domain::RequestDescriptor;

use crate::Harness;
use crate::ports::{CancellationReceiver, ExecResult, RequestExecutor};

/// Retries transport errors with a linearly growing delay.
///
/// After failed attempt `i` (counting from zero) the executor sleeps
/// `i * base_sleep`, so the first retry is immediate. Responses are never
/// retried, whatever their status; only transport errors are. When every
/// attempt fails the last error is returned unchanged.
///
/// The backoff sleep races the run's cancellation signal. On cancellation
/// the error of the latest attempt is returned without further attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleRetry {
    max_attempts: u32,
    base_sleep: Duration,
}

impl SimpleRetry {
    /// Creates a retry strategy making at most `max_attempts` sends
    /// (at least one).
    #[must_use]
    pub fn new(max_attempts: u32, base_sleep: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_sleep,
        }
    }

    /// Maximum number of sends per request.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the failed attempt with zero-based index `attempt`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_sleep.saturating_mul(attempt)
    }
}

#[async_trait]
impl RequestExecutor for SimpleRetry {
    async fn execute(
        &self,
        harness: &Harness,
        request: RequestDescriptor,
        cancel: &CancellationReceiver,
    ) -> ExecResult {
        let mut attempt = 0;
        loop {
            debug!(request_id = %request.id, attempt = attempt + 1, "Performing the request");
            let error = match harness.transport().execute(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            if attempt + 1 >= self.max_attempts {
                warn!(
                    request_id = %request.id,
                    attempts = self.max_attempts,
                    error = %error,
                    "Giving up on the request"
                );
                return Err(error);
            }

            let delay = self.backoff(attempt);
            warn!(
                request_id = %request.id,
                attempt = attempt + 1,
                error = %error,
                sleep_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Error performing request, sleeping"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(request_id = %request.id, "Run cancelled during backoff");
                    return Err(error);
                }
                () = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}
