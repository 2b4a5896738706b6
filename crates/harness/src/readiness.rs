//! HTTP health check readiness probe.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::ports::{CancellationReceiver, ReadinessProbe};
use crate::{Harness, HarnessError, HarnessResult};

/// Polls a health endpoint with GET requests until it answers 200 OK.
///
/// Polling stops when:
/// - a 200 response is received (ready),
/// - the run is cancelled ([`HarnessError::ReadinessCancelled`]),
/// - `timeout` has elapsed since the first attempt
///   ([`HarnessError::ReadinessTimeout`]).
///
/// Any other status, including other 2xx codes, means "not ready yet".
/// Each attempt is a fresh request, bounded by the time left before the
/// deadline, so the probe gives up within `timeout + interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckProbe {
    path: String,
    timeout: Duration,
    interval: Duration,
}

impl HealthCheckProbe {
    /// Creates a probe for `path` (relative to the harness base URL).
    #[must_use]
    pub fn new(path: impl Into<String>, timeout: Duration, interval: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
            interval,
        }
    }

    /// The probed path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl ReadinessProbe for HealthCheckProbe {
    async fn probe(&self, cancel: &CancellationReceiver, harness: &Harness) -> HarnessResult<()> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(attempt, path = %self.path, "Checking readiness");

            let request = harness.get(&self.path);
            request
                .parse_url()
                .map_err(|e| HarnessError::ProbeRequest(e.to_string()))?;

            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, harness.transport().execute(request)).await {
                Ok(Ok(response)) if response.status == 200 => {
                    info!(
                        attempt,
                        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Service is ready"
                    );
                    return Ok(());
                }
                Ok(Ok(response)) => debug!(status = response.status, "Service not ready yet"),
                Ok(Err(error)) => debug!(error = %error, "Readiness request failed"),
                Err(_) => debug!("Readiness request ran into the probe deadline"),
            }

            if cancel.is_cancelled() {
                return Err(HarnessError::ReadinessCancelled);
            }
            if started.elapsed() >= self.timeout {
                return Err(HarnessError::ReadinessTimeout {
                    timeout: self.timeout,
                });
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(HarnessError::ReadinessCancelled),
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
