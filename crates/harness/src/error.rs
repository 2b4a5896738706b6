//! Harness error types

use std::time::Duration;

use thiserror::Error;
use wisent_domain::DomainError;

/// Errors that abort a whole test or benchmark run.
///
/// Per-request failures are not represented here: they reach the assertion
/// callback as [`TransportError`](crate::ports::TransportError) values.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The readiness probe did not see a 200 response in time.
    #[error("health check timeout reached after {timeout:?}")]
    ReadinessTimeout {
        /// The configured probe timeout.
        timeout: Duration,
    },

    /// The run was cancelled while the readiness probe was polling.
    #[error("readiness probe cancelled")]
    ReadinessCancelled,

    /// The readiness probe could not build its request.
    #[error("readiness probe request: {0}")]
    ProbeRequest(String),

    /// The default HTTP transport could not be built.
    #[error("transport setup failed: {0}")]
    TransportSetup(String),

    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl HarnessError {
    /// Returns true if the error came from readiness gating.
    #[must_use]
    pub const fn is_readiness(&self) -> bool {
        matches!(
            self,
            Self::ReadinessTimeout { .. } | Self::ReadinessCancelled | Self::ProbeRequest(_)
        )
    }
}

/// Result type alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_classification() {
        let timeout = HarnessError::ReadinessTimeout {
            timeout: Duration::from_secs(5),
        };
        assert!(timeout.is_readiness());
        assert_eq!(timeout.to_string(), "health check timeout reached after 5s");

        let domain = HarnessError::from(DomainError::InvalidUrl("nope".to_string()));
        assert!(!domain.is_readiness());
    }
}
