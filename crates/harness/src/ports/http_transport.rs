//! HTTP transport port

use thiserror::Error;
use wisent_domain::{HttpResponse, RequestDescriptor};

use super::BoxFuture;

/// What sending one request produces: a drained response or a transport error.
pub type ExecResult = Result<HttpResponse, TransportError>;

/// Network-level failures while sending a request.
///
/// These never abort a run. They are handed to the assertion callback,
/// which decides whether the case or iteration fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The target URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// Nothing was listening on the target port.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The host name could not be resolved.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The connection could not be established for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be read.
    #[error("failed to read body: {0}")]
    Body(String),

    /// The request was abandoned because the run was cancelled.
    #[error("request cancelled")]
    Cancelled,

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns true if nothing answered at the network level.
    #[must_use]
    pub const fn is_connect(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRefused { .. } | Self::DnsError { .. } | Self::ConnectionFailed(_)
        )
    }
}

/// Port for sending HTTP requests.
///
/// One transport is shared by every case, iteration and parallel worker of
/// a harness, so implementations must be safe for concurrent use. The
/// transport drains the response body before returning, which releases the
/// connection back to its pool.
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns the drained response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request could not be sent or the
    /// response could not be read.
    fn execute(&self, request: RequestDescriptor) -> BoxFuture<'_, ExecResult>;
}
