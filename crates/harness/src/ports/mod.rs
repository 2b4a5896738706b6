//! Port definitions (interfaces)
//!
//! Ports are the seams of the harness: the transport that talks HTTP, the
//! strategy that executes one request, the readiness probe, the service
//! starter and the contexts that receive test and benchmark results.

mod cancellation;
mod context;
mod executor;
mod http_transport;
mod lifecycle;
mod readiness;

use std::future::Future;
use std::pin::Pin;

pub use cancellation::{CancellationReceiver, CancellationToken};
pub use context::{BenchContext, CaseFuture, TestContext};
pub use executor::RequestExecutor;
pub use http_transport::{ExecResult, HttpTransport, TransportError};
pub use lifecycle::{ServiceStarter, ShutdownHandle};
pub use readiness::ReadinessProbe;

/// A boxed, sendable future, the return type of object-safe async ports.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
