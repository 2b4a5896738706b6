//! Request executor port

use async_trait::async_trait;
use wisent_domain::RequestDescriptor;

use super::{CancellationReceiver, ExecResult};
use crate::Harness;

/// Strategy for executing a single request.
///
/// This is the extension point for cross-cutting request behavior: retries,
/// auth injection, circuit breaking. Implementations send through
/// [`Harness::transport`] and may consult `cancel` at their own blocking
/// points.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Executes `request` against the harness transport.
    async fn execute(
        &self,
        harness: &Harness,
        request: RequestDescriptor,
        cancel: &CancellationReceiver,
    ) -> ExecResult;
}
