//! Single direct send, the default strategy.

use async_trait::async_trait;
use tracing::debug;
use wisent_domain::RequestDescriptor;

use crate::Harness;
use crate::ports::{CancellationReceiver, ExecResult, RequestExecutor};

/// Sends the request once through the harness transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExecutor;

#[async_trait]
impl RequestExecutor for DirectExecutor {
    async fn execute(
        &self,
        harness: &Harness,
        request: RequestDescriptor,
        _cancel: &CancellationReceiver,
    ) -> ExecResult {
        debug!(request_id = %request.id, method = %request.method, url = %request.url, "Performing the request");
        harness.transport().execute(request).await
    }
}
