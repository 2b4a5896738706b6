//! Readiness probe port

use async_trait::async_trait;

use super::CancellationReceiver;
use crate::{Harness, HarnessResult};

/// Blocks until the service under test is ready to receive requests.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Waits for readiness.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ReadinessTimeout`](crate::HarnessError::ReadinessTimeout)
    /// or [`HarnessError::ReadinessCancelled`](crate::HarnessError::ReadinessCancelled)
    /// when the service does not become ready.
    async fn probe(&self, cancel: &CancellationReceiver, harness: &Harness) -> HarnessResult<()>;
}
