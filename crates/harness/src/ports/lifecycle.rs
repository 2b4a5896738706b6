//! Service lifecycle port

use std::fmt;
use std::future::Future;

use super::{BoxFuture, CancellationReceiver};

type ShutdownFn = Box<dyn FnOnce(CancellationReceiver) -> BoxFuture<'static, ()> + Send>;

/// Proof that the service under test is running; consuming it stops the service.
pub struct ShutdownHandle {
    shutdown: ShutdownFn,
}

impl ShutdownHandle {
    /// Wraps an async shutdown callback.
    pub fn new<F, Fut>(shutdown: F) -> Self
    where
        F: FnOnce(CancellationReceiver) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            shutdown: Box::new(move |cancel| Box::pin(shutdown(cancel))),
        }
    }

    /// A handle for services that need no explicit shutdown.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_| async {})
    }

    /// Runs the shutdown callback. Consuming `self` makes this a one-shot.
    pub async fn shutdown(self, cancel: CancellationReceiver) {
        (self.shutdown)(cancel).await;
    }
}

impl fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHandle").finish_non_exhaustive()
    }
}

/// Starts the service under test.
///
/// Starting should not block until the service is ready: bind and serve in
/// the background and let the readiness probe observe the result. A start
/// that fails has no error channel; it shows up as a probe timeout.
///
/// Any `Fn(CancellationReceiver) -> impl Future<Output = ShutdownHandle>`
/// closure is a starter.
pub trait ServiceStarter: Send + Sync {
    /// Starts the service; `cancel` fires when the harness run ends.
    fn start(&self, cancel: CancellationReceiver) -> BoxFuture<'_, ShutdownHandle>;
}

impl<F, Fut> ServiceStarter for F
where
    F: Fn(CancellationReceiver) -> Fut + Send + Sync,
    Fut: Future<Output = ShutdownHandle> + Send + 'static,
{
    fn start(&self, cancel: CancellationReceiver) -> BoxFuture<'_, ShutdownHandle> {
        Box::pin(self(cancel))
    }
}
