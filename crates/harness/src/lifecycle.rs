//! Lifecycle coordination: cancellation scope plus guaranteed shutdown.

use tracing::{info, warn};

use crate::ports::{CancellationReceiver, CancellationToken, ServiceStarter, ShutdownHandle};

/// Scope of one harness call.
///
/// Owns the call's cancellation token and, when a starter was configured,
/// the running service. [`finish`](Self::finish) cancels the scope and then
/// awaits the shutdown; the runners call it on every exit path, panics
/// included. If the guard is dropped without `finish` because the caller
/// dropped the run future, the drop cancels and spawns the shutdown on the
/// current runtime.
#[derive(Debug)]
pub(crate) struct ServiceGuard {
    token: CancellationToken,
    cancel: CancellationReceiver,
    shutdown: Option<ShutdownHandle>,
}

impl ServiceGuard {
    /// Opens the scope, starting the service if a starter is given.
    pub(crate) async fn start(starter: Option<&dyn ServiceStarter>) -> Self {
        let (token, cancel) = CancellationToken::new();
        let shutdown = match starter {
            Some(starter) => {
                info!("Starting the app");
                Some(starter.start(cancel.clone()).await)
            }
            None => None,
        };
        Self {
            token,
            cancel,
            shutdown,
        }
    }

    /// A receiver for this scope's cancellation signal.
    pub(crate) fn cancellation(&self) -> CancellationReceiver {
        self.cancel.clone()
    }

    /// Cancels the scope and shuts the service down.
    pub(crate) async fn finish(mut self) {
        self.token.cancel();
        if let Some(shutdown) = self.shutdown.take() {
            info!("Shutting down");
            shutdown.shutdown(self.cancel.clone()).await;
        }
    }
}

impl Drop for ServiceGuard {
    fn drop(&mut self) {
        self.token.cancel();
        let Some(shutdown) = self.shutdown.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!("Run ended abruptly, shutting down in the background");
                runtime.spawn(shutdown.shutdown(self.cancel.clone()));
            }
            Err(_) => warn!("Run ended outside a tokio runtime, service left running"),
        }
    }
}
