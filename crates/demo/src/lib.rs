//! Example "hello" service used to exercise the wisent harness.
//!
//! `GET /health` answers `{"status":"ok"}` and `POST /hello` greets the
//! `name` found in a JSON body. [`HelloApp::starter`] plugs the service
//! into [`wisent::HarnessBuilder::with_start`].

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use wisent::{CancellationReceiver, ServiceStarter, ShutdownHandle};

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// How long shutdown waits for in-flight requests to drain.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors reading the service configuration.
#[derive(Debug, Error)]
pub enum DemoError {
    /// `PORT` is not a valid port number.
    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Deserialize)]
struct HelloRequest {
    #[serde(default)]
    name: String,
}

/// The hello service bound to one address.
#[derive(Debug, Clone, Copy)]
pub struct HelloApp {
    addr: SocketAddr,
}

impl HelloApp {
    /// Creates the service for `addr`.
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Listens on all interfaces at `PORT` (default 8080).
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a port number.
    pub fn from_env() -> Result<Self, DemoError> {
        let port = match std::env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| DemoError::InvalidPort(value))?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self::new(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))))
    }

    /// The address the service binds to.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL clients should use to reach the service.
    #[must_use]
    pub fn base_url(&self) -> String {
        let ip = if self.addr.ip().is_unspecified() {
            Ipv4Addr::LOCALHOST.into()
        } else {
            self.addr.ip()
        };
        format!("http://{}", SocketAddr::new(ip, self.addr.port()))
    }

    /// Binds and serves in the background until `cancel` fires or the
    /// returned handle is consumed.
    ///
    /// A bind failure is logged and yields a no-op handle; callers notice it
    /// through the readiness probe.
    pub async fn start(self, cancel: CancellationReceiver) -> ShutdownHandle {
        let listener = match TcpListener::bind(self.addr).await {
            Ok(listener) => listener,
            Err(err) => {
                error!(addr = %self.addr, error = %err, "Failed to bind");
                return ShutdownHandle::noop();
            }
        };
        info!(addr = %self.addr, "Starting hello server");

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let shutdown = async move {
                tokio::select! {
                    _ = stop_rx => {}
                    () = cancel.cancelled() => {}
                }
                debug!("Hello server received shutdown signal");
            };
            if let Err(err) = axum::serve(listener, router())
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %err, "Hello server failed");
            }
        });

        ShutdownHandle::new(move |_cancel: CancellationReceiver| async move {
            // The receiver is gone if the server already stopped.
            let _ = stop_tx.send(());
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, server).await {
                Ok(Ok(())) => info!("Hello server stopped"),
                Ok(Err(err)) => error!(error = %err, "Hello server task failed"),
                Err(_) => warn!(timeout = ?SHUTDOWN_TIMEOUT, "Hello server did not stop in time"),
            }
        })
    }

    /// The service as a harness starter.
    #[must_use]
    pub fn starter(self) -> impl ServiceStarter {
        move |cancel: CancellationReceiver| self.start(cancel)
    }
}

/// Routes of the hello service.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/hello", post(hello))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn hello(body: Bytes) -> Response {
    match serde_json::from_slice::<HelloRequest>(&body) {
        Ok(request) => {
            debug!(name = %request.name, "Greeting");
            format!("Hello, {}!", request.name).into_response()
        }
        Err(err) => {
            debug!(error = %err, "Rejecting hello request");
            (StatusCode::BAD_REQUEST, "Invalid request body").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_url_replaces_unspecified_ip() {
        let app = HelloApp::new(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)));
        assert_eq!(app.base_url(), "http://127.0.0.1:8080");

        let app = HelloApp::new(SocketAddr::from((Ipv4Addr::new(10, 0, 0, 2), 9000)));
        assert_eq!(app.base_url(), "http://10.0.0.2:9000");
    }

    #[tokio::test]
    async fn test_hello_greets_by_name() {
        let response = hello(Bytes::from_static(br#"{"name":"World"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_hello_rejects_invalid_body() {
        let response = hello(Bytes::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = hello(Bytes::from_static(b"not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
