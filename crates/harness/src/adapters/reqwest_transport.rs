//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port on top of a pooled
//! `reqwest::Client`. The client is cheap to clone and safe to share across
//! parallel benchmark workers.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, Url};
use wisent_domain::{Header, Headers, HttpMethod, HttpResponse, RequestDescriptor};

use crate::adapters::TransportConfig;
use crate::ports::{BoxFuture, ExecResult, HttpTransport, TransportError};

/// HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport from the given settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .read_timeout(config.read_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .tcp_keepalive(config.tcp_keepalive)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: millis(config.request_timeout),
        })
    }

    /// Creates a transport around an existing reqwest client.
    ///
    /// `request_timeout` must be the timeout the client was built with; it
    /// is only used to describe timeout errors.
    #[must_use]
    pub fn with_client(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            timeout_ms: millis(request_timeout),
        }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error_chain(error);
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lowered.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_body() || error.is_decode() {
            return TransportError::Body(error_chain(error));
        }

        TransportError::Other(error_chain(error))
    }

    async fn send(&self, request: RequestDescriptor) -> ExecResult {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", request.url)))?;

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);
        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        let status = response.status();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(k, v)| Header::new(k.as_str(), v.to_str().unwrap_or("<binary>")))
            .collect();

        // Draining the body hands the connection back to the pool.
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?
            .to_vec();

        let mut response = HttpResponse::new(status.as_u16(), headers, body, start.elapsed());
        response.status_text = status.canonical_reason().unwrap_or_default().to_string();
        Ok(response)
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: RequestDescriptor) -> BoxFuture<'_, ExecResult> {
        Box::pin(self.send(request))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Joins an error with its sources; reqwest keeps the useful part
/// ("Connection refused") in the innermost source.
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new(&TransportConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
        let result = transport
            .execute(RequestDescriptor::get("not a url"))
            .await;
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_connect_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();

        let err = transport
            .execute(RequestDescriptor::get(format!("http://127.0.0.1:{port}/health")))
            .await
            .unwrap_err();

        assert!(err.is_connect(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_custom_client_reports_its_timeout() {
        // Accepts connections through the backlog but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let timeout = Duration::from_millis(150);
        let client = Client::builder().timeout(timeout).build().unwrap();
        let transport = ReqwestTransport::with_client(client, timeout);

        let err = transport
            .execute(RequestDescriptor::get(format!("http://{addr}/health")))
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::Timeout { timeout_ms: 150 });
        drop(listener);
    }
}
