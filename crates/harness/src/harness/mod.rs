//! The harness: configuration plus the test and benchmark entry points.

mod cases;
mod runner;

use std::fmt;
use std::sync::Arc;

use tracing::Dispatch;
use tracing::subscriber::NoSubscriber;
use url::Url;
use wisent_domain::{DomainError, HttpMethod, RequestDescriptor};

pub use cases::{
    AssertResponse, BenchmarkCase, PostRequestHook, PreRequestHook, RequestFactory, TestCase,
};

use crate::adapters::{ReqwestTransport, TransportConfig};
use crate::execution::DirectExecutor;
use crate::ports::{
    CancellationReceiver, CancellationToken, ExecResult, HttpTransport, ReadinessProbe,
    RequestExecutor, ServiceStarter,
};
use crate::{HarnessError, HarnessResult};

/// Drives black-box tests and benchmarks against an HTTP service.
///
/// A harness is immutable once built and cheap to clone; clones share the
/// same configuration and transport connection pool.
///
/// # Example
///
/// ```ignore
/// let harness = Harness::builder("http://127.0.0.1:8080")
///     .with_start(app.starter())
///     .with_readiness_probe(HealthCheckProbe::new(
///         "/health",
///         Duration::from_secs(5),
///         Duration::from_millis(100),
///     ))
///     .build()?;
///
/// let report = TestReport::new();
/// harness.test(&report, vec![
///     TestCase::new("POST hello 200", harness.post("/hello", r#"{"name":"World"}"#), |result| {
///         let response = assert_no_error(result)?;
///         assert_status(response, 200)?;
///         assert_body(response, "Hello, World!")
///     }),
/// ]).await?;
/// report.assert_passed();
/// ```
#[derive(Clone)]
pub struct Harness {
    inner: Arc<HarnessConfig>,
}

struct HarnessConfig {
    base_url: String,
    starter: Option<Arc<dyn ServiceStarter>>,
    readiness_probe: Option<Arc<dyn ReadinessProbe>>,
    transport: Arc<dyn HttpTransport>,
    executor: Arc<dyn RequestExecutor>,
    logger: Dispatch,
}

impl Harness {
    /// Starts configuring a harness for the service at `base_url`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> HarnessBuilder {
        HarnessBuilder::new(base_url)
    }

    /// Base URL every relative request path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The shared transport.
    #[must_use]
    pub fn transport(&self) -> &dyn HttpTransport {
        self.inner.transport.as_ref()
    }

    /// The logger every harness future runs under.
    #[must_use]
    pub fn logger(&self) -> &Dispatch {
        &self.inner.logger
    }

    /// Builds a request for `path` relative to the base URL.
    ///
    /// Never fails: a malformed URL surfaces as
    /// [`TransportError::InvalidUrl`](crate::ports::TransportError::InvalidUrl)
    /// when the request is sent.
    #[must_use]
    pub fn new_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> RequestDescriptor {
        let mut request = RequestDescriptor::new(method, self.url(path));
        request.body = body;
        request
    }

    /// Builds a GET request for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> RequestDescriptor {
        self.new_request(HttpMethod::Get, path, None)
    }

    /// Builds a POST request for `path` with the given body.
    #[must_use]
    pub fn post(&self, path: &str, body: impl Into<Vec<u8>>) -> RequestDescriptor {
        self.new_request(HttpMethod::Post, path, Some(body.into()))
    }

    /// Sends one request outside of any run, through the configured executor.
    pub async fn send(&self, request: RequestDescriptor) -> ExecResult {
        let (_token, cancel) = CancellationToken::new();
        self.execute(request, &cancel).await
    }

    pub(crate) async fn execute(
        &self,
        request: RequestDescriptor,
        cancel: &CancellationReceiver,
    ) -> ExecResult {
        self.inner.executor.execute(self, request, cancel).await
    }

    fn url(&self, path: &str) -> String {
        let base = self.inner.base_url.trim_end_matches('/');
        if path.is_empty() {
            base.to_string()
        } else if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("base_url", &self.inner.base_url)
            .field("starter", &self.inner.starter.is_some())
            .field("readiness_probe", &self.inner.readiness_probe.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Harness`]. Each `with_*` method sets one option.
pub struct HarnessBuilder {
    base_url: String,
    starter: Option<Arc<dyn ServiceStarter>>,
    readiness_probe: Option<Arc<dyn ReadinessProbe>>,
    transport: Option<Arc<dyn HttpTransport>>,
    transport_config: TransportConfig,
    executor: Option<Arc<dyn RequestExecutor>>,
    logger: Option<Dispatch>,
}

impl HarnessBuilder {
    /// Creates a builder with every option unset.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            starter: None,
            readiness_probe: None,
            transport: None,
            transport_config: TransportConfig::default(),
            executor: None,
            logger: None,
        }
    }

    /// Starts the service under test at the beginning of every run.
    ///
    /// Without a starter the service is assumed to be managed externally.
    #[must_use]
    pub fn with_start(mut self, starter: impl ServiceStarter + 'static) -> Self {
        self.starter = Some(Arc::new(starter));
        self
    }

    /// Gates every run on the given readiness probe.
    #[must_use]
    pub fn with_readiness_probe(mut self, probe: impl ReadinessProbe + 'static) -> Self {
        self.readiness_probe = Some(Arc::new(probe));
        self
    }

    /// Uses a custom transport instead of the default pooled reqwest client.
    #[must_use]
    pub fn with_transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Settings for the default transport; ignored when a transport is given.
    #[must_use]
    pub fn with_transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    /// Wraps every request in a custom execution strategy.
    #[must_use]
    pub fn with_executor(mut self, executor: impl RequestExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Sends harness logs to `logger` instead of discarding them.
    #[must_use]
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Validates the configuration and installs defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL or
    /// the default transport cannot be created.
    pub fn build(self) -> HarnessResult<Harness> {
        validate_base_url(&self.base_url)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(&self.transport_config)
                    .map_err(|e| HarnessError::TransportSetup(e.to_string()))?,
            ),
        };

        Ok(Harness {
            inner: Arc::new(HarnessConfig {
                base_url: self.base_url,
                starter: self.starter,
                readiness_probe: self.readiness_probe,
                transport,
                executor: self
                    .executor
                    .unwrap_or_else(|| Arc::new(DirectExecutor)),
                logger: self
                    .logger
                    .unwrap_or_else(|| Dispatch::new(NoSubscriber::default())),
            }),
        })
    }
}

impl fmt::Debug for HarnessBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessBuilder")
            .field("base_url", &self.base_url)
            .field("transport_config", &self.transport_config)
            .finish_non_exhaustive()
    }
}

fn validate_base_url(base_url: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment"));
    }
    Ok(())
}
