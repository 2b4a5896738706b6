//! # Wisent
//!
//! A lifecycle-managed harness for black-box HTTP tests and benchmarks.
//!
//! A [`Harness`] optionally starts the service under test, waits until a
//! readiness probe succeeds, sends each request through a configurable
//! execution strategy (direct or [`SimpleRetry`]), hands the result to an
//! assertion callback, and always shuts the service down at the end.
//!
//! ```ignore
//! use std::time::Duration;
//! use wisent::{Harness, HealthCheckProbe, TestCase, TestReport, assert_no_error, assert_status};
//!
//! let harness = Harness::builder("http://127.0.0.1:8080")
//!     .with_readiness_probe(HealthCheckProbe::new(
//!         "/health",
//!         Duration::from_secs(5),
//!         Duration::from_millis(100),
//!     ))
//!     .build()?;
//!
//! let report = TestReport::new();
//! harness
//!     .test(&report, vec![TestCase::new("health", harness.get("/health"), |result| {
//!         assert_status(assert_no_error(result)?, 200)
//!     })])
//!     .await?;
//! report.assert_passed();
//! ```

pub mod adapters;
pub mod assertions;
pub mod error;
pub mod execution;
pub mod harness;
mod lifecycle;
pub mod ports;
pub mod readiness;
pub mod testing;

#[cfg(test)]
mod test_support;

pub use adapters::{ReqwestTransport, TransportConfig};
pub use assertions::{
    assert_body, assert_body_contains, assert_body_matches, assert_header, assert_json_pointer,
    assert_no_error, assert_response_time, assert_status, assert_status_in,
};
pub use error::{HarnessError, HarnessResult};
pub use execution::{DirectExecutor, SimpleRetry};
pub use harness::{BenchmarkCase, Harness, HarnessBuilder, TestCase};
pub use ports::{
    BenchContext, CancellationReceiver, CancellationToken, ExecResult, HttpTransport,
    ReadinessProbe, RequestExecutor, ServiceStarter, ShutdownHandle, TestContext, TransportError,
};
pub use readiness::HealthCheckProbe;
pub use testing::{Bencher, TestReport};

pub use wisent_domain as domain;
pub use wisent_domain::{
    AssertionFailure, BenchReport, CaseOutcome, HttpMethod, HttpResponse, RequestDescriptor,
    StatusExpectation, TestResults,
};
