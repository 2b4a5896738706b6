//! Drives the hello service through the harness over real HTTP.

#![allow(clippy::unwrap_used)]

use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::json;
use wisent::{
    Bencher, BenchmarkCase, CancellationToken, Harness, HarnessError, HealthCheckProbe,
    SimpleRetry, TestCase, TestReport, assert_body, assert_header, assert_json_pointer,
    assert_no_error, assert_status,
};
use wisent_demo::HelloApp;

fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    listener.local_addr().unwrap()
}

fn probe() -> HealthCheckProbe {
    HealthCheckProbe::new("/health", Duration::from_secs(5), Duration::from_millis(50))
}

fn managed_harness(app: HelloApp) -> Harness {
    Harness::builder(app.base_url())
        .with_start(app.starter())
        .with_readiness_probe(probe())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_hello_cases() {
    let app = HelloApp::new(free_addr());
    let harness = managed_harness(app);

    let cases = vec![
        TestCase::new(
            "POST hello returns greeting",
            harness.post("/hello", r#"{"name":"World"}"#),
            |result| {
                let response = assert_no_error(result)?;
                assert_status(response, 200)?;
                assert_header(response, "content-type", Some("text/plain; charset=utf-8"))?;
                assert_body(response, "Hello, World!")
            },
        ),
        TestCase::new(
            "POST hello rejects empty body",
            harness.post("/hello", ""),
            |result| {
                let response = assert_no_error(result)?;
                assert_status(response, 400)?;
                assert_body(response, "Invalid request body")
            },
        ),
        TestCase::new("GET health", harness.get("/health"), |result| {
            let response = assert_no_error(result)?;
            assert_status(response, 200)?;
            assert_json_pointer(response, "/status", &json!("ok"))
        }),
    ];

    let report = TestReport::new();
    harness.test(&report, cases).await.unwrap();

    report.assert_passed();
    assert_eq!(report.results().total(), 3);
}

#[tokio::test]
async fn test_service_is_stopped_after_the_run() {
    let app = HelloApp::new(free_addr());
    let harness = managed_harness(app);

    let report = TestReport::new();
    let case = TestCase::new("GET health", harness.get("/health"), |result| {
        assert_status(assert_no_error(result)?, 200)
    });
    harness.test(&report, vec![case]).await.unwrap();
    report.assert_passed();

    assert!(harness.send(harness.get("/health")).await.is_err());
}

#[tokio::test]
async fn test_benchmark_hello() {
    let app = HelloApp::new(free_addr());
    let harness = managed_harness(app);
    let target = harness.clone();

    let bench = BenchmarkCase::new(
        move || target.post("/hello", r#"{"name":"World"}"#),
        |result| {
            let response = assert_no_error(result)?;
            assert_status(response, 200)?;
            assert_body(response, "Hello, World!")
        },
    );

    let bencher = Bencher::new(50);
    harness.benchmark(&bencher, bench).await.unwrap();

    let report = bencher.report();
    assert_eq!(report.iterations, 50);
    assert_eq!(report.failures, 0, "{:?}", bencher.failure_messages());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_benchmark_hello() {
    let app = HelloApp::new(free_addr());
    let logger = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .finish();
    let harness = Harness::builder(app.base_url())
        .with_start(app.starter())
        .with_readiness_probe(probe())
        .with_executor(SimpleRetry::new(3, Duration::from_millis(100)))
        .with_logger(logger)
        .build()
        .unwrap();

    let target = harness.clone();
    let observed = Arc::new(AtomicUsize::new(0));
    let post_seen = Arc::clone(&observed);

    let bench = BenchmarkCase::new(
        move || target.post("/hello", r#"{"name":"World"}"#),
        |result| {
            let response = assert_no_error(result)?;
            assert_status(response, 200)?;
            assert_body(response, "Hello, World!")
        },
    )
    .with_pre_request(|request| {
        request.headers.set("Content-Type", "application/json");
    })
    .with_post_request(move |_| {
        post_seen.fetch_add(1, Ordering::Relaxed);
    });

    let bencher = Arc::new(Bencher::new(200).with_parallelism(8));
    harness
        .benchmark_parallel(Arc::clone(&bencher), bench)
        .await
        .unwrap();

    let report = bencher.report();
    assert_eq!(report.iterations, 200);
    assert_eq!(report.failures, 0, "{:?}", bencher.failure_messages());
    assert_eq!(observed.load(Ordering::Relaxed), 200);
}

#[tokio::test]
async fn test_readiness_timeout_runs_no_cases() {
    // Nothing listens on this port.
    let addr = free_addr();
    let harness = Harness::builder(format!("http://{addr}"))
        .with_readiness_probe(HealthCheckProbe::new(
            "/health",
            Duration::from_millis(200),
            Duration::from_millis(50),
        ))
        .build()
        .unwrap();

    let asserted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&asserted);
    let case = TestCase::new("never runs", harness.get("/health"), move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(())
    });

    let report = TestReport::new();
    let started = Instant::now();
    let err = harness.test(&report, vec![case]).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, HarnessError::ReadinessTimeout { .. }), "{err}");
    assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
    assert_eq!(asserted.load(Ordering::Relaxed), 0);
    assert_eq!(report.results().total(), 0);
    assert!(!report.passed());
}

#[tokio::test]
async fn test_externally_managed_service() {
    let app = HelloApp::new(free_addr());
    let (token, cancel) = CancellationToken::new();
    let shutdown = app.start(cancel.clone()).await;

    let harness = Harness::builder(app.base_url())
        .with_readiness_probe(probe())
        .build()
        .unwrap();

    let report = TestReport::new();
    let case = TestCase::new(
        "POST hello",
        harness.post("/hello", r#"{"name":"Rust"}"#),
        |result| assert_body(assert_no_error(result)?, "Hello, Rust!"),
    );
    harness.test(&report, vec![case]).await.unwrap();
    report.assert_passed();

    // The harness did not start the service, so it must not stop it either.
    let response = harness.send(harness.get("/health")).await.unwrap();
    assert_eq!(response.status, 200);

    token.cancel();
    shutdown.shutdown(cancel).await;
}
