//! Test context that records results in memory.

use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, warn};
use wisent_domain::{CaseResult, TestResults};

use crate::ports::{CaseFuture, TestContext};

/// Collects one [`CaseResult`] per case plus any fatal failures.
#[derive(Debug, Default)]
pub struct TestReport {
    results: Mutex<TestResults>,
}

impl TestReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything recorded so far.
    #[must_use]
    pub fn results(&self) -> TestResults {
        self.results.lock().clone()
    }

    /// True if no case failed and nothing fatal was reported.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.results.lock().all_passed()
    }

    /// Panics with the full report unless every case passed.
    ///
    /// # Panics
    ///
    /// Panics if a case failed or a fatal failure was reported.
    #[allow(clippy::panic)]
    pub fn assert_passed(&self) {
        let results = self.results();
        if !results.all_passed() {
            panic!("test run failed\n{results}");
        }
    }
}

#[async_trait]
impl TestContext for TestReport {
    async fn run(&self, name: &str, case: CaseFuture<'_>) -> bool {
        let start = Instant::now();
        let outcome = case.await;
        let result = CaseResult::from_outcome(name, &outcome, start.elapsed());
        if let Some(failure) = &result.failure {
            warn!(name, failure = %failure, "Case failed");
        } else {
            info!(name, "Case passed");
        }
        let passed = result.passed;
        self.results.lock().results.push(result);
        passed
    }

    fn fail(&self, message: &str) {
        self.results.lock().fatal.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wisent_domain::{AssertionFailure, CaseOutcome};

    #[tokio::test]
    async fn test_records_each_case() {
        let report = TestReport::new();

        assert!(report.run("ok", Box::pin(async { CaseOutcome::Ok(()) })).await);
        assert!(
            !report
                .run("bad", Box::pin(async { CaseOutcome::Err(AssertionFailure::new("boom")) }))
                .await
        );

        let results = report.results();
        assert_eq!(results.total(), 2);
        assert_eq!(results.results[0].name, "ok");
        assert_eq!(results.results[1].failure.as_deref(), Some("boom"));
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn test_fatal_failure_fails_the_run() {
        let report = TestReport::new();
        assert!(report.run("ok", Box::pin(async { CaseOutcome::Ok(()) })).await);
        assert!(report.passed());

        report.fail("health check timeout reached");
        assert!(!report.passed());
        assert_eq!(report.results().fatal, vec!["health check timeout reached"]);
    }

    #[test]
    #[should_panic(expected = "test run failed")]
    fn test_assert_passed_panics_on_failure() {
        let report = TestReport::new();
        report.fail("service never became ready");
        report.assert_passed();
    }
}
