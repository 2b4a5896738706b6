//! Test and benchmark context ports
//!
//! Contexts are the bridge to whatever framework reports results: they run
//! named cases, record failures and own benchmark timing.

use async_trait::async_trait;
use wisent_domain::CaseOutcome;

use super::BoxFuture;

/// The body of one test case, as handed to [`TestContext::run`].
pub type CaseFuture<'a> = BoxFuture<'a, CaseOutcome>;

/// Receives test cases and their outcomes.
#[async_trait]
pub trait TestContext: Send + Sync {
    /// Runs `case` as a named, isolated sub-test and records its outcome.
    ///
    /// Returns true if the case passed. A failing case must not prevent the
    /// next one from running.
    async fn run(&self, name: &str, case: CaseFuture<'_>) -> bool;

    /// Records a failure that is fatal to the whole run.
    fn fail(&self, message: &str);
}

/// Drives a benchmark: iteration quota, timing and failure reporting.
pub trait BenchContext: Send + Sync {
    /// Number of iterations the framework wants to run.
    fn iterations(&self) -> u64;

    /// Number of concurrent workers for parallel benchmarks.
    fn parallelism(&self) -> usize {
        1
    }

    /// Restarts the timing measurement, discarding setup time.
    fn reset_timer(&self);

    /// Stops the timing measurement before teardown.
    fn stop_timer(&self) {}

    /// Counts one completed iteration.
    fn record_iteration(&self);

    /// Records a failed iteration or a fatal setup failure.
    fn fail(&self, message: &str);

    /// Whether the first failure ends the benchmark.
    fn stop_on_failure(&self) -> bool {
        false
    }
}
