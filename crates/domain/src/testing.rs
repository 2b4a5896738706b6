//! Test and benchmark outcome types.
//!
//! These types describe what happened when cases and benchmark iterations
//! ran against the service under test. They carry no behavior beyond
//! bookkeeping, so any reporting context can build on them.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected status code value or range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Range of status codes (e.g., 200-299).
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// One of multiple status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => (*min..=*max).contains(&status),
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Create a "success" expectation (200-299).
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }
}

impl fmt::Display for StatusExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(code) => write!(f, "{code}"),
            Self::Range { min, max } => write!(f, "{min}-{max}"),
            Self::OneOf(codes) => {
                let codes: Vec<_> = codes.iter().map(ToString::to_string).collect();
                write!(f, "one of [{}]", codes.join(", "))
            }
        }
    }
}

impl From<u16> for StatusExpectation {
    fn from(code: u16) -> Self {
        Self::Exact(code)
    }
}

impl From<RangeInclusive<u16>> for StatusExpectation {
    fn from(range: RangeInclusive<u16>) -> Self {
        Self::Range {
            min: *range.start(),
            max: *range.end(),
        }
    }
}

impl From<&[u16]> for StatusExpectation {
    fn from(codes: &[u16]) -> Self {
        Self::OneOf(codes.to_vec())
    }
}

/// A failed check on a response, fatal for the case or iteration it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AssertionFailure {
    /// Human-readable description of the mismatch.
    pub message: String,
}

impl AssertionFailure {
    /// Creates a failure with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What an assertion callback returns for one case or iteration.
pub type CaseOutcome = Result<(), AssertionFailure>;

/// Result of running one named test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case name.
    pub name: String,
    /// Whether the case passed.
    pub passed: bool,
    /// Failure message if it did not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Execution time in milliseconds.
    pub duration_ms: u64,
}

impl CaseResult {
    /// Builds a result from the outcome of a case.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_outcome(name: impl Into<String>, outcome: &CaseOutcome, duration: Duration) -> Self {
        Self {
            name: name.into(),
            passed: outcome.is_ok(),
            failure: outcome.as_ref().err().map(|f| f.message.clone()),
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// Results from running a sequence of test cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    /// Individual case results, in execution order.
    pub results: Vec<CaseResult>,
    /// Failures reported outside any case (e.g., the service never became ready).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fatal: Vec<String>,
}

impl TestResults {
    /// Number of cases that ran.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of cases that passed.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Number of cases that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Check if every case passed and nothing fatal was reported.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.fatal.is_empty() && self.results.iter().all(|r| r.passed)
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total() == 0 {
            100.0
        } else {
            (self.passed() as f64 / self.total() as f64) * 100.0
        }
    }
}

impl fmt::Display for TestResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.fatal {
            writeln!(f, "FATAL: {message}")?;
        }
        for result in &self.results {
            let verdict = if result.passed { "PASS" } else { "FAIL" };
            writeln!(f, "--- {verdict}: {} ({}ms)", result.name, result.duration_ms)?;
            if let Some(failure) = &result.failure {
                for line in failure.lines() {
                    writeln!(f, "    {line}")?;
                }
            }
        }
        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}

/// Timing summary of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchReport {
    /// Iterations that ran.
    pub iterations: u64,
    /// Iterations whose assertion failed.
    pub failures: u64,
    /// Number of concurrent workers (1 for sequential runs).
    pub parallelism: usize,
    /// Wall-clock time measured since the last timer reset.
    pub elapsed: Duration,
}

impl BenchReport {
    /// Average wall-clock nanoseconds per iteration.
    #[must_use]
    pub fn ns_per_iter(&self) -> u128 {
        if self.iterations == 0 {
            0
        } else {
            self.elapsed.as_nanos() / u128::from(self.iterations)
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations\t{} ns/op\t{} failures\t{} workers",
            self.iterations,
            self.ns_per_iter(),
            self.failures,
            self.parallelism
        )
    }
}
