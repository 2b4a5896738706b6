//! Benchmark context that measures wall-clock time.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::warn;
use wisent_domain::BenchReport;

use crate::ports::BenchContext;

/// Failure messages kept per run; further failures are only counted.
const MAX_MESSAGES: usize = 100;

/// Drives a benchmark for a fixed number of iterations.
#[derive(Debug)]
pub struct Bencher {
    iterations: u64,
    parallelism: usize,
    stop_on_failure: bool,
    timer: Mutex<Timer>,
    completed: AtomicU64,
    failures: AtomicU64,
    messages: Mutex<Vec<String>>,
}

#[derive(Debug)]
struct Timer {
    started: Instant,
    stopped: Option<Instant>,
}

impl Bencher {
    /// Creates a bencher asking for `iterations` iterations, with one worker
    /// per available CPU for parallel runs.
    #[must_use]
    pub fn new(iterations: u64) -> Self {
        let parallelism = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self {
            iterations,
            parallelism,
            stop_on_failure: false,
            timer: Mutex::new(Timer {
                started: Instant::now(),
                stopped: None,
            }),
            completed: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Sets the number of workers for parallel runs (at least one).
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Set whether to stop on first failure.
    #[must_use]
    pub const fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Time measured since the last timer reset.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        let timer = self.timer.lock();
        timer
            .stopped
            .unwrap_or_else(Instant::now)
            .duration_since(timer.started)
    }

    /// Recorded failure messages, oldest first.
    #[must_use]
    pub fn failure_messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Summary of the run so far.
    #[must_use]
    pub fn report(&self) -> BenchReport {
        BenchReport {
            iterations: self.completed.load(Ordering::Acquire),
            failures: self.failures.load(Ordering::Acquire),
            parallelism: self.parallelism,
            elapsed: self.elapsed(),
        }
    }
}

impl BenchContext for Bencher {
    fn iterations(&self) -> u64 {
        self.iterations
    }

    fn parallelism(&self) -> usize {
        self.parallelism
    }

    fn reset_timer(&self) {
        let mut timer = self.timer.lock();
        timer.started = Instant::now();
        timer.stopped = None;
    }

    fn stop_timer(&self) {
        let mut timer = self.timer.lock();
        if timer.stopped.is_none() {
            timer.stopped = Some(Instant::now());
        }
    }

    fn record_iteration(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    fn fail(&self, message: &str) {
        self.failures.fetch_add(1, Ordering::AcqRel);
        warn!(failure = message, "Benchmark iteration failed");
        let mut messages = self.messages.lock();
        if messages.len() < MAX_MESSAGES {
            messages.push(message.to_string());
        }
    }

    fn stop_on_failure(&self) -> bool {
        self.stop_on_failure
    }
}
