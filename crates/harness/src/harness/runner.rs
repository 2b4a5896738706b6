//! Test and benchmark runners.
//!
//! Every entry point follows the same lifecycle: open a cancellation scope
//! (starting the service when configured), gate on the readiness probe, run
//! the cases or iterations, then cancel the scope and shut the service down.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::instrument::WithSubscriber;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;
use wisent_domain::{CaseOutcome, RequestDescriptor};

use super::cases::CaseHooks;
use super::{BenchmarkCase, Harness, TestCase};
use crate::HarnessResult;
use crate::lifecycle::ServiceGuard;
use crate::ports::{BenchContext, CancellationReceiver, TestContext};

impl Harness {
    /// Runs `cases` in order, each as a named sub-test of `ctx`.
    ///
    /// A failing case does not stop the following ones. The service is shut
    /// down after the last case whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns a readiness error if the service never became ready; no case
    /// runs in that case.
    pub async fn test<C>(&self, ctx: &C, cases: Vec<TestCase>) -> HarnessResult<()>
    where
        C: TestContext + ?Sized,
    {
        let logger = self.logger().clone();
        async move {
            let span = info_span!("test", run_id = %Uuid::now_v7(), cases = cases.len());
            self.run_tests(ctx, cases).instrument(span).await
        }
        .with_subscriber(logger)
        .await
    }

    /// Runs a benchmark sequentially on the calling task.
    ///
    /// The timer is reset once the service is ready. Each iteration builds a
    /// fresh request from the case's factory.
    ///
    /// # Errors
    ///
    /// Returns a readiness error if the service never became ready.
    pub async fn benchmark<C>(&self, ctx: &C, bench: BenchmarkCase) -> HarnessResult<()>
    where
        C: BenchContext + ?Sized,
    {
        let logger = self.logger().clone();
        async move {
            let span = info_span!("benchmark", run_id = %Uuid::now_v7());
            self.run_benchmark(ctx, bench).instrument(span).await
        }
        .with_subscriber(logger)
        .await
    }

    /// Runs a benchmark on `ctx.parallelism()` concurrent workers.
    ///
    /// Workers pull iteration slots from a shared counter until the quota is
    /// spent, so exactly the quota of iterations runs, none twice. Iteration
    /// order is unspecified. A panicking worker is re-raised once the other
    /// workers have finished and the service has been shut down.
    ///
    /// # Errors
    ///
    /// Returns a readiness error if the service never became ready.
    pub async fn benchmark_parallel<C>(&self, ctx: Arc<C>, bench: BenchmarkCase) -> HarnessResult<()>
    where
        C: BenchContext + 'static,
    {
        let logger = self.logger().clone();
        async move {
            let span = info_span!("benchmark_parallel", run_id = %Uuid::now_v7());
            self.run_benchmark_parallel(ctx, bench).instrument(span).await
        }
        .with_subscriber(logger)
        .await
    }

    /// Opens the run scope, runs `body` in it and shuts the service down.
    ///
    /// A panic in `body` is caught so the shutdown still completes on the
    /// caller's runtime, then resumed.
    async fn scoped<F, Fut>(&self, body: F) -> HarnessResult<()>
    where
        F: FnOnce(CancellationReceiver) -> Fut,
        Fut: Future<Output = HarnessResult<()>>,
    {
        let guard = ServiceGuard::start(self.inner.starter.as_deref()).await;
        let outcome = AssertUnwindSafe(body(guard.cancellation()))
            .catch_unwind()
            .await;
        guard.finish().await;
        match outcome {
            Ok(result) => result,
            Err(panic) => {
                error!("Run panicked after the service was shut down");
                std::panic::resume_unwind(panic)
            }
        }
    }

    /// Waits for readiness, reporting a failure through `fail`.
    async fn await_ready(
        &self,
        cancel: &CancellationReceiver,
        fail: impl FnOnce(&str),
    ) -> HarnessResult<()> {
        let Some(probe) = &self.inner.readiness_probe else {
            return Ok(());
        };
        info!("Starting the readiness probe");
        probe.probe(cancel, self).await.inspect_err(|err| {
            error!(error = %err, "Service never became ready");
            fail(&err.to_string());
        })
    }

    async fn run_tests<C>(&self, ctx: &C, cases: Vec<TestCase>) -> HarnessResult<()>
    where
        C: TestContext + ?Sized,
    {
        info!("Starting tests");
        self.scoped(|cancel| async move {
            self.await_ready(&cancel, |message| ctx.fail(message))
                .await?;

            for case in cases {
                let TestCase {
                    name,
                    request,
                    hooks,
                } = case;
                info!(name = %name, "Running the test");
                let passed = ctx
                    .run(&name, Box::pin(self.run_case(request, &hooks, &cancel)))
                    .await;
                info!(name = %name, passed, "Finished test");
            }
            Ok(())
        })
        .await?;
        info!("Testing done");
        Ok(())
    }

    async fn run_benchmark<C>(&self, ctx: &C, bench: BenchmarkCase) -> HarnessResult<()>
    where
        C: BenchContext + ?Sized,
    {
        info!("Starting the benchmark");
        let quota = bench.quota(ctx.iterations());
        self.scoped(|cancel| async move {
            self.await_ready(&cancel, |message| ctx.fail(message))
                .await?;
            ctx.reset_timer();

            for iteration in 0..quota {
                debug!(iteration, "Running the benchmark");
                let outcome = self
                    .run_case((bench.request)(), &bench.hooks, &cancel)
                    .await;
                ctx.record_iteration();
                if let Err(failure) = outcome {
                    ctx.fail(&failure.message);
                    if ctx.stop_on_failure() {
                        warn!(iteration, "Stopping the benchmark on failure");
                        break;
                    }
                }
            }

            ctx.stop_timer();
            Ok(())
        })
        .await?;
        info!(iterations = quota, "Benchmarking done");
        Ok(())
    }

    async fn run_benchmark_parallel<C>(&self, ctx: Arc<C>, bench: BenchmarkCase) -> HarnessResult<()>
    where
        C: BenchContext + 'static,
    {
        info!("Starting the parallel benchmark");
        let quota = bench.quota(ctx.iterations());
        self.scoped(|cancel| async move {
            self.await_ready(&cancel, |message| ctx.fail(message))
                .await?;

            let workers = ctx.parallelism().max(1);
            let bench = Arc::new(bench);
            let claimed = Arc::new(AtomicU64::new(0));
            let stopped = Arc::new(AtomicBool::new(false));

            info!(workers, iterations = quota, "Spawning benchmark workers");
            ctx.reset_timer();

            let mut tasks = JoinSet::new();
            for worker in 0..workers {
                let harness = self.clone();
                let ctx = Arc::clone(&ctx);
                let bench = Arc::clone(&bench);
                let claimed = Arc::clone(&claimed);
                let stopped = Arc::clone(&stopped);
                let cancel = cancel.clone();

                let work = async move {
                    while !stopped.load(Ordering::Acquire) {
                        let iteration = claimed.fetch_add(1, Ordering::AcqRel);
                        if iteration >= quota {
                            break;
                        }
                        debug!(iteration, "Running the benchmark");
                        let outcome = harness
                            .run_case((bench.request)(), &bench.hooks, &cancel)
                            .await;
                        ctx.record_iteration();
                        if let Err(failure) = outcome {
                            ctx.fail(&failure.message);
                            if ctx.stop_on_failure() {
                                warn!(iteration, "Stopping the benchmark on failure");
                                stopped.store(true, Ordering::Release);
                            }
                        }
                    }
                };
                tasks.spawn(
                    work.instrument(info_span!("worker", worker))
                        .with_subscriber(self.logger().clone()),
                );
            }

            let mut panicked = None;
            while let Some(joined) = tasks.join_next().await {
                if let Err(err) = joined
                    && err.is_panic()
                {
                    error!("Benchmark worker panicked");
                    panicked.get_or_insert(err.into_panic());
                }
            }

            ctx.stop_timer();
            if let Some(payload) = panicked {
                std::panic::resume_unwind(payload);
            }
            Ok(())
        })
        .await?;
        info!(iterations = quota, "Benchmarking done");
        Ok(())
    }

    /// One case or iteration: pre-hook, execute, post-hook, assert, release.
    async fn run_case(
        &self,
        mut request: RequestDescriptor,
        hooks: &CaseHooks,
        cancel: &CancellationReceiver,
    ) -> CaseOutcome {
        if let Some(pre_request) = &hooks.pre_request {
            pre_request(&mut request);
        }

        let result = self.execute(request, cancel).await;

        if let Some(post_request) = &hooks.post_request {
            post_request(&result);
        }

        let outcome = (hooks.assert)(&result);
        // Release the response before the next case reuses the pool.
        drop(result);
        outcome
    }
}
