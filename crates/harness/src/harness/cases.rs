//! Test and benchmark case definitions.

use std::fmt;

use wisent_domain::{CaseOutcome, RequestDescriptor};

use crate::ports::ExecResult;

/// Runs against the request right before it is sent.
pub type PreRequestHook = Box<dyn Fn(&mut RequestDescriptor) + Send + Sync>;
/// Runs against the raw response/error pair right after the send.
pub type PostRequestHook = Box<dyn Fn(&ExecResult) + Send + Sync>;
/// Decides whether a case or iteration passed.
pub type AssertResponse = Box<dyn Fn(&ExecResult) -> CaseOutcome + Send + Sync>;
/// Produces a fresh request for every benchmark iteration.
pub type RequestFactory = Box<dyn Fn() -> RequestDescriptor + Send + Sync>;

/// Hooks shared by test cases and benchmarks.
pub(crate) struct CaseHooks {
    pub(crate) pre_request: Option<PreRequestHook>,
    pub(crate) post_request: Option<PostRequestHook>,
    pub(crate) assert: AssertResponse,
}

impl CaseHooks {
    fn new(assert: AssertResponse) -> Self {
        Self {
            pre_request: None,
            post_request: None,
            assert,
        }
    }
}

/// One named request plus the assertion on its response.
///
/// A test case is consumed by the run that executes it.
pub struct TestCase {
    pub(crate) name: String,
    pub(crate) request: RequestDescriptor,
    pub(crate) hooks: CaseHooks,
}

impl TestCase {
    /// Creates a case; `name` identifies it in reports and should be unique.
    pub fn new<F>(name: impl Into<String>, request: RequestDescriptor, assert: F) -> Self
    where
        F: Fn(&ExecResult) -> CaseOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            request,
            hooks: CaseHooks::new(Box::new(assert)),
        }
    }

    /// Adds a hook that may modify the request before it is sent.
    #[must_use]
    pub fn with_pre_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RequestDescriptor) + Send + Sync + 'static,
    {
        self.hooks.pre_request = Some(Box::new(hook));
        self
    }

    /// Adds a hook that observes the response/error pair.
    #[must_use]
    pub fn with_post_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExecResult) + Send + Sync + 'static,
    {
        self.hooks.post_request = Some(Box::new(hook));
        self
    }

    /// The case name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// A request factory plus the assertion run on every iteration.
pub struct BenchmarkCase {
    pub(crate) request: RequestFactory,
    pub(crate) hooks: CaseHooks,
    pub(crate) max_iterations: Option<u64>,
}

impl BenchmarkCase {
    /// Creates a benchmark; `request` is called once per iteration.
    pub fn new<R, F>(request: R, assert: F) -> Self
    where
        R: Fn() -> RequestDescriptor + Send + Sync + 'static,
        F: Fn(&ExecResult) -> CaseOutcome + Send + Sync + 'static,
    {
        Self {
            request: Box::new(request),
            hooks: CaseHooks::new(Box::new(assert)),
            max_iterations: None,
        }
    }

    /// Adds a hook that may modify each request before it is sent.
    #[must_use]
    pub fn with_pre_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RequestDescriptor) + Send + Sync + 'static,
    {
        self.hooks.pre_request = Some(Box::new(hook));
        self
    }

    /// Adds a hook that observes each response/error pair.
    #[must_use]
    pub fn with_post_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExecResult) + Send + Sync + 'static,
    {
        self.hooks.post_request = Some(Box::new(hook));
        self
    }

    /// Caps the iteration count, whatever the benchmark context asks for.
    #[must_use]
    pub fn with_max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Iterations to run when the context asks for `requested`.
    pub(crate) fn quota(&self, requested: u64) -> u64 {
        self.max_iterations
            .map_or(requested, |max| requested.min(max))
    }
}

impl fmt::Debug for BenchmarkCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkCase")
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}
