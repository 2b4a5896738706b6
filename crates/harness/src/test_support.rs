//! Scripted doubles shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use wisent_domain::{Headers, HttpResponse, RequestDescriptor};

use crate::Harness;
use crate::ports::{BoxFuture, ExecResult, HttpTransport};

/// Transport that replays scripted results, then a fallback.
#[derive(Clone)]
pub(crate) struct ScriptedTransport {
    inner: Arc<ScriptedInner>,
    delay: Duration,
}

struct ScriptedInner {
    script: Mutex<VecDeque<ExecResult>>,
    fallback: ExecResult,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedTransport {
    /// Replays `script` in order, then answers 200 "OK" forever.
    pub(crate) fn new(script: impl IntoIterator<Item = ExecResult>) -> Self {
        Self::build(script.into_iter().collect(), Ok(Self::response(200, "OK")))
    }

    /// Fails every request with `err`.
    pub(crate) fn failing(err: crate::ports::TransportError) -> Self {
        Self::build(VecDeque::new(), Err(err))
    }

    fn build(script: VecDeque<ExecResult>, fallback: ExecResult) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                script: Mutex::new(script),
                fallback,
                requests: Mutex::new(Vec::new()),
            }),
            delay: Duration::ZERO,
        }
    }

    /// Waits `delay` before answering each request.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(
            status,
            Headers::new(),
            body.as_bytes().to_vec(),
            Duration::from_millis(1),
        )
    }

    pub(crate) fn calls(&self) -> usize {
        self.inner.requests.lock().len()
    }

    pub(crate) fn requests(&self) -> Vec<RequestDescriptor> {
        self.inner.requests.lock().clone()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new([])
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, request: RequestDescriptor) -> BoxFuture<'_, ExecResult> {
        Box::pin(async move {
            self.inner.requests.lock().push(request);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.inner.script.lock().pop_front();
            next.unwrap_or_else(|| self.inner.fallback.clone())
        })
    }
}

pub(crate) fn harness_with(transport: ScriptedTransport) -> Harness {
    Harness::builder("http://localhost:9999")
        .with_transport(transport)
        .build()
        .unwrap()
}

/// Captures formatted log lines in memory.
#[derive(Clone, Default)]
pub(crate) struct LogBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
