//! Deterministic doubles for the transport and clock seams.
//!
//! [`MockTransport`] answers requests from a FIFO script and records every
//! request it receives. [`ManualClock`] never blocks: sleeping advances its
//! virtual time and is recorded so tests can assert on wait durations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::clock::Clock;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// In-memory transport answering from a script.
///
/// When the script runs dry every further request fails with a
/// `TransportError::Other`, which surfaces unexpected extra calls in tests.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    script: VecDeque<Result<HttpResponse, TransportError>>,
    requests: Vec<HttpRequest>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next response.
    pub fn push_response(&self, response: HttpResponse) {
        self.lock().script.push_back(Ok(response));
    }

    /// Queues a network failure.
    pub fn push_error(&self, error: TransportError) {
        self.lock().script.push_back(Err(error));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Requests made with `method`, in order.
    pub fn requests_with_method(&self, method: HttpMethod) -> Vec<HttpRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock().script.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut inner = self.lock();
        let description = format!("{} {}", request.method, request.url);
        inner.requests.push(request);
        inner.script.pop_front().unwrap_or_else(|| {
            Err(TransportError::Other(format!(
                "no scripted response for {description}"
            )))
        })
    }
}

/// A clock whose time only moves when something sleeps on it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualClockInner>>,
}

#[derive(Debug)]
struct ManualClockInner {
    now: f64,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    /// Starts the clock at `epoch_seconds`.
    pub fn new(epoch_seconds: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualClockInner {
                now: epoch_seconds,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Every duration passed to `sleep`, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.lock().sleeps.iter().sum()
    }

    pub fn advance(&self, duration: Duration) {
        self.lock().now += duration.as_secs_f64();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualClockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_700_000_000.0)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        let mut inner = self.lock();
        inner.now += duration.as_secs_f64();
        inner.sleeps.push(duration);
    }
}
