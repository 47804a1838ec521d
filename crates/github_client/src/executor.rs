//! Rate-limited request execution with retry and backoff.
//!
//! [`RequestExecutor`] is the only component that talks to the [`HttpTransport`].
//! Each call inspects the rate-limit headers of every response, waits for the
//! quota to reset when it is exhausted, and retries transient failures with
//! exponential backoff and jitter.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::clock::Clock;
use crate::errors::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::redact::redact_pairs;

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

/// Public GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Retry ceiling and backoff shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retryable_statuses: Vec<u16>,
    /// Wait applied to a rate-limit rejection that carries no reset information.
    pub rate_limit_fallback: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            retryable_statuses: vec![429, 500, 502, 503, 504],
            rate_limit_fallback: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Delay before retry number `attempt` (1-based).
    ///
    /// `min(max_delay, base_delay * 2^(attempt-1))` adjusted by up to ±10 %,
    /// where the adjustment is taken from the fractional part of `now`.
    pub fn backoff_delay(&self, attempt: u32, now: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30) as i32;
        let base = (self.base_delay.as_secs_f64() * 2f64.powi(exponent))
            .min(self.max_delay.as_secs_f64());
        let jitter = base * 0.1 * (2.0 * now.fract() - 1.0);
        Duration::from_secs_f64((base + jitter).max(0.0))
    }
}

/// Rate-limit quota reported on a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitState {
    pub remaining: i64,
    pub reset_epoch: Option<i64>,
}

impl RateLimitState {
    /// Reads `X-RateLimit-Remaining` and `X-RateLimit-Reset`. `None` when the
    /// remaining count is absent or unparsable.
    pub fn from_response(response: &HttpResponse) -> Option<Self> {
        let remaining = response
            .header("x-ratelimit-remaining")?
            .trim()
            .parse()
            .ok()?;
        let reset_epoch = parse_epoch(response.header("x-ratelimit-reset"));
        Some(Self {
            remaining,
            reset_epoch,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0
    }

    /// `max(0, reset - now) + 1` seconds.
    pub fn wait_duration(&self, now: f64) -> Duration {
        wait_until(self.reset_epoch, now)
    }
}

fn parse_epoch(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn wait_until(reset_epoch: Option<i64>, now: f64) -> Duration {
    let reset = reset_epoch.map(|r| r as f64).unwrap_or(now);
    Duration::from_secs_f64((reset - now).max(0.0) + 1.0)
}

/// Joins `path` onto `base_url`. Absolute URLs pass through unchanged.
pub fn build_github_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Turns a response whose status is not in `expected` into an error.
///
/// `401` and `403` map to `Error::Auth`, `404` to `Error::NotFound`, anything
/// else to `Error::UnexpectedStatus` carrying the response body.
pub fn ensure_status(
    method: HttpMethod,
    url: &str,
    response: HttpResponse,
    expected: &[u16],
) -> Result<HttpResponse, Error> {
    if expected.contains(&response.status) {
        Ok(response)
    } else {
        Err(status_error(method, url, response))
    }
}

/// The error describing a response that was not accepted.
pub fn status_error(method: HttpMethod, url: &str, response: HttpResponse) -> Error {
    match response.status {
        401 | 403 => Error::Auth {
            status: response.status,
            body: response.body,
        },
        404 => Error::NotFound {
            url: url.to_string(),
        },
        status => Error::UnexpectedStatus {
            method: method.to_string(),
            url: url.to_string(),
            status,
            body: response.body,
        },
    }
}

/// Issues GitHub API requests with rate-limit waits and transient-error retries.
///
/// One executor is created per invocation and shared by reference with every
/// paginator and orchestrator. Requests are issued strictly one at a time.
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    base_url: String,
    retry: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            base_url: DEFAULT_API_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Resolves an API path (or absolute URL) against the base URL.
    pub fn url(&self, path: &str) -> String {
        build_github_url(&self.base_url, path)
    }

    /// Sends one logical request, retrying as the policy allows.
    ///
    /// Returns the first response whose status is in `expected`. A response
    /// with any other status is returned as-is once it is no longer
    /// retryable, so the caller decides whether it is fatal.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` when no response could be obtained within
    /// the retry ceiling.
    #[instrument(skip(self, query, body, expected))]
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        expected: &[u16],
    ) -> Result<HttpResponse, Error> {
        let url = self.url(url);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(
                event = "http_request",
                url = %url,
                attempt,
                query = %redact_pairs(query),
                "Sending request"
            );

            let request = HttpRequest {
                method,
                url: url.clone(),
                query: query.to_vec(),
                body: body.cloned(),
            };

            match self.transport.send(request).await {
                Ok(response) => {
                    let rate_limited = self.apply_rate_limit(&response).await;

                    if expected.contains(&response.status) {
                        return Ok(response);
                    }

                    let can_retry = attempt <= self.retry.max_retries;
                    if rate_limited && can_retry {
                        continue;
                    }
                    if self.retry.is_retryable(response.status) && can_retry {
                        let delay = self.retry.backoff_delay(attempt, self.clock.now());
                        warn!(
                            event = "http_retry",
                            url = %url,
                            status = response.status,
                            attempt,
                            delay_seconds = delay.as_secs_f64(),
                            "Transient status, retrying"
                        );
                        self.clock.sleep(delay).await;
                        continue;
                    }

                    warn!(
                        event = "http_unexpected_status",
                        url = %url,
                        status = response.status,
                        attempt,
                        "Request finished with an unexpected status"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    if attempt <= self.retry.max_retries {
                        let delay = self.retry.backoff_delay(attempt, self.clock.now());
                        warn!(
                            event = "network_retry",
                            url = %url,
                            attempt,
                            delay_seconds = delay.as_secs_f64(),
                            error = %err,
                            "Network error, retrying"
                        );
                        self.clock.sleep(delay).await;
                        continue;
                    }

                    error!(
                        event = "network_error",
                        url = %url,
                        attempts = attempt,
                        error = %err,
                        "Network error persisted after retries"
                    );
                    return Err(Error::Transport {
                        method: method.to_string(),
                        url,
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }

    /// Like [`execute`](Self::execute), but a final status outside `expected`
    /// becomes an error.
    pub async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        expected: &[u16],
    ) -> Result<HttpResponse, Error> {
        let response = self.execute(method, url, query, body, expected).await?;
        ensure_status(method, &self.url(url), response, expected)
    }

    pub async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, Error> {
        self.send(HttpMethod::Get, url, query, None, &[200]).await
    }

    pub async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, Error> {
        self.get(url, query).await?.json()
    }

    pub async fn delete(&self, url: &str, expected: &[u16]) -> Result<HttpResponse, Error> {
        self.send(HttpMethod::Delete, url, &[], None, expected).await
    }

    pub async fn put(&self, url: &str, expected: &[u16]) -> Result<HttpResponse, Error> {
        self.send(HttpMethod::Put, url, &[], None, expected).await
    }

    pub async fn patch_json(
        &self,
        url: &str,
        body: &Value,
        expected: &[u16],
    ) -> Result<HttpResponse, Error> {
        self.send(HttpMethod::Patch, url, &[], Some(body), expected)
            .await
    }

    /// Blocks until `reset_epoch` has passed, plus one second.
    pub async fn wait_for_reset(&self, reset_epoch: Option<i64>) {
        let wait = wait_until(reset_epoch, self.clock.now());
        warn!(
            event = "rate_limit_wait",
            wait_seconds = wait.as_secs_f64(),
            reset_epoch = ?reset_epoch,
            "Rate limit exhausted, waiting for reset"
        );
        self.clock.sleep(wait).await;
    }

    /// Waits out an exhausted quota. Returns `true` when the response itself
    /// was a rate-limit rejection and should be sent again.
    async fn apply_rate_limit(&self, response: &HttpResponse) -> bool {
        let rejected = matches!(response.status, 403 | 429);

        if let Some(state) = RateLimitState::from_response(response) {
            if state.is_exhausted() {
                self.wait_for_reset(state.reset_epoch).await;
                return rejected;
            }
        }

        if response.status == 403 && response.body.to_ascii_lowercase().contains("rate limit") {
            let wait = match (
                parse_epoch(response.header("retry-after")),
                parse_epoch(response.header("x-ratelimit-reset")),
            ) {
                (Some(seconds), _) => Duration::from_secs(seconds.max(0) as u64),
                (None, Some(reset)) => wait_until(Some(reset), self.clock.now()),
                (None, None) => self.retry.rate_limit_fallback,
            };
            warn!(
                event = "secondary_rate_limit_wait",
                wait_seconds = wait.as_secs_f64(),
                "Rate limit rejection without quota headers, waiting"
            );
            self.clock.sleep(wait).await;
            return true;
        }

        false
    }
}
