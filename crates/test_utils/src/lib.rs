//! Test utilities shared by the workspace's unit tests.
//!
//! This crate wires a [`RequestExecutor`] to the in-memory transport and
//! manual clock from `github_client::testing`, and provides builders for the
//! GitHub response shapes the operations consume.

use std::sync::Arc;

use github_client::testing::{ManualClock, MockTransport};
use github_client::{HttpMethod, HttpRequest, HttpResponse, RequestExecutor};
use serde_json::{Value, json};

/// Epoch used as the starting time of every [`TestApi`] clock.
pub const TEST_EPOCH: f64 = 1_700_000_000.0;

/// Base URL the [`TestApi`] executor resolves paths against.
pub const TEST_API_URL: &str = "https://api.github.test";

/// An executor whose every request is answered from a script.
///
/// # Examples
///
/// ```
/// use test_utils::{TestApi, json_array};
///
/// # #[tokio::main]
/// # async fn main() {
/// let api = TestApi::new();
/// api.respond(json_array(vec![]));
/// let body = api.executor.get_json("user/followers", &[]).await.unwrap();
/// assert!(body.as_array().unwrap().is_empty());
/// assert_eq!(api.request_count(), 1);
/// # }
/// ```
pub struct TestApi {
    pub transport: Arc<MockTransport>,
    pub clock: Arc<ManualClock>,
    pub executor: RequestExecutor,
}

impl TestApi {
    pub fn new() -> Self {
        let transport = Arc::new(MockTransport::new());
        let clock = Arc::new(ManualClock::new(TEST_EPOCH));
        let executor =
            RequestExecutor::new(transport.clone(), clock.clone()).with_base_url(TEST_API_URL);
        Self {
            transport,
            clock,
            executor,
        }
    }

    /// Queues the next response.
    pub fn respond(&self, response: HttpResponse) -> &Self {
        self.transport.push_response(response);
        self
    }

    /// Queues an empty response with `status`.
    pub fn respond_status(&self, status: u16) -> &Self {
        self.respond(HttpResponse::new(status))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.transport.requests()
    }

    pub fn request_count(&self) -> usize {
        self.transport.request_count()
    }

    /// Requests made with `method`, in order.
    pub fn requests_with(&self, method: HttpMethod) -> Vec<HttpRequest> {
        self.transport.requests_with_method(method)
    }

    /// URLs of the requests made with `method`, relative to [`TEST_API_URL`].
    pub fn paths_with(&self, method: HttpMethod) -> Vec<String> {
        self.requests_with(method)
            .into_iter()
            .map(|r| relative(&r.url))
            .collect()
    }
}

impl Default for TestApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips [`TEST_API_URL`] from `url`.
pub fn relative(url: &str) -> String {
    url.strip_prefix(TEST_API_URL).unwrap_or(url).to_string()
}

/// `200` with a JSON array body.
pub fn json_array(items: Vec<Value>) -> HttpResponse {
    HttpResponse::new(200).with_json(&Value::Array(items))
}

/// `200` with `{ key: [items...] }`.
pub fn wrapped_page(key: &str, items: Vec<Value>) -> HttpResponse {
    let total = items.len();
    HttpResponse::new(200).with_json(&json!({ "total_count": total, key: items }))
}

/// `200` with a JSON object body.
pub fn json_object(status: u16, body: Value) -> HttpResponse {
    HttpResponse::new(status).with_json(&body)
}

/// `{ "id": id }` objects for every id in `ids`.
pub fn id_records(ids: impl IntoIterator<Item = u64>) -> Vec<Value> {
    ids.into_iter().map(|id| json!({ "id": id })).collect()
}

/// `{ "login": login }` objects.
pub fn user_records(logins: &[&str]) -> Vec<Value> {
    logins.iter().map(|l| json!({ "login": l })).collect()
}

/// A Code Scanning analysis record.
pub fn analysis(id: u64, tool: &str, deletable: bool) -> Value {
    json!({ "id": id, "tool": { "name": tool }, "deletable": deletable })
}

/// A Code Scanning alert record.
pub fn alert(number: u64, tool: &str, rule_id: &str) -> Value {
    json!({
        "number": number,
        "state": "open",
        "tool": { "name": tool },
        "rule": { "id": rule_id, "name": rule_id }
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
