//! Crate for talking to the GitHub REST API.
//!
//! This crate provides the resilient request layer used by every maintenance
//! operation: an [`HttpTransport`] seam, a [`RequestExecutor`] that waits out
//! rate limits and retries transient failures, and a [`Paginator`] that turns
//! list endpoints into a lazy sequence of [`Record`]s.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, instrument};

pub mod clock;
pub mod errors;
pub mod executor;
pub mod http;
pub mod pagination;
pub mod record;
pub mod redact;
pub mod testing;
pub mod token_guard;

pub use clock::{Clock, SystemClock};
pub use errors::Error;
pub use executor::{
    build_github_url, ensure_status, status_error, RateLimitState, RequestExecutor, RetryPolicy,
    DEFAULT_API_URL,
};
pub use http::{
    ClientSettings, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    TransportError,
};
pub use pagination::{clamp_page_size, PageShape, Paginator, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use record::Record;
pub use token_guard::{ensure_token_ready, TokenStatus};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Creates a [`RequestExecutor`] authenticated with a personal access token.
///
/// # Arguments
///
/// * `token` - The token sent as `Authorization: Bearer <token>`.
/// * `api_url` - API root, usually [`DEFAULT_API_URL`].
/// * `user_agent` - Optional override for the `User-Agent` header.
///
/// # Errors
///
/// Returns `Error::ClientBuild` if the HTTP client cannot be constructed.
///
/// # Example
///
/// ```rust,no_run
/// # use github_client::{create_token_executor, DEFAULT_API_URL};
/// # async fn example() -> Result<(), github_client::Error> {
/// let executor = create_token_executor("ghp_example".to_string().into(), DEFAULT_API_URL, None)?;
/// let me = executor.get_json("user", &[]).await?;
/// println!("{}", me["login"]);
/// # Ok(())
/// # }
/// ```
#[instrument(skip(token))]
pub fn create_token_executor(
    token: SecretString,
    api_url: &str,
    user_agent: Option<&str>,
) -> Result<RequestExecutor, Error> {
    debug!("Creating GitHub executor with token authentication");

    let mut settings = ClientSettings::new(token);
    if let Some(agent) = user_agent {
        settings = settings.with_user_agent(agent);
    }
    let transport = ReqwestTransport::new(&settings)?;

    Ok(RequestExecutor::new(Arc::new(transport), Arc::new(SystemClock)).with_base_url(api_url))
}
