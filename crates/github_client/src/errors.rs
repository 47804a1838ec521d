//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when talking to the GitHub REST API
//! through the github_client crate: transport failures, unexpected statuses, authentication
//! rejections and response bodies whose shape cannot be interpreted.

use crate::http::TransportError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// Transient failures (429, 5xx, network errors) are retried inside the
/// [`RequestExecutor`](crate::RequestExecutor) and only surface here once the retry
/// ceiling is exhausted.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match executor.delete(&url, &[204]).await {
///     Ok(_) => println!("deleted"),
///     Err(Error::Auth { status, .. }) => eprintln!("token rejected ({status})"),
///     Err(Error::NotFound { url }) => eprintln!("{url} is already gone"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The token was rejected.
    ///
    /// Returned for `401` and for `403` responses that are not rate-limit rejections.
    /// These are never retried.
    #[error("Authentication failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Input rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The token lacks one or more OAuth scopes needed by the operation.
    #[error("Token is missing required scopes: {}", missing.join(", "))]
    MissingScopes { missing: Vec<String> },

    /// The resource does not exist or is not visible to the token.
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// A network level failure that persisted after every retry.
    #[error("Request {method} {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        method: String,
        url: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// A list endpoint returned an object without any array to iterate.
    ///
    /// The available top-level keys are included to make the failure diagnosable.
    #[error("Unrecognized response shape, available keys: [{}]", keys.join(", "))]
    UnrecognizedShape { keys: Vec<String> },

    /// A list endpoint returned a JSON value that is neither an array nor an object.
    #[error("Unexpected JSON type in paginated response: {0}")]
    UnexpectedJsonType(String),

    /// The final response status was not one the caller accepts.
    #[error("Unexpected status {status} for {method} {url}: {body}")]
    UnexpectedStatus {
        method: String,
        url: String,
        status: u16,
        body: String,
    },
}

impl Error {
    /// A short stable name for the error variant, used in reports and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Auth { .. } => "AuthError",
            Error::ClientBuild(_) => "ClientBuildError",
            Error::Deserialization(_) => "DeserializationError",
            Error::InvalidInput(_) => "InvalidInput",
            Error::MissingScopes { .. } => "MissingScopes",
            Error::NotFound { .. } => "NotFound",
            Error::Transport { .. } => "TransportError",
            Error::UnrecognizedShape { .. } => "UnrecognizedShape",
            Error::UnexpectedJsonType(_) => "UnexpectedJsonType",
            Error::UnexpectedStatus { .. } => "UnexpectedStatus",
        }
    }

    /// Returns `true` when the error means the credentials cannot perform the request.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. } | Error::MissingScopes { .. })
    }
}
