//! Error types for maintenance operations.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur while running a maintenance operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A GitHub request failed. Carries the underlying client error.
    #[error(transparent)]
    GitHub(#[from] github_client::Error),

    /// A parameter failed validation. Raised before any request is sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required value was not supplied and could not be resolved.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Reading an interactive answer failed.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure is the caller's input rather than the API.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_)
                | Error::MissingInput(_)
                | Error::GitHub(github_client::Error::InvalidInput(_))
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::GitHub(inner) => inner.kind(),
            Error::InvalidInput(_) => "InvalidInput",
            Error::MissingInput(_) => "MissingInput",
            Error::Prompt(_) => "PromptError",
            Error::Serialization(_) => "SerializationError",
        }
    }
}
