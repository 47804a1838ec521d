use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Process exit code for a successful run.
pub const EXIT_OK: i32 = 0;

/// Process exit code when an operation failed against the API.
pub const EXIT_FAILURE: i32 = 1;

/// Process exit code for invalid input or configuration.
pub const EXIT_USAGE: i32 = 2;

/// Errors that can occur in the ForgeOps CLI application.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading or resolving settings.
    ///
    /// Returned for a missing token, an unreadable configuration file or a
    /// value that cannot be used.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to parse a TOML configuration file.
    #[error("Failed to parse TOML configuration file.")]
    ParseTomlFile(#[source] toml::de::Error),

    /// Failed to flush the standard output buffer.
    #[error("Failed to flush the std out buffer.")]
    StdOutFlushFailed,

    /// Failed to render command output as JSON.
    #[error("Failed to render output: {0}")]
    Render(#[source] serde_json::Error),

    /// Failed to write the sync report.
    #[error("Failed to write report to {path:?}")]
    WriteReport {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A maintenance operation failed.
    #[error(transparent)]
    Operation(#[from] forgeops_core::Error),
}

impl From<github_client::Error> for Error {
    fn from(value: github_client::Error) -> Self {
        Error::Operation(value.into())
    }
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "ConfigError",
            Error::ParseTomlFile(_) => "ConfigError",
            Error::StdOutFlushFailed => "IoError",
            Error::Render(_) => "SerializationError",
            Error::WriteReport { .. } => "IoError",
            Error::Operation(inner) => inner.kind(),
        }
    }

    /// `2` for input and configuration problems, `1` for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::ParseTomlFile(_) => EXIT_USAGE,
            Error::Operation(inner) if inner.is_input_error() => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}
