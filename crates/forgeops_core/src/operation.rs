//! The maintenance operations and the token scopes each needs.

use std::fmt;

use github_client::{ensure_token_ready, RequestExecutor, TokenStatus};
use tracing::debug;

use crate::errors::Error;

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    WorkflowRuns,
    Releases,
    Caches,
    PackagesList,
    PackagesDelete,
    CodeScanning,
    SocialSync,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::WorkflowRuns => "workflow-runs",
            Operation::Releases => "releases",
            Operation::Caches => "caches",
            Operation::PackagesList => "packages-list",
            Operation::PackagesDelete => "packages-delete",
            Operation::CodeScanning => "code-scanning",
            Operation::SocialSync => "social-sync",
        }
    }

    /// Classic token scopes the operation needs.
    pub fn required_scopes(self) -> &'static [&'static str] {
        match self {
            Operation::WorkflowRuns => &["repo", "workflow"],
            Operation::Releases | Operation::Caches => &["repo"],
            Operation::PackagesList => &["read:packages"],
            Operation::PackagesDelete => &["delete:packages"],
            Operation::CodeScanning => &["security_events"],
            Operation::SocialSync => &["user:follow"],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that the token can run `operation` and that the core quota is not
/// exhausted, waiting for the reset if it is.
pub async fn check_token(
    executor: &RequestExecutor,
    operation: Operation,
) -> Result<TokenStatus, Error> {
    let status = ensure_token_ready(executor, operation.required_scopes()).await?;
    debug!(operation = operation.as_str(), "Token ready for operation");
    Ok(status)
}
