//! Pre-flight checks that a token can run an operation.

use std::collections::BTreeSet;

use tracing::{info, instrument, warn};

use crate::errors::Error;
use crate::executor::RequestExecutor;
use crate::http::HttpResponse;

#[cfg(test)]
#[path = "token_guard_tests.rs"]
mod tests;

/// What the pre-flight checks found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatus {
    /// Scopes reported by `X-OAuth-Scopes`. Empty for fine-grained and
    /// Actions tokens, which do not report scopes.
    pub granted_scopes: BTreeSet<String>,
    pub core_remaining: Option<i64>,
}

/// Parses the comma-separated `X-OAuth-Scopes` header.
pub fn granted_scopes(response: &HttpResponse) -> BTreeSet<String> {
    response
        .header("x-oauth-scopes")
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Whether `granted` covers `required`, accounting for parent scopes.
pub fn scope_satisfied(required: &str, granted: &BTreeSet<String>) -> bool {
    if granted.contains(required) {
        return true;
    }
    let parents: &[&str] = match required {
        "read:packages" => &["write:packages", "delete:packages"],
        "security_events" => &["repo"],
        "public_repo" => &["repo"],
        _ => &[],
    };
    parents.iter().any(|p| granted.contains(*p))
}

/// Verifies the token is accepted and carries `required` scopes, then waits
/// if the core quota is already exhausted.
///
/// # Errors
///
/// `Error::Auth` when `/user` rejects the token and `Error::MissingScopes`
/// when a classic token lacks a required scope.
#[instrument(skip(executor))]
pub async fn ensure_token_ready(
    executor: &RequestExecutor,
    required: &[&str],
) -> Result<TokenStatus, Error> {
    let user = executor.get("user", &[]).await?;
    let granted = granted_scopes(&user);

    if granted.is_empty() {
        warn!(
            event = "token_scopes_unreported",
            "Token does not report OAuth scopes, skipping scope validation"
        );
    } else {
        let missing: Vec<String> = required
            .iter()
            .filter(|scope| !scope_satisfied(scope, &granted))
            .map(|scope| scope.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingScopes { missing });
        }
    }

    let limits = executor.get_json("rate_limit", &[]).await?;
    let core = &limits["resources"]["core"];
    let remaining = core["remaining"].as_i64();
    if let Some(remaining) = remaining {
        if remaining <= 0 {
            executor.wait_for_reset(core["reset"].as_i64()).await;
        }
    }

    info!(
        event = "token_ready",
        scopes = ?granted,
        core_remaining = ?remaining,
        "Token checks passed"
    );

    Ok(TokenStatus {
        granted_scopes: granted,
        core_remaining: remaining,
    })
}
