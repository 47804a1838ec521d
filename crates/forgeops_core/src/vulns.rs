//! The single "clear vulnerabilities" entry point used by the CLI.
//!
//! Raw option strings are validated into a [`ClearRequest`] before any
//! request is sent, so a bad mode or reason never touches the API.

use std::fmt;

use github_client::redact::log_payload;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, instrument, Level};

use crate::code_scanning::{
    AlertState, AnalysisSweep, CodeScanningClient, DismissReason, DismissSummary, ToolFilter,
};
use crate::errors::Error;

#[cfg(test)]
#[path = "vulns_tests.rs"]
mod tests;

pub const DEFAULT_TOOLS: &str = "Trivy,Grype";
pub const DEFAULT_REASON: &str = "won't_fix";
pub const DEFAULT_COMMENT: &str = "Bulk reset: issues will reappear if they persist.";
pub const DEFAULT_STATE: &str = "open";

/// Whether analyses are deleted or alerts dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearMode {
    Delete,
    Dismiss,
}

impl ClearMode {
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "delete" => Ok(ClearMode::Delete),
            "dismiss" => Ok(ClearMode::Dismiss),
            _ => {
                error!(event = "clear_vulns_mode_invalid", mode = value, "Invalid mode");
                Err(Error::InvalidInput(format!(
                    "mode '{value}' must be 'delete' or 'dismiss'"
                )))
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClearMode::Delete => "delete",
            ClearMode::Dismiss => "dismiss",
        }
    }
}

impl fmt::Display for ClearMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated options as they arrive from flags or configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearOptions {
    pub mode: String,
    pub tools: String,
    pub reason: String,
    pub comment: String,
    pub state: String,
    pub dry_run: bool,
}

impl ClearOptions {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            tools: DEFAULT_TOOLS.to_string(),
            reason: DEFAULT_REASON.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
            state: DEFAULT_STATE.to_string(),
            dry_run: false,
        }
    }
}

/// Validated parameters for [`clear_vulns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearRequest {
    pub mode: ClearMode,
    pub tools: ToolFilter,
    pub reason: DismissReason,
    pub comment: String,
    pub state: AlertState,
    pub dry_run: bool,
}

impl ClearRequest {
    /// Validates `options`. The reason and state only matter when
    /// dismissing and are only checked in that mode.
    pub fn from_options(options: &ClearOptions) -> Result<Self, Error> {
        let mode = ClearMode::parse(&options.mode)?;
        let (reason, state) = match mode {
            ClearMode::Delete => (DismissReason::default(), AlertState::default()),
            ClearMode::Dismiss => {
                let reason = DismissReason::parse(&options.reason).inspect_err(|_| {
                    error!(
                        event = "clear_vulns_reason_invalid",
                        reason = %options.reason,
                        "Invalid dismiss reason"
                    );
                })?;
                (reason, AlertState::parse(&options.state)?)
            }
        };

        Ok(Self {
            mode,
            tools: ToolFilter::parse_csv(&options.tools),
            reason,
            comment: options.comment.clone(),
            state,
            dry_run: options.dry_run,
        })
    }
}

/// Counters of a clear run, shaped by the mode that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ClearOutcome {
    Deleted(AnalysisSweep),
    Dismissed(DismissSummary),
}

impl ClearOutcome {
    pub fn scanned(&self) -> u64 {
        match self {
            ClearOutcome::Deleted(sweep) => sweep.scanned,
            ClearOutcome::Dismissed(summary) => summary.scanned,
        }
    }
}

/// Validates `options` and runs the selected mode against the client's
/// repository.
pub async fn clear_vulns(
    client: &CodeScanningClient<'_>,
    options: &ClearOptions,
) -> Result<ClearOutcome, Error> {
    let request = ClearRequest::from_options(options)?;
    run_clear(client, &request).await
}

/// Runs an already validated request.
#[instrument(skip(client, request), fields(repo = %client.target(), mode = %request.mode, dry_run = request.dry_run))]
pub async fn run_clear(
    client: &CodeScanningClient<'_>,
    request: &ClearRequest,
) -> Result<ClearOutcome, Error> {
    log_payload(
        Level::INFO,
        "clear_vulns_start",
        &json!({
            "repo": client.target().to_string(),
            "mode": request.mode.as_str(),
            "tools": request.tools.tools(),
            "state": request.state.as_str(),
            "reason": request.reason.api_value(),
            "dry_run": request.dry_run,
        }),
    );

    let outcome = match request.mode {
        ClearMode::Delete => {
            ClearOutcome::Deleted(client.delete_analyses(&request.tools, request.dry_run).await?)
        }
        ClearMode::Dismiss => ClearOutcome::Dismissed(
            client
                .dismiss_alerts(
                    &request.tools,
                    request.state,
                    request.reason,
                    &request.comment,
                    request.dry_run,
                )
                .await?,
        ),
    };

    info!(
        event = "clear_vulns_complete",
        scanned = outcome.scanned(),
        "Finished clearing code scanning results"
    );
    Ok(outcome)
}
