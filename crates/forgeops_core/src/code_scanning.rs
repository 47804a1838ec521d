//! Code Scanning analyses and alerts.
//!
//! Deleting an analysis is a chain of DELETE calls: GitHub answers with a
//! `confirm_delete_url` or `next_analysis_url` that must be followed until the
//! chain ends. Deleting all analyses for a tool repeats a fresh scan after
//! every deletion because each deletion changes which analyses are deletable.

use std::collections::HashSet;
use std::fmt;

use github_client::{
    status_error, HttpMethod, HttpResponse, Paginator, Record, RequestExecutor,
    DEFAULT_PAGE_SIZE,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::Error;
use crate::target::RepoTarget;

#[cfg(test)]
#[path = "code_scanning_tests.rs"]
mod tests;

/// Query parameter that confirms deletion of the last analysis of a chain.
pub const CONFIRM_PARAM: &str = "confirm_delete";

const DELETE_CHAIN_OK: &[u16] = &[200, 202, 204];

/// GitHub truncates longer dismissal comments.
const MAX_COMMENT_CHARS: usize = 280;

/// Alert state used to filter listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    #[default]
    Open,
    Dismissed,
    Fixed,
}

impl AlertState {
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(AlertState::Open),
            "dismissed" => Ok(AlertState::Dismissed),
            "fixed" => Ok(AlertState::Fixed),
            other => Err(Error::InvalidInput(format!(
                "alert state '{other}' is not one of open, dismissed, fixed"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertState::Open => "open",
            AlertState::Dismissed => "dismissed",
            AlertState::Fixed => "fixed",
        }
    }
}

/// Why an alert is dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DismissReason {
    FalsePositive,
    #[default]
    WontFix,
    UsedInTests,
}

impl DismissReason {
    /// Accepts `false_positive`, `won't_fix` (or `wont_fix`) and `used_in_tests`.
    pub fn parse(value: &str) -> Result<Self, Error> {
        let normalized = value.trim().to_ascii_lowercase().replace(' ', "_");
        match normalized.as_str() {
            "false_positive" => Ok(DismissReason::FalsePositive),
            "won't_fix" | "wont_fix" => Ok(DismissReason::WontFix),
            "used_in_tests" => Ok(DismissReason::UsedInTests),
            _ => Err(Error::InvalidInput(format!(
                "dismiss reason '{value}' is not one of false_positive, won't_fix, used_in_tests"
            ))),
        }
    }

    /// The value the alerts endpoint expects.
    pub fn api_value(self) -> &'static str {
        match self {
            DismissReason::FalsePositive => "false positive",
            DismissReason::WontFix => "won't fix",
            DismissReason::UsedInTests => "used in tests",
        }
    }
}

impl fmt::Display for DismissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_value())
    }
}

/// Tool names an operation is restricted to. Empty matches every tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFilter(Vec<String>);

impl ToolFilter {
    pub fn new(tools: Vec<String>) -> Self {
        Self(tools)
    }

    /// Parses a comma-separated list, ignoring blanks.
    pub fn parse_csv(value: &str) -> Self {
        Self(
            value
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tools(&self) -> &[String] {
        &self.0
    }

    /// Case-insensitive match. A record without a tool name never matches a
    /// non-empty filter.
    pub fn matches(&self, tool: Option<&str>) -> bool {
        if self.0.is_empty() {
            return true;
        }
        match tool {
            Some(name) => self.0.iter().any(|t| t.eq_ignore_ascii_case(name)),
            None => false,
        }
    }
}

/// Adds `confirm_delete=true` to `url` unless it already carries the parameter.
pub fn with_confirm_flag(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if !parsed.query_pairs().any(|(k, _)| k == CONFIRM_PARAM) {
                parsed.query_pairs_mut().append_pair(CONFIRM_PARAM, "true");
            }
            parsed.to_string()
        }
        Err(_) if url.contains(CONFIRM_PARAM) => url.to_string(),
        Err(_) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}{CONFIRM_PARAM}=true")
        }
    }
}

/// Result of deleting one analysis chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisDeletion {
    pub analysis_id: u64,
    /// DELETE calls issued, including follow-ups.
    pub requests: u32,
}

/// Counters for a delete-analyses run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSweep {
    /// Analyses observed across every scan.
    pub scanned: u64,
    pub deleted: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_delete: Option<u64>,
}

/// Counters for a dismiss-alerts run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DismissSummary {
    pub scanned: u64,
    pub dismissed: u64,
    pub failed: u64,
    pub skipped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_dismiss: Option<u64>,
}

#[derive(Debug)]
enum DeletionState {
    Initial,
    AwaitingConfirm,
    Following(String),
    Done,
}

/// Code Scanning operations for one repository.
pub struct CodeScanningClient<'a> {
    executor: &'a RequestExecutor,
    target: RepoTarget,
    page_size: u32,
}

impl<'a> CodeScanningClient<'a> {
    pub fn new(executor: &'a RequestExecutor, target: RepoTarget) -> Self {
        Self {
            executor,
            target,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn target(&self) -> &RepoTarget {
        &self.target
    }

    /// All analyses, newest first.
    pub fn analyses(&self) -> Paginator<'a> {
        Paginator::new(
            self.executor,
            format!("{}/code-scanning/analyses", self.target.api_path()),
        )
        .with_page_size(self.page_size)
    }

    /// Alerts in `state`.
    pub fn alerts(&self, state: AlertState) -> Paginator<'a> {
        Paginator::new(
            self.executor,
            format!("{}/code-scanning/alerts", self.target.api_path()),
        )
        .with_param("state", state.as_str())
        .with_page_size(self.page_size)
    }

    /// Deletes one analysis, following confirmation and continuation URLs
    /// until GitHub reports the chain finished.
    ///
    /// # Errors
    ///
    /// Any status other than `200`, `202` or `204` along the chain, except
    /// the single `400` that asks for confirmation.
    #[instrument(skip(self), fields(repo = %self.target))]
    pub async fn delete_analysis(&self, analysis_id: u64) -> Result<AnalysisDeletion, Error> {
        let base = self.executor.url(&format!(
            "{}/code-scanning/analyses/{analysis_id}",
            self.target.api_path()
        ));
        let mut requests: u32 = 0;
        let mut state = DeletionState::Initial;

        loop {
            debug!(state = ?state, "Analysis deletion step");
            state = match state {
                DeletionState::Initial => {
                    let response = self.send_delete(&base, &mut requests).await?;
                    if response.status == 400
                        && response.body.to_ascii_lowercase().contains(CONFIRM_PARAM)
                    {
                        DeletionState::AwaitingConfirm
                    } else {
                        next_state(&base, response)?
                    }
                }
                DeletionState::AwaitingConfirm => {
                    let url = with_confirm_flag(&base);
                    let response = self.send_delete(&url, &mut requests).await?;
                    next_state(&url, response)?
                }
                DeletionState::Following(url) => {
                    let response = self.send_delete(&url, &mut requests).await?;
                    next_state(&url, response)?
                }
                DeletionState::Done => {
                    info!(
                        event = "analysis_deleted",
                        analysis_id,
                        requests,
                        "Deleted analysis"
                    );
                    return Ok(AnalysisDeletion {
                        analysis_id,
                        requests,
                    });
                }
            };
        }
    }

    async fn send_delete(&self, url: &str, requests: &mut u32) -> Result<HttpResponse, Error> {
        *requests += 1;
        Ok(self
            .executor
            .execute(HttpMethod::Delete, url, &[], None, DELETE_CHAIN_OK)
            .await?)
    }

    /// Deletes every deletable analysis whose tool matches `tools`.
    ///
    /// After each deletion the listing is scanned again from the first page.
    /// An analysis id is attempted at most once. With `dry_run` the listing is
    /// scanned once and the currently deletable analyses are reported.
    ///
    /// # Errors
    ///
    /// The first failed deletion aborts the run.
    #[instrument(skip(self, tools), fields(repo = %self.target, tools = ?tools.tools()))]
    pub async fn delete_analyses(
        &self,
        tools: &ToolFilter,
        dry_run: bool,
    ) -> Result<AnalysisSweep, Error> {
        let mut sweep = AnalysisSweep::default();
        let mut attempted: HashSet<u64> = HashSet::new();
        let mut would_delete = 0;

        loop {
            let mut analyses = self.analyses();
            let mut candidate = None;

            while let Some(analysis) = analyses.next_record().await? {
                sweep.scanned += 1;
                if !analysis.deletable() || !tools.matches(analysis.tool_name()) {
                    continue;
                }
                let Some(id) = analysis.id() else {
                    warn!(
                        event = "record_skipped",
                        reason = "missing id",
                        "Skipping deletable analysis without id"
                    );
                    continue;
                };
                if !attempted.insert(id) {
                    continue;
                }
                if dry_run {
                    info!(
                        event = "analysis_would_delete",
                        analysis_id = id,
                        tool = analysis.tool_name().unwrap_or_default(),
                        "Dry run, analysis would be deleted"
                    );
                    would_delete += 1;
                    continue;
                }
                candidate = Some(id);
                break;
            }

            let Some(id) = candidate else { break };
            if let Err(err) = self.delete_analysis(id).await {
                error!(
                    event = "analysis_delete_failed",
                    analysis_id = id,
                    deleted_so_far = sweep.deleted,
                    error_message = %err,
                    "Analysis deletion failed, aborting"
                );
                return Err(err);
            }
            sweep.deleted += 1;
        }

        if dry_run {
            sweep.would_delete = Some(would_delete);
        }
        info!(
            event = "delete_analyses_done",
            scanned = sweep.scanned,
            deleted = sweep.deleted,
            "Finished deleting analyses"
        );
        Ok(sweep)
    }

    /// Dismisses one alert.
    pub async fn dismiss_alert(
        &self,
        number: u64,
        reason: DismissReason,
        comment: &str,
    ) -> Result<(), Error> {
        let comment: String = comment.chars().take(MAX_COMMENT_CHARS).collect();
        let body = json!({
            "state": "dismissed",
            "dismissed": true,
            "dismissed_reason": reason.api_value(),
            "dismissed_comment": comment,
        });
        self.executor
            .patch_json(
                &format!(
                    "{}/code-scanning/alerts/{number}",
                    self.target.api_path()
                ),
                &body,
                &[200],
            )
            .await?;
        Ok(())
    }

    /// Dismisses every alert in `state` whose tool matches `tools`.
    ///
    /// The matching alerts are collected before the first PATCH so that
    /// dismissals do not shift later pages. A failed dismissal is logged and
    /// counted, and the run continues.
    #[instrument(skip(self, tools, comment), fields(repo = %self.target, tools = ?tools.tools()))]
    pub async fn dismiss_alerts(
        &self,
        tools: &ToolFilter,
        state: AlertState,
        reason: DismissReason,
        comment: &str,
        dry_run: bool,
    ) -> Result<DismissSummary, Error> {
        let alerts = self.alerts(state).collect_all().await?;
        let mut summary = DismissSummary {
            scanned: alerts.len() as u64,
            ..DismissSummary::default()
        };
        let mut would_dismiss = 0;

        for alert in alerts.iter().filter(|a| tools.matches(a.tool_name())) {
            let Some(number) = alert.number() else {
                warn!(
                    event = "record_skipped",
                    reason = "missing or invalid number",
                    "Skipping alert"
                );
                summary.skipped += 1;
                continue;
            };
            let rule = rule_id(alert).unwrap_or_default();

            if dry_run {
                info!(
                    event = "alert_would_dismiss",
                    alert_number = number,
                    rule,
                    "Dry run, alert would be dismissed"
                );
                would_dismiss += 1;
                continue;
            }

            match self.dismiss_alert(number, reason, comment).await {
                Ok(()) => {
                    info!(
                        event = "alert_dismissed",
                        alert_number = number,
                        rule,
                        "Dismissed alert"
                    );
                    summary.dismissed += 1;
                }
                Err(err) => {
                    warn!(
                        event = "alert_dismiss_failed",
                        alert_number = number,
                        rule,
                        error_type = err.kind(),
                        error_message = %err,
                        "Failed to dismiss alert, continuing"
                    );
                    summary.failed += 1;
                }
            }
        }

        if dry_run {
            summary.would_dismiss = Some(would_dismiss);
        }
        info!(
            event = "dismiss_alerts_done",
            scanned = summary.scanned,
            dismissed = summary.dismissed,
            failed = summary.failed,
            "Finished dismissing alerts"
        );
        Ok(summary)
    }
}

/// `rule.id`, falling back to `rule.name`.
fn rule_id(alert: &Record) -> Option<&str> {
    let rule = alert.get("rule")?;
    rule.get("id")
        .and_then(Value::as_str)
        .or_else(|| rule.get("name").and_then(Value::as_str))
}

/// Handles a `200`, `202` or `204` answer in the deletion chain.
fn next_state(url: &str, response: HttpResponse) -> Result<DeletionState, Error> {
    match response.status {
        204 => Ok(DeletionState::Done),
        200 | 202 => {
            let body: Value = if response.body.trim().is_empty() {
                Value::Null
            } else {
                response.json()?
            };
            let follow_up = ["confirm_delete_url", "next_analysis_url"]
                .iter()
                .filter_map(|key| body.get(*key).and_then(Value::as_str))
                .find(|u| !u.is_empty());
            match follow_up {
                Some(next) => Ok(DeletionState::Following(with_confirm_flag(next))),
                None => Ok(DeletionState::Done),
            }
        }
        _ => Err(status_error(HttpMethod::Delete, url, response).into()),
    }
}
