//! Command output: JSON counters on stdout and a coloured one-line summary
//! on stderr.

use std::io::{self, Write};

use colored::Colorize;
use forgeops_core::{ClearOutcome, DeleteSummary, SyncReport};
use serde::Serialize;

use crate::errors::Error;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(Error::Render)
}

/// Prints `value` as JSON to stdout and `summary` to stderr.
pub fn emit<T: Serialize + ?Sized>(value: &T, summary: &str) -> Result<(), Error> {
    let json = render_json(value)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")
        .and_then(|_| stdout.flush())
        .map_err(|_| Error::StdOutFlushFailed)?;
    eprintln!("{summary}");
    Ok(())
}

fn line(label: &str, detail: String) -> String {
    format!("{} {}: {}", "✓".green(), label.bold(), detail)
}

fn dry_run_line(label: &str, detail: String) -> String {
    format!("{} {}: {}", "○".yellow(), label.bold(), detail)
}

pub fn count_line(label: &str, detail: &str) -> String {
    line(label, detail.to_string())
}

pub fn delete_summary_line(label: &str, summary: &DeleteSummary) -> String {
    let mut detail = format!("deleted {} of {} scanned", summary.deleted, summary.scanned);
    if summary.skipped > 0 {
        detail.push_str(&format!(", {} skipped", summary.skipped.to_string().yellow()));
    }
    line(label, detail)
}

pub fn clear_summary_line(outcome: &ClearOutcome) -> String {
    match outcome {
        ClearOutcome::Deleted(sweep) => match sweep.would_delete {
            Some(n) => dry_run_line(
                "code-scanning",
                format!("would delete {n} analyses ({} scanned)", sweep.scanned),
            ),
            None => line(
                "code-scanning",
                format!("deleted {} analyses ({} scanned)", sweep.deleted, sweep.scanned),
            ),
        },
        ClearOutcome::Dismissed(summary) => match summary.would_dismiss {
            Some(n) => dry_run_line(
                "code-scanning",
                format!("would dismiss {n} alerts ({} scanned)", summary.scanned),
            ),
            None => {
                let mut detail = format!(
                    "dismissed {} alerts ({} scanned)",
                    summary.dismissed, summary.scanned
                );
                if summary.failed > 0 {
                    detail.push_str(&format!(", {} failed", summary.failed.to_string().red()));
                }
                line("code-scanning", detail)
            }
        },
    }
}

pub fn sync_summary_line(report: &SyncReport) -> String {
    if report.dry_run {
        return dry_run_line(
            "social-sync",
            format!(
                "would follow {} and unfollow {}",
                report.to_follow.len(),
                report.to_unfollow.len()
            ),
        );
    }
    let mut detail = format!(
        "followed {}, unfollowed {}",
        report.followed.len(),
        report.unfollowed.len()
    );
    if !report.skipped.is_empty() {
        detail.push_str(&format!(
            ", {} skipped",
            report.skipped.len().to_string().yellow()
        ));
    }
    line("social-sync", detail)
}
