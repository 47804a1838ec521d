//! `forgeops social-sync`: follow back followers, unfollow the rest.

use std::fs;
use std::path::Path;

use forgeops_core::{SocialClient, SyncOptions, SyncReport};
use github_client::RequestExecutor;
use tracing::{info, instrument};

use crate::cli::SocialSyncArgs;
use crate::commands::CommandContext;
use crate::errors::Error;

#[cfg(test)]
#[path = "social_cmd_tests.rs"]
mod tests;

/// Writes `report` as pretty JSON, creating parent directories.
pub fn write_report(report: &SyncReport, path: &Path) -> Result<(), Error> {
    let json = report.to_json()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::WriteReport {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| Error::WriteReport {
        path: path.to_path_buf(),
        source,
    })?;
    info!(event = "report_written", path = %path.display(), "Wrote sync report");
    Ok(())
}

#[instrument(skip_all)]
pub async fn run(
    executor: &RequestExecutor,
    args: &SocialSyncArgs,
    ctx: &CommandContext<'_>,
) -> Result<SyncReport, Error> {
    let options = SyncOptions {
        dry_run: ctx.social.dry_run,
        allowlist: ctx.social.allowlist.clone(),
        blocklist: ctx.social.blocklist.clone(),
    };
    let report = SocialClient::new(executor)
        .with_page_size(ctx.page_size)
        .sync(&options)
        .await?;

    if let Some(path) = &args.report_out {
        write_report(&report, path)?;
    }
    Ok(report)
}
