//! Repository-level bulk cleanups: workflow runs, releases and Actions caches.

use github_client::RequestExecutor;
use tracing::info;

use crate::bulk::{BulkDelete, DeleteSummary};
use crate::errors::Error;
use crate::target::RepoTarget;

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;

/// Deletes every completed workflow run of `target`.
pub async fn delete_completed_workflow_runs(
    executor: &RequestExecutor,
    target: &RepoTarget,
    page_size: u32,
) -> Result<DeleteSummary, Error> {
    info!(repo = %target, "Deleting completed workflow runs");
    let base = target.api_path();
    BulkDelete::new("workflow_run", format!("{base}/actions/runs"), |id| {
        format!("{base}/actions/runs/{id}")
    })
    .param("status", "completed")
    .array_key("workflow_runs")
    .label_fields(&["name", "display_title"])
    .page_size(page_size)
    .run(executor)
    .await
}

/// Deletes every release of `target`. Tags are left in place.
pub async fn delete_all_releases(
    executor: &RequestExecutor,
    target: &RepoTarget,
    page_size: u32,
) -> Result<DeleteSummary, Error> {
    info!(repo = %target, "Deleting releases");
    let base = target.api_path();
    BulkDelete::new("release", format!("{base}/releases"), |id| {
        format!("{base}/releases/{id}")
    })
    .label_fields(&["name", "tag_name"])
    .page_size(page_size)
    .run(executor)
    .await
}

/// Deletes every Actions cache entry of `target`.
pub async fn delete_all_caches(
    executor: &RequestExecutor,
    target: &RepoTarget,
    page_size: u32,
) -> Result<DeleteSummary, Error> {
    info!(repo = %target, "Deleting Actions caches");
    let base = target.api_path();
    BulkDelete::new("cache", format!("{base}/actions/caches"), |id| {
        format!("{base}/actions/caches/{id}")
    })
    .array_key("actions_caches")
    .label_fields(&["key"])
    .page_size(page_size)
    .run(executor)
    .await
}
