//! Repository cleanups: completed workflow runs, releases and Actions caches.

use forgeops_core::{
    delete_all_caches, delete_all_releases, delete_completed_workflow_runs, resolve_repo_target,
    DeleteSummary,
};
use github_client::RequestExecutor;
use tracing::instrument;

use crate::cli::RepoArgs;
use crate::commands::CommandContext;
use crate::errors::Error;

#[cfg(test)]
#[path = "cleanup_cmd_tests.rs"]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoCleanup {
    WorkflowRuns,
    Releases,
    Caches,
}

/// Resolves the repository and runs the cleanup.
#[instrument(skip(executor, ctx))]
pub async fn run(
    executor: &RequestExecutor,
    kind: RepoCleanup,
    args: &RepoArgs,
    ctx: &CommandContext<'_>,
) -> Result<DeleteSummary, Error> {
    let target = resolve_repo_target(
        args.owner.as_deref(),
        args.repo.as_deref(),
        ctx.env,
        ctx.prompter,
    )?;

    let summary = match kind {
        RepoCleanup::WorkflowRuns => {
            delete_completed_workflow_runs(executor, &target, ctx.page_size).await?
        }
        RepoCleanup::Releases => delete_all_releases(executor, &target, ctx.page_size).await?,
        RepoCleanup::Caches => delete_all_caches(executor, &target, ctx.page_size).await?,
    };
    Ok(summary)
}
