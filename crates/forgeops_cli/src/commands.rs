//! Command modules for the ForgeOps CLI.
//!
//! - `cleanup_cmd`: workflow runs, releases and Actions caches
//! - `packages_cmd`: package listing and deletion
//! - `code_scanning_cmd`: analysis deletion and alert dismissal
//! - `social_cmd`: follow/unfollow synchronization

use forgeops_core::Prompter;
use github_client::RequestExecutor;
use tracing::instrument;

use crate::cli::Commands;
use crate::config::{EnvLookup, SocialSettings};
use crate::errors::Error;
use crate::output;

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

pub mod cleanup_cmd;
pub mod code_scanning_cmd;
pub mod packages_cmd;
pub mod social_cmd;

/// What every command needs besides its own arguments.
pub struct CommandContext<'a> {
    pub env: EnvLookup<'a>,
    pub prompter: Option<&'a dyn Prompter>,
    pub page_size: u32,
    pub social: &'a SocialSettings,
}

/// Checks command arguments that can be rejected without calling the API.
pub fn validate(command: &Commands) -> Result<(), Error> {
    if let Commands::CodeScanning(args) = command {
        code_scanning_cmd::request_from_args(args)?;
    }
    Ok(())
}

pub fn version_line() -> String {
    format!(
        "forgeops version {}",
        option_env!("FORGEOPS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
    )
}

fn require_executor(executor: Option<&RequestExecutor>) -> Result<&RequestExecutor, Error> {
    executor.ok_or_else(|| {
        Error::Config("No GitHub token found. Set --token, GH_TOKEN or GITHUB_TOKEN".to_string())
    })
}

/// Runs `command` and prints its result.
///
/// `executor` is `None` when no token was configured. Only `version` runs
/// without one.
#[instrument(skip_all)]
pub async fn execute(
    command: &Commands,
    executor: Option<&RequestExecutor>,
    ctx: &CommandContext<'_>,
) -> Result<(), Error> {
    match command {
        Commands::WorkflowRuns(args) => {
            let executor = require_executor(executor)?;
            let summary =
                cleanup_cmd::run(executor, cleanup_cmd::RepoCleanup::WorkflowRuns, args, ctx)
                    .await?;
            output::emit(&summary, &output::delete_summary_line("workflow-runs", &summary))
        }
        Commands::Releases(args) => {
            let executor = require_executor(executor)?;
            let summary =
                cleanup_cmd::run(executor, cleanup_cmd::RepoCleanup::Releases, args, ctx).await?;
            output::emit(&summary, &output::delete_summary_line("releases", &summary))
        }
        Commands::Caches(args) => {
            let executor = require_executor(executor)?;
            let summary =
                cleanup_cmd::run(executor, cleanup_cmd::RepoCleanup::Caches, args, ctx).await?;
            output::emit(&summary, &output::delete_summary_line("caches", &summary))
        }
        Commands::Packages(cmd) => {
            let executor = require_executor(executor)?;
            let outcome = packages_cmd::run(executor, cmd, ctx).await?;
            output::emit(&outcome, &outcome.summary_line())
        }
        Commands::CodeScanning(args) => {
            let executor = require_executor(executor)?;
            let outcome = code_scanning_cmd::run(executor, args, ctx).await?;
            output::emit(&outcome, &output::clear_summary_line(&outcome))
        }
        Commands::SocialSync(args) => {
            let executor = require_executor(executor)?;
            let report = social_cmd::run(executor, args, ctx).await?;
            output::emit(&report, &output::sync_summary_line(&report))
        }
        Commands::Version => {
            println!("{}", version_line());
            Ok(())
        }
    }
}
