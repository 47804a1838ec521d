//! `forgeops code-scanning`: delete analyses or dismiss alerts.

use forgeops_core::vulns::run_clear;
use forgeops_core::{resolve_repo_target, ClearOptions, ClearOutcome, ClearRequest, CodeScanningClient};
use github_client::RequestExecutor;
use tracing::instrument;

use crate::cli::CodeScanningArgs;
use crate::commands::CommandContext;
use crate::errors::Error;

#[cfg(test)]
#[path = "code_scanning_cmd_tests.rs"]
mod tests;

/// Validates the flag values into a request without touching the API.
pub fn request_from_args(args: &CodeScanningArgs) -> Result<ClearRequest, Error> {
    let options = ClearOptions {
        mode: args.mode.clone(),
        tools: args.tools.clone(),
        reason: args.reason.clone(),
        comment: args.comment.clone(),
        state: args.state.clone(),
        dry_run: args.dry_run,
    };
    Ok(ClearRequest::from_options(&options)?)
}

#[instrument(skip_all)]
pub async fn run(
    executor: &RequestExecutor,
    args: &CodeScanningArgs,
    ctx: &CommandContext<'_>,
) -> Result<ClearOutcome, Error> {
    let request = request_from_args(args)?;
    let target = resolve_repo_target(
        args.repo.owner.as_deref(),
        args.repo.repo.as_deref(),
        ctx.env,
        ctx.prompter,
    )?;
    let client = CodeScanningClient::new(executor, target).with_page_size(ctx.page_size);
    Ok(run_clear(&client, &request).await?)
}
