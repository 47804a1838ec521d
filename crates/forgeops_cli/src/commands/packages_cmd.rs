//! `forgeops packages ...`: listing packages and deleting packages or versions.

use forgeops_core::{
    delete_all_package_versions, delete_package, delete_package_versions, list_packages,
    resolve_package_scope, DeleteSummary, PackageScope, PackageType,
};
use github_client::{Record, RequestExecutor};
use serde::Serialize;
use tracing::instrument;

use crate::cli::{PackageScopeArgs, PackagesCommands};
use crate::commands::CommandContext;
use crate::errors::Error;

#[cfg(test)]
#[path = "packages_cmd_tests.rs"]
mod tests;

/// One row of `packages list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRow {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub visibility: Option<String>,
}

impl From<&Record> for PackageRow {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id(),
            name: record.str_field("name").map(str::to_string),
            visibility: record.str_field("visibility").map(str::to_string),
        }
    }
}

/// Result of a packages subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PackagesOutcome {
    Listed { packages: Vec<PackageRow> },
    PackageDeleted { deleted: String },
    VersionsDeleted(DeleteSummary),
}

impl PackagesOutcome {
    pub fn summary_line(&self) -> String {
        match self {
            PackagesOutcome::Listed { packages } => {
                crate::output::count_line("packages", &format!("{} found", packages.len()))
            }
            PackagesOutcome::PackageDeleted { deleted } => {
                crate::output::count_line("packages", &format!("deleted {deleted}"))
            }
            PackagesOutcome::VersionsDeleted(summary) => {
                crate::output::delete_summary_line("package-versions", summary)
            }
        }
    }
}

fn scope_and_type(
    args: &PackageScopeArgs,
    ctx: &CommandContext<'_>,
) -> Result<(PackageScope, PackageType), Error> {
    let scope = resolve_package_scope(
        args.user.as_deref(),
        args.org.as_deref(),
        ctx.env,
        ctx.prompter,
    )?;
    Ok((scope, PackageType::parse_lenient(&args.package_type)))
}

fn package_name(package: Option<&str>, ctx: &CommandContext<'_>) -> Result<String, Error> {
    let explicit = package.map(str::trim).filter(|p| !p.is_empty());
    if let Some(name) = explicit {
        return Ok(name.to_string());
    }
    if let Some(prompter) = ctx.prompter {
        let answer = prompter.ask("Package name: ")?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
    Err(forgeops_core::Error::MissingInput("package name (set --package)".to_string()).into())
}

#[instrument(skip_all)]
pub async fn run(
    executor: &RequestExecutor,
    command: &PackagesCommands,
    ctx: &CommandContext<'_>,
) -> Result<PackagesOutcome, Error> {
    match command {
        PackagesCommands::List { scope } => {
            let (scope, package_type) = scope_and_type(scope, ctx)?;
            let records = list_packages(executor, &scope, package_type, ctx.page_size).await?;
            Ok(PackagesOutcome::Listed {
                packages: records.iter().map(PackageRow::from).collect(),
            })
        }
        PackagesCommands::Delete { scope, package } => {
            let (scope, package_type) = scope_and_type(scope, ctx)?;
            let package = package_name(package.as_deref(), ctx)?;
            delete_package(executor, &scope, package_type, &package).await?;
            Ok(PackagesOutcome::PackageDeleted { deleted: package })
        }
        PackagesCommands::DeleteVersions {
            scope,
            package,
            versions,
            all_versions,
        } => {
            let (scope, package_type) = scope_and_type(scope, ctx)?;
            let package = package_name(package.as_deref(), ctx)?;
            let summary = if *all_versions {
                delete_all_package_versions(executor, &scope, package_type, &package, ctx.page_size)
                    .await?
            } else {
                delete_package_versions(executor, &scope, package_type, &package, versions).await?
            };
            Ok(PackagesOutcome::VersionsDeleted(summary))
        }
    }
}
