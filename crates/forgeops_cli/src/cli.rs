//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use forgeops_core::vulns::{DEFAULT_COMMENT, DEFAULT_REASON, DEFAULT_STATE, DEFAULT_TOOLS};
use forgeops_core::Operation;

use crate::config::FlagOverrides;

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

/// ForgeOps: bulk maintenance for GitHub repositories, packages and accounts
#[derive(Parser)]
#[command(name = "forgeops")]
#[command(about = "Bulk maintenance for GitHub repositories, packages and accounts", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Default)]
pub struct GlobalArgs {
    /// GitHub token. Defaults to GH_TOKEN, then GITHUB_TOKEN.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API root, for GitHub Enterprise Server.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Configuration file. Defaults to ./forgeops.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARNING, ERROR).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, conflicts_with = "no_log_json")]
    pub log_json: bool,

    /// Emit human-readable logs.
    #[arg(long, global = true)]
    pub no_log_json: bool,

    /// Records per page, 1 to 100.
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub page_size: Option<i64>,

    /// Skip the token scope and quota check before running.
    #[arg(long, global = true)]
    pub skip_token_check: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Delete every completed workflow run of a repository
    WorkflowRuns(RepoArgs),

    /// Delete every release of a repository
    Releases(RepoArgs),

    /// Delete every Actions cache of a repository
    Caches(RepoArgs),

    /// List or delete packages and package versions
    #[command(subcommand)]
    Packages(PackagesCommands),

    /// Delete Code Scanning analyses or dismiss alerts
    CodeScanning(CodeScanningArgs),

    /// Follow back followers and unfollow accounts that do not follow back
    SocialSync(SocialSyncArgs),

    /// Show the CLI version
    Version,
}

impl Commands {
    /// The operation whose token scopes are checked before running.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Commands::WorkflowRuns(_) => Some(Operation::WorkflowRuns),
            Commands::Releases(_) => Some(Operation::Releases),
            Commands::Caches(_) => Some(Operation::Caches),
            Commands::Packages(PackagesCommands::List { .. }) => Some(Operation::PackagesList),
            Commands::Packages(_) => Some(Operation::PackagesDelete),
            Commands::CodeScanning(_) => Some(Operation::CodeScanning),
            Commands::SocialSync(_) => Some(Operation::SocialSync),
            Commands::Version => None,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RepoArgs {
    /// Repository owner. Defaults to GH_OWNER.
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name or OWNER/REPO. Defaults to GH_REPO.
    #[arg(long)]
    pub repo: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PackageScopeArgs {
    /// Organization that owns the packages.
    #[arg(long, conflicts_with = "user")]
    pub org: Option<String>,

    /// User that owns the packages.
    #[arg(long)]
    pub user: Option<String>,

    /// Package type: container, npm, maven, rubygems or nuget.
    #[arg(long = "type", default_value = "container")]
    pub package_type: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PackagesCommands {
    /// List packages
    List {
        #[command(flatten)]
        scope: PackageScopeArgs,
    },

    /// Delete a package with all of its versions
    Delete {
        #[command(flatten)]
        scope: PackageScopeArgs,

        /// Package name.
        #[arg(long)]
        package: Option<String>,
    },

    /// Delete package versions by id, or all of them
    DeleteVersions {
        #[command(flatten)]
        scope: PackageScopeArgs,

        /// Package name.
        #[arg(long)]
        package: Option<String>,

        /// Comma-separated version ids.
        #[arg(long, value_delimiter = ',', conflicts_with = "all_versions")]
        versions: Vec<String>,

        /// Delete every listed version.
        #[arg(long)]
        all_versions: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CodeScanningArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// delete (analyses) or dismiss (alerts).
    #[arg(long)]
    pub mode: String,

    /// Comma-separated tool names. Empty selects every tool.
    #[arg(long, default_value = DEFAULT_TOOLS)]
    pub tools: String,

    /// Dismiss reason: false_positive, won't_fix or used_in_tests.
    #[arg(long, default_value = DEFAULT_REASON)]
    pub reason: String,

    /// Dismiss comment.
    #[arg(long, default_value = DEFAULT_COMMENT)]
    pub comment: String,

    /// Alert state to select: open, dismissed or fixed.
    #[arg(long, default_value = DEFAULT_STATE)]
    pub state: String,

    /// Report what would change without changing it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SocialSyncArgs {
    /// Report planned changes only. Defaults to SYNC_DRY_RUN, then true.
    #[arg(long, conflicts_with = "no_dry_run")]
    pub dry_run: bool,

    /// Apply the planned changes.
    #[arg(long)]
    pub no_dry_run: bool,

    /// Comma-separated users never unfollowed.
    #[arg(long)]
    pub allowlist: Option<String>,

    /// Comma-separated users never followed.
    #[arg(long)]
    pub blocklist: Option<String>,

    /// Write the JSON report to this file.
    #[arg(long)]
    pub report_out: Option<PathBuf>,
}

impl SocialSyncArgs {
    pub fn dry_run_override(&self) -> Option<bool> {
        flag_pair(self.dry_run, self.no_dry_run)
    }
}

fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Cli {
    /// Flag values that take part in settings resolution.
    pub fn overrides(&self) -> FlagOverrides {
        let social = match &self.command {
            Commands::SocialSync(args) => Some(args),
            _ => None,
        };
        FlagOverrides {
            token: self.global.token.clone(),
            api_url: self.global.api_url.clone(),
            config: self.global.config.clone(),
            log_level: self.global.log_level.clone(),
            log_json: flag_pair(self.global.log_json, self.global.no_log_json),
            page_size: self.global.page_size,
            dry_run: social.and_then(SocialSyncArgs::dry_run_override),
            allowlist: social.and_then(|s| s.allowlist.clone()),
            blocklist: social.and_then(|s| s.blocklist.clone()),
        }
    }
}
