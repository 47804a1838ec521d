//! # ForgeOps Core
//!
//! Maintenance operations for GitHub repositories, packages and accounts,
//! built on the request executor and paginator from `github_client`.
//!
//! ## Overview
//!
//! - Bulk cleanups ([`cleanup`], [`packages`]) list records and delete them
//!   one by one, aborting on the first failed delete.
//! - Code Scanning ([`code_scanning`], [`vulns`]) deletes analyses through
//!   GitHub's confirmation chain or dismisses alerts best-effort.
//! - Social sync ([`social`]) follows back followers and unfollows accounts
//!   that do not follow back, subject to allow and block lists.
//!
//! Every operation runs sequentially against a single target.
//!
//! ## Examples
//!
//! ```no_run
//! use forgeops_core::{delete_all_caches, RepoTarget};
//! use github_client::{create_token_executor, DEFAULT_API_URL, DEFAULT_PAGE_SIZE};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = create_token_executor("ghp_example".to_string().into(), DEFAULT_API_URL, None)?;
//! let target = RepoTarget::parse("octo/widgets")?;
//! let summary = delete_all_caches(&executor, &target, DEFAULT_PAGE_SIZE).await?;
//! println!("deleted {} caches", summary.deleted);
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod cleanup;
pub mod code_scanning;
pub mod errors;
pub mod operation;
pub mod packages;
pub mod social;
pub mod target;
pub mod vulns;

pub use bulk::{BulkDelete, DeleteSummary, RecordOutcome};
pub use cleanup::{delete_all_caches, delete_all_releases, delete_completed_workflow_runs};
pub use code_scanning::{
    AlertState, AnalysisDeletion, AnalysisSweep, CodeScanningClient, DismissReason,
    DismissSummary, ToolFilter,
};
pub use errors::Error;
pub use operation::{check_token, Operation};
pub use packages::{
    delete_all_package_versions, delete_package, delete_package_versions, list_package_versions,
    list_packages, PackageType,
};
pub use social::{plan_sync, SocialClient, SyncOptions, SyncPlan, SyncReport};
pub use target::{
    resolve_package_scope, resolve_repo_target, EnvLookup, PackageScope, Prompter, RepoTarget,
};
pub use vulns::{clear_vulns, ClearMode, ClearOptions, ClearOutcome, ClearRequest};
