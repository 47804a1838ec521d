//! GitHub Packages: listing packages, and deleting packages or package versions.

use std::fmt;

use github_client::{Paginator, Record, RequestExecutor};
use tracing::{error, info, instrument, warn};
use url::form_urlencoded;

use crate::bulk::{BulkDelete, DeleteSummary};
use crate::errors::Error;
use crate::target::PackageScope;

#[cfg(test)]
#[path = "packages_tests.rs"]
mod tests;

const DELETE_OK: &[u16] = &[200, 202, 204];

/// Package ecosystems that support deletion through the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackageType {
    #[default]
    Container,
    Npm,
    Maven,
    Rubygems,
    Nuget,
}

impl PackageType {
    pub const ALL: [PackageType; 5] = [
        PackageType::Container,
        PackageType::Npm,
        PackageType::Maven,
        PackageType::Rubygems,
        PackageType::Nuget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackageType::Container => "container",
            PackageType::Npm => "npm",
            PackageType::Maven => "maven",
            PackageType::Rubygems => "rubygems",
            PackageType::Nuget => "nuget",
        }
    }

    /// Parses a package type, falling back to `container` with a warning for
    /// anything unrecognised.
    pub fn parse_lenient(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match Self::ALL.iter().find(|t| t.as_str() == normalized) {
            Some(found) => *found,
            None => {
                warn!(
                    requested = value,
                    "Unsupported package type, using container"
                );
                PackageType::Container
            }
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-encodes one URL path segment.
pub(crate) fn encode_segment(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// `{users|orgs}/{name}/packages/{type}/{package}`.
pub fn package_path(scope: &PackageScope, package_type: PackageType, package: &str) -> String {
    format!(
        "{}/packages/{}/{}",
        scope.api_prefix(),
        package_type,
        encode_segment(package)
    )
}

/// Lists the packages of `package_type` owned by `scope`.
#[instrument(skip(executor))]
pub async fn list_packages(
    executor: &RequestExecutor,
    scope: &PackageScope,
    package_type: PackageType,
    page_size: u32,
) -> Result<Vec<Record>, Error> {
    let packages = Paginator::new(executor, format!("{}/packages", scope.api_prefix()))
        .with_param("package_type", package_type.as_str())
        .with_page_size(page_size)
        .collect_all()
        .await?;
    info!(count = packages.len(), "Listed packages");
    Ok(packages)
}

/// Deletes an entire package with all of its versions.
#[instrument(skip(executor))]
pub async fn delete_package(
    executor: &RequestExecutor,
    scope: &PackageScope,
    package_type: PackageType,
    package: &str,
) -> Result<(), Error> {
    executor
        .delete(&package_path(scope, package_type, package), DELETE_OK)
        .await?;
    info!(event = "package_deleted", "Deleted package");
    Ok(())
}

/// Lists the versions of one package.
#[instrument(skip(executor))]
pub async fn list_package_versions(
    executor: &RequestExecutor,
    scope: &PackageScope,
    package_type: PackageType,
    package: &str,
    page_size: u32,
) -> Result<Vec<Record>, Error> {
    let versions = Paginator::new(
        executor,
        format!("{}/versions", package_path(scope, package_type, package)),
    )
    .with_page_size(page_size)
    .collect_all()
    .await?;
    info!(count = versions.len(), "Listed package versions");
    Ok(versions)
}

/// Deletes the given version ids of one package.
///
/// Ids that are not integers are skipped with a warning. The first failed
/// delete aborts the remaining ids.
#[instrument(skip(executor, version_ids))]
pub async fn delete_package_versions(
    executor: &RequestExecutor,
    scope: &PackageScope,
    package_type: PackageType,
    package: &str,
    version_ids: &[String],
) -> Result<DeleteSummary, Error> {
    let mut summary = DeleteSummary::default();
    if version_ids.is_empty() {
        warn!("No version ids given, nothing to delete");
        return Ok(summary);
    }

    let base = package_path(scope, package_type, package);
    for raw in version_ids {
        summary.scanned += 1;
        let Ok(id) = raw.trim().parse::<u64>() else {
            warn!(
                event = "record_skipped",
                version = %raw,
                "Skipping invalid version id"
            );
            summary.skipped += 1;
            continue;
        };

        if let Err(err) = executor
            .delete(&format!("{base}/versions/{id}"), DELETE_OK)
            .await
        {
            error!(
                event = "delete_failed",
                version_id = id,
                deleted_so_far = summary.deleted,
                error_message = %err,
                "Version delete failed, aborting"
            );
            return Err(err.into());
        }
        info!(event = "record_deleted", version_id = id, "Deleted package version");
        summary.deleted += 1;
    }
    Ok(summary)
}

/// Deletes every listed version of one package.
pub async fn delete_all_package_versions(
    executor: &RequestExecutor,
    scope: &PackageScope,
    package_type: PackageType,
    package: &str,
    page_size: u32,
) -> Result<DeleteSummary, Error> {
    let base = package_path(scope, package_type, package);
    BulkDelete::new("package_version", format!("{base}/versions"), |id| {
        format!("{base}/versions/{id}")
    })
    .label_fields(&["name"])
    .page_size(page_size)
    .run(executor)
    .await
}
