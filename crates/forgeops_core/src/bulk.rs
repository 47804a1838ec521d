//! The list-then-delete loop shared by every bulk cleanup.
//!
//! A listing record without an identifier is skipped with a warning. The
//! first delete that fails stops the run and the error is returned, so no
//! further destructive calls are made after a real API failure.

use github_client::{Paginator, Record, RequestExecutor, DEFAULT_PAGE_SIZE};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::errors::Error;

#[cfg(test)]
#[path = "bulk_tests.rs"]
mod tests;

/// What happened to a single listed record.
#[derive(Debug)]
pub enum RecordOutcome {
    Deleted,
    Skipped(String),
    Failed(github_client::Error),
}

/// Counters reported at the end of a bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    /// Records observed in the listing.
    pub scanned: u64,
    pub deleted: u64,
    pub skipped: u64,
}

/// Describes one bulk deletion: where to list, and how to delete each record.
pub struct BulkDelete<F>
where
    F: Fn(u64) -> String,
{
    resource: &'static str,
    list_path: String,
    params: Vec<(String, String)>,
    array_key: Option<&'static str>,
    id_field: &'static str,
    label_fields: &'static [&'static str],
    delete_path: F,
    expected: &'static [u16],
    page_size: u32,
}

impl<F> BulkDelete<F>
where
    F: Fn(u64) -> String,
{
    /// `resource` names the records in log events; `delete_path` builds the
    /// DELETE path for an identifier.
    pub fn new(resource: &'static str, list_path: impl Into<String>, delete_path: F) -> Self {
        Self {
            resource,
            list_path: list_path.into(),
            params: Vec::new(),
            array_key: None,
            id_field: "id",
            label_fields: &[],
            delete_path,
            expected: &[200, 202, 204],
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn array_key(mut self, key: &'static str) -> Self {
        self.array_key = Some(key);
        self
    }

    /// Fields tried, in order, for a human-readable label in logs.
    pub fn label_fields(mut self, fields: &'static [&'static str]) -> Self {
        self.label_fields = fields;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Deletes a single record, without deciding what the outcome means for the run.
    pub async fn process(&self, executor: &RequestExecutor, record: &Record) -> RecordOutcome {
        let Some(id) = record.identifier(self.id_field) else {
            return RecordOutcome::Skipped(format!("missing {}", self.id_field));
        };

        match executor
            .delete(&(self.delete_path)(id), self.expected)
            .await
        {
            Ok(_) => {
                info!(
                    event = "record_deleted",
                    resource = self.resource,
                    id,
                    label = record.label(self.label_fields).unwrap_or_default(),
                    "Deleted"
                );
                RecordOutcome::Deleted
            }
            Err(err) => RecordOutcome::Failed(err),
        }
    }

    /// Lists every record and deletes each one in turn.
    ///
    /// # Errors
    ///
    /// Listing failures, and the first failed delete, abort the run.
    #[instrument(skip_all, fields(resource = self.resource, path = %self.list_path))]
    pub async fn run(&self, executor: &RequestExecutor) -> Result<DeleteSummary, Error> {
        let mut paginator = Paginator::new(executor, self.list_path.as_str())
            .with_params(&self.params)
            .with_page_size(self.page_size);
        if let Some(key) = self.array_key {
            paginator = paginator.with_array_key(key);
        }

        let mut summary = DeleteSummary::default();
        while let Some(record) = paginator.next_record().await? {
            summary.scanned += 1;
            match self.process(executor, &record).await {
                RecordOutcome::Deleted => summary.deleted += 1,
                RecordOutcome::Skipped(reason) => {
                    warn!(
                        event = "record_skipped",
                        resource = self.resource,
                        reason = %reason,
                        keys = ?record.keys(),
                        "Skipping record"
                    );
                    summary.skipped += 1;
                }
                RecordOutcome::Failed(err) => {
                    error!(
                        event = "delete_failed",
                        resource = self.resource,
                        deleted_so_far = summary.deleted,
                        error_type = err.kind(),
                        error_message = %err,
                        "Delete failed, aborting run"
                    );
                    return Err(err.into());
                }
            }
        }

        info!(
            event = "bulk_delete_done",
            resource = self.resource,
            scanned = summary.scanned,
            deleted_total = summary.deleted,
            skipped = summary.skipped,
            "Bulk delete finished"
        );
        Ok(summary)
    }
}
