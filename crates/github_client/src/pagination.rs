//! Page-number pagination over GitHub list endpoints.
//!
//! GitHub list endpoints either return a bare JSON array or an object that
//! wraps the array under a resource-specific key (`workflow_runs`,
//! `actions_caches`, ...). [`PageShape`] resolves that once per page and
//! [`Paginator`] turns the pages into a lazy, forward-only stream of [`Record`]s.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::Error;
use crate::executor::RequestExecutor;
use crate::record::Record;

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;

/// Largest page GitHub serves.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Wrapper keys tried, in order, when the caller names none.
pub const WELL_KNOWN_ARRAY_KEYS: &[&str] = &["workflow_runs", "actions_caches", "caches"];

/// Clamps a requested page size into `1..=100`.
pub fn clamp_page_size(requested: i64) -> u32 {
    requested.clamp(1, MAX_PAGE_SIZE as i64) as u32
}

/// The two response shapes a list endpoint can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum PageShape {
    /// A top-level array.
    Array(Vec<Record>),
    /// An object with the records under `key`.
    Wrapped { key: String, records: Vec<Record> },
}

impl PageShape {
    /// Decodes one page body.
    ///
    /// For objects the array is found under `array_key`, then under one of
    /// [`WELL_KNOWN_ARRAY_KEYS`], then under the first key holding an array.
    /// Non-object elements are dropped with a warning.
    ///
    /// # Errors
    ///
    /// `Error::UnrecognizedShape` when an object holds no array, naming the
    /// keys it does hold. `Error::UnexpectedJsonType` for scalars and null.
    pub fn decode(body: Value, array_key: Option<&str>) -> Result<Self, Error> {
        match body {
            Value::Array(items) => Ok(PageShape::Array(into_records(items))),
            Value::Object(mut map) => {
                let key = array_key
                    .filter(|k| map.get(*k).is_some_and(Value::is_array))
                    .map(str::to_string)
                    .or_else(|| {
                        WELL_KNOWN_ARRAY_KEYS
                            .iter()
                            .find(|k| map.get(**k).is_some_and(Value::is_array))
                            .map(|k| k.to_string())
                    })
                    .or_else(|| {
                        map.iter()
                            .find(|(_, v)| v.is_array())
                            .map(|(k, _)| k.clone())
                    });

                match key.and_then(|k| map.remove(&k).map(|v| (k, v))) {
                    Some((key, Value::Array(items))) => Ok(PageShape::Wrapped {
                        key,
                        records: into_records(items),
                    }),
                    _ => Err(Error::UnrecognizedShape {
                        keys: map.keys().cloned().collect(),
                    }),
                }
            }
            other => Err(Error::UnexpectedJsonType(json_type_name(&other).to_string())),
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        match self {
            PageShape::Array(records) => records,
            PageShape::Wrapped { records, .. } => records,
        }
    }
}

fn into_records(items: Vec<Value>) -> Vec<Record> {
    let total = items.len();
    let records: Vec<Record> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(Record::new(map)),
            _ => None,
        })
        .collect();

    if records.len() < total {
        warn!(
            event = "paginate_non_object_items",
            dropped = total - records.len(),
            "Dropping list elements that are not objects"
        );
    }
    records
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns `true` when a `Link` header advertises a `rel="next"` page.
pub fn has_next_link(link: Option<&str>) -> bool {
    link.is_some_and(|value| {
        value.split(',').any(|part| {
            part.split(';')
                .skip(1)
                .any(|param| param.trim().replace(' ', "") == "rel=\"next\"")
        })
    })
}

/// Lazy, forward-only sequence of records from a paginated endpoint.
///
/// Pages are fetched on demand starting at page 1. Iteration ends after an
/// empty page, or after a page shorter than the page size that carries no
/// `Link: rel="next"`. A new paginator always starts again from page 1.
///
/// # Example
///
/// ```rust,ignore
/// let mut runs = Paginator::new(&executor, "repos/o/r/actions/runs")
///     .with_param("status", "completed")
///     .with_array_key("workflow_runs");
/// while let Some(run) = runs.next_record().await? {
///     println!("{:?}", run.id());
/// }
/// ```
pub struct Paginator<'a> {
    executor: &'a RequestExecutor,
    url: String,
    params: Vec<(String, String)>,
    array_key: Option<String>,
    page_size: u32,
    page: u32,
    pages_fetched: u32,
    buffer: VecDeque<Record>,
    finished: bool,
}

impl<'a> Paginator<'a> {
    pub fn new(executor: &'a RequestExecutor, url: impl Into<String>) -> Self {
        Self {
            executor,
            url: url.into(),
            params: Vec::new(),
            array_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
            pages_fetched: 0,
            buffer: VecDeque::new(),
            finished: false,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_params(mut self, params: &[(String, String)]) -> Self {
        self.params.extend_from_slice(params);
        self
    }

    pub fn with_array_key(mut self, key: impl Into<String>) -> Self {
        self.array_key = Some(key.into());
        self
    }

    /// Sets `per_page`, clamped into `1..=100`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = clamp_page_size(i64::from(page_size));
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Next record, fetching the next page when the current one is used up.
    ///
    /// # Errors
    ///
    /// Propagates request failures and shape errors. The paginator is
    /// finished after an error.
    pub async fn next_record(&mut self) -> Result<Option<Record>, Error> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Ok(Some(record));
            }
            if self.finished {
                return Ok(None);
            }
            if let Err(err) = self.fetch_page().await {
                self.finished = true;
                return Err(err);
            }
        }
    }

    /// Drains the remaining records.
    pub async fn collect_all(mut self) -> Result<Vec<Record>, Error> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        Ok(records)
    }

    async fn fetch_page(&mut self) -> Result<(), Error> {
        let mut query: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(k, _)| k != "page" && k != "per_page")
            .cloned()
            .collect();
        query.push(("per_page".to_string(), self.page_size.to_string()));
        query.push(("page".to_string(), self.page.to_string()));

        debug!(
            event = "paginate_request",
            url = %self.url,
            page = self.page,
            per_page = self.page_size,
            "Fetching page"
        );

        let response = self.executor.get(&self.url, &query).await?;
        self.pages_fetched += 1;
        let next_advertised = has_next_link(response.header("link"));
        let shape = PageShape::decode(response.json()?, self.array_key.as_deref())?;
        let records = shape.into_records();
        let count = records.len();

        if count == 0 {
            info!(
                event = "paginate_empty_page",
                url = %self.url,
                page = self.page,
                "Empty page, pagination finished"
            );
            self.finished = true;
            return Ok(());
        }

        debug!(
            event = "paginate_page_ok",
            url = %self.url,
            page = self.page,
            count,
            "Page fetched"
        );

        if count < self.page_size as usize && !next_advertised {
            info!(
                event = "paginate_last_page",
                url = %self.url,
                page = self.page,
                count,
                "Short page, pagination finished"
            );
            self.finished = true;
        } else {
            self.page += 1;
        }

        self.buffer.extend(records);
        Ok(())
    }
}
