//! Record fetch boundary.
//!
//! The engine never queries storage itself. A [`RecordSource`] hands it an
//! already-materialized batch; [`JsonFileSource`] is the file-backed
//! implementation used by the command line.

use super::RawRecord;
use crate::request::{AggregationRequest, SortOrder, START_TIME_FIELD};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filter, sort and limit applied when fetching records.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Keep only records with this display name.
    pub name: Option<String>,
    /// Order of the returned batch.
    pub sort: SortOrder,
    /// Maximum number of records to return.
    pub limit: Option<usize>,
}

impl RecordQuery {
    /// Query returning every record, newest first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Limit the batch size.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply this query to an in-memory batch.
    ///
    /// Records are ordered by start time in the query's direction; other sort
    /// fields keep the stored order.
    #[must_use]
    pub fn apply(&self, records: Vec<RawRecord>) -> Vec<RawRecord> {
        let mut batch: Vec<RawRecord> = records
            .into_iter()
            .filter(|r| self.name.as_deref().is_none_or(|name| r.name == name))
            .collect();

        if self.sort.is_by(START_TIME_FIELD) {
            if self.sort.direction.is_ascending() {
                batch.sort_by_key(|r| r.start_time);
            } else {
                batch.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            }
        }

        if let Some(limit) = self.limit {
            batch.truncate(limit);
        }
        batch
    }
}

/// Supplier of record batches.
pub trait RecordSource {
    /// Fetch the records matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn fetch(&self, query: &RecordQuery) -> Result<Vec<RawRecord>>;
}

/// Accepted file layouts: a bare record array or a full request.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Records(Vec<RawRecord>),
    Request(Box<AggregationRequest>),
}

/// Reads records from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Source backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RecordFile> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&self, query: &RecordQuery) -> Result<Vec<RawRecord>> {
        let records = match self.read()? {
            RecordFile::Records(records) => records,
            RecordFile::Request(request) => request.records,
        };
        let batch = query.apply(records);
        debug!(
            "Fetched {} records from {}",
            batch.len(),
            self.path.display()
        );
        Ok(batch)
    }
}

/// Load an [`AggregationRequest`] from a JSON file.
///
/// The file may hold a full request or a bare record array; a bare array
/// becomes a request for `default_widget`. Records are fetched through
/// [`JsonFileSource`] with the request's sort order and quantity.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if it is a bare
/// record array and no widget type was given.
pub fn load_request(path: &Path, default_widget: Option<&str>) -> Result<AggregationRequest> {
    let source = JsonFileSource::new(path);
    let mut request = match source.read()? {
        RecordFile::Request(request) => *request,
        RecordFile::Records(_) => {
            let widget = default_widget.with_context(|| {
                format!(
                    "{} holds only records; pass --widget to choose a widget type",
                    path.display()
                )
            })?;
            AggregationRequest::new(widget)
        }
    };

    let mut query = RecordQuery::new().with_sort(request.sort.clone());
    if let Some(limit) = request.quantity {
        query = query.with_limit(limit);
    }
    request.records = source.fetch(&query)?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn run(id: &str, name: &str, day: u32) -> RawRecord {
        RawRecord::new(id, name, Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_query_filters_sorts_and_limits() {
        let records = vec![run("1", "a", 1), run("2", "b", 2), run("3", "a", 3), run("4", "a", 4)];
        let batch = RecordQuery::new()
            .with_name("a")
            .with_limit(2)
            .apply(records);
        let ids: Vec<&str> = batch.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "3"]);
    }

    #[test]
    fn test_query_ascending() {
        let records = vec![run("2", "a", 2), run("1", "a", 1)];
        let batch = RecordQuery::new()
            .with_sort(SortOrder::ascending("startTime"))
            .apply(records);
        assert_eq!(batch[0].id, "1");
    }

    #[test]
    fn test_json_file_source_reads_record_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let records = vec![run("1", "a", 1), run("2", "a", 2)];
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let fetched = JsonFileSource::new(&path).fetch(&RecordQuery::new()).unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].id, "2");
    }

    #[test]
    fn test_load_request_from_bare_records_needs_widget() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(load_request(&path, None).is_err());
        let request = load_request(&path, Some("not_passed")).unwrap();
        assert_eq!(request.widget_type, "not_passed");
    }

    #[test]
    fn test_load_request_applies_quantity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("request.json");
        let request = AggregationRequest::new("not_passed")
            .with_records(vec![run("1", "a", 1), run("2", "a", 2), run("3", "a", 3)])
            .with_quantity(2);
        std::fs::write(&path, serde_json::to_string(&request).unwrap()).unwrap();

        let loaded = load_request(&path, None).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].id, "3");
    }

    #[test]
    fn test_missing_file_is_error() {
        let source = JsonFileSource::new("/nonexistent/records.json");
        assert!(source.fetch(&RecordQuery::new()).is_err());
    }
}
