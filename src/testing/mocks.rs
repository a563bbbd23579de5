//! Mock record sources.
//!
//! These mocks stand in for the persistence layer, enabling deterministic
//! tests of code that fetches through a [`RecordSource`].

use crate::record::{RawRecord, RecordQuery, RecordSource};
use anyhow::{bail, Result};
use std::sync::atomic::{AtomicU32, Ordering};

/// In-memory record source.
///
/// # Example
///
/// ```
/// use widget_stats::record::{RecordQuery, RecordSource};
/// use widget_stats::testing::{at, run, MockRecordSource};
///
/// let source = MockRecordSource::new()
///     .with_record(run("1", "Smoke", at(2024, 1, 1)))
///     .with_record(run("2", "Nightly", at(2024, 1, 2)));
///
/// let batch = source.fetch(&RecordQuery::new().with_name("Smoke")).unwrap();
/// assert_eq!(batch.len(), 1);
/// assert_eq!(source.fetch_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockRecordSource {
    records: Vec<RawRecord>,
    error: Option<String>,
    fetches: AtomicU32,
}

impl MockRecordSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record.
    #[must_use]
    pub fn with_record(mut self, record: RawRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Add many records.
    #[must_use]
    pub fn with_records(mut self, records: Vec<RawRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Make every fetch fail with `error`.
    #[must_use]
    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Number of fetches made so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl RecordSource for MockRecordSource {
    fn fetch(&self, query: &RecordQuery) -> Result<Vec<RawRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.error {
            bail!("{}", error);
        }
        Ok(query.apply(self.records.clone()))
    }
}
