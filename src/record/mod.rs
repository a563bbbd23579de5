//! Raw test-run records consumed by the aggregation engine.
//!
//! A [`RawRecord`] is one launch or test-item snapshot as delivered by the
//! persistence layer. Records are immutable once fetched; every strategy
//! only borrows them.

pub mod counters;
pub mod source;

pub use counters::{
    extract, internal_field, is_valid_field, ui_field, CounterSet, DEFECT_FIELDS, EXECUTIONS_FAILED,
    EXECUTIONS_PASSED, EXECUTIONS_SKIPPED, EXECUTIONS_TOTAL, EXECUTION_FIELDS,
    ISSUE_AUTOMATION_BUG, ISSUE_NO_DEFECT, ISSUE_PRODUCT_BUG, ISSUE_SYSTEM_ISSUE,
    ISSUE_TO_INVESTIGATE,
};
pub use source::{JsonFileSource, RecordQuery, RecordSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status literal reported for a failed run or item.
pub const STATUS_FAILED: &str = "FAILED";

/// Item type of a test step.
pub const ITEM_TYPE_STEP: &str = "STEP";
/// Item types of set-up and tear-down methods around a step.
pub const METHOD_ITEM_TYPES: [&str; 2] = ["BEFORE_METHOD", "AFTER_METHOD"];

/// A single transition in an item's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Status reported by the run (e.g. `PASSED`, `FAILED`, `SKIPPED`).
    pub status: String,
    /// Start time of the run that produced this status.
    pub time: DateTime<Utc>,
}

impl StatusEntry {
    /// Create a new status entry.
    #[must_use]
    pub fn new(status: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            status: status.into(),
            time,
        }
    }

    /// Whether this entry records a failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_FAILED)
    }
}

/// A key/value attribute (tag) attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute key. Plain tags carry no key.
    #[serde(default)]
    pub key: Option<String>,
    /// Attribute value.
    pub value: String,
}

/// One test-run or test-item snapshot.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use widget_stats::record::{RawRecord, EXECUTIONS_FAILED, EXECUTIONS_TOTAL};
///
/// let record = RawRecord::new("launch-1", "Regression", Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
///     .with_counter(EXECUTIONS_TOTAL, 10)
///     .with_counter(EXECUTIONS_FAILED, 2);
///
/// assert_eq!(record.counter(EXECUTIONS_FAILED), 2);
/// assert_eq!(record.counter("executions.skipped"), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Record identifier.
    pub id: String,
    /// Display name (launch name or test-item name).
    pub name: String,
    /// Run number, for launches.
    #[serde(default)]
    pub number: Option<u64>,
    /// Start timestamp.
    pub start_time: DateTime<Utc>,
    /// End timestamp, absent while the run is in progress.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Counter set keyed by internal field name.
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
    /// Final status of the run.
    #[serde(default)]
    pub status: Option<String>,
    /// Ordered status history (oldest first).
    #[serde(default)]
    pub status_history: Vec<StatusEntry>,
    /// Attributes (tags).
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Test-item type such as `STEP`; absent for launches.
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
}

impl RawRecord {
    /// Create a record with no counters.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            number: None,
            start_time,
            end_time: None,
            counters: BTreeMap::new(),
            status: None,
            status_history: Vec::new(),
            attributes: Vec::new(),
            item_type: None,
        }
    }

    /// Set the run number.
    #[must_use]
    pub fn with_number(mut self, number: u64) -> Self {
        self.number = Some(number);
        self
    }

    /// Set a counter value. Field names in `$` style are normalized.
    #[must_use]
    pub fn with_counter(mut self, field: &str, value: i64) -> Self {
        self.counters.insert(internal_field(field), value);
        self
    }

    /// Set the end timestamp.
    #[must_use]
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Set the final status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Append an entry to the status history.
    #[must_use]
    pub fn with_history_entry(mut self, status: impl Into<String>, time: DateTime<Utc>) -> Self {
        self.status_history.push(StatusEntry::new(status, time));
        self
    }

    /// Attach a key/value attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            key: Some(key.into()),
            value: value.into(),
        });
        self
    }

    /// Set the test-item type.
    #[must_use]
    pub fn with_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    /// Whether the item is a step, or a before/after method when
    /// `include_methods` is set. Untyped records count as steps.
    #[must_use]
    pub fn is_step(&self, include_methods: bool) -> bool {
        match self.item_type.as_deref() {
            None => true,
            Some(t) if t.eq_ignore_ascii_case(ITEM_TYPE_STEP) => true,
            Some(t) => include_methods && METHOD_ITEM_TYPES.iter().any(|m| t.eq_ignore_ascii_case(m)),
        }
    }

    /// Read a counter, 0 when absent.
    #[must_use]
    pub fn counter(&self, field: &str) -> i64 {
        extract(self, field)
    }

    /// Start time as epoch milliseconds.
    #[must_use]
    pub fn start_millis(&self) -> i64 {
        self.start_time.timestamp_millis()
    }

    /// Run duration in milliseconds, if the run has finished.
    #[must_use]
    pub fn duration_millis(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds().max(0))
    }

    /// First value of the attribute with the given key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key.as_deref() == Some(key))
            .map(|a| a.value.as_str())
    }
}

/// Identity of the run a history ranking was computed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRef {
    /// Launch name.
    pub name: String,
    /// Launch number.
    #[serde(default)]
    pub number: Option<u64>,
    /// Launch identifier.
    #[serde(default)]
    pub id: Option<String>,
}

impl LaunchRef {
    /// Create a reference carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: None,
            id: None,
        }
    }
}

impl From<&RawRecord> for LaunchRef {
    fn from(record: &RawRecord) -> Self {
        Self {
            name: record.name.clone(),
            number: record.number,
            id: Some(record.id.clone()),
        }
    }
}
