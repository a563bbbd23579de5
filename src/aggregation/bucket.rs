//! Time bucketing with gap-filling.
//!
//! Records are placed into buckets keyed by their start date (or name).
//! For temporal periods the key sequence is contiguous from the earliest to
//! the latest record: a day without runs still gets a zero bucket.

use super::period::GroupingPeriod;
use crate::content::ChartObject;
use crate::record::{CounterSet, RawRecord};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// A folded bucket of counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Date label or name.
    pub key: String,
    /// Summed counters, keyed by internal field name.
    pub totals: BTreeMap<String, i64>,
    /// Number of records folded into this bucket.
    pub records: usize,
}

impl Bucket {
    fn placeholder(key: String, fields: &[String]) -> Self {
        Self {
            key,
            totals: fields.iter().map(|f| (f.clone(), 0)).collect(),
            records: 0,
        }
    }

    /// Whether no record landed in this bucket.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.records == 0
    }

    /// Convert the totals into a chart object.
    #[must_use]
    pub fn to_chart_object(&self) -> ChartObject {
        ChartObject {
            values: self
                .totals
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
            ..ChartObject::default()
        }
    }
}

impl CounterSet for Bucket {
    fn count(&self, field: &str) -> i64 {
        self.totals.count(field)
    }
}

/// Bucket key of one record.
#[must_use]
pub fn key_of(record: &RawRecord, period: GroupingPeriod) -> String {
    period
        .date_key(record.start_time.date_naive())
        .unwrap_or_else(|| record.name.clone())
}

/// Ordered bucket keys covering the batch.
///
/// Temporal periods yield a contiguous range from the earliest to the latest
/// record; `ByName` yields names in first-appearance order.
#[must_use]
pub fn range_keys(records: &[RawRecord], period: GroupingPeriod) -> Vec<String> {
    if !period.is_temporal() {
        let mut seen = BTreeSet::new();
        return records
            .iter()
            .filter(|r| seen.insert(r.name.as_str()))
            .map(|r| r.name.clone())
            .collect();
    }

    let dates = records.iter().map(|r| r.start_time.date_naive());
    let (Some(min), Some(max)) = (dates.clone().min(), dates.max()) else {
        return Vec::new();
    };

    let mut keys = Vec::new();
    let mut cursor = period.range_start(min);
    while cursor <= max {
        if let Some(key) = period.date_key(cursor) {
            keys.push(key);
        }
        match period.advance(cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    keys
}

/// Counter fields present anywhere in the batch.
#[must_use]
pub fn fields_in(records: &[RawRecord]) -> Vec<String> {
    let fields: BTreeSet<&String> = records.iter().flat_map(|r| r.counters.keys()).collect();
    fields.into_iter().cloned().collect()
}

/// Bucket records by period and sum the given counter fields.
///
/// When `fields` is empty every counter seen in the batch is folded.
/// Empty input yields no buckets.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use widget_stats::aggregation::{bucket, GroupingPeriod};
/// use widget_stats::record::{RawRecord, EXECUTIONS_TOTAL};
///
/// let records = vec![
///     RawRecord::new("1", "Smoke", Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
///         .with_counter(EXECUTIONS_TOTAL, 5),
///     RawRecord::new("2", "Smoke", Utc.with_ymd_and_hms(2024, 1, 4, 8, 0, 0).unwrap())
///         .with_counter(EXECUTIONS_TOTAL, 3),
/// ];
///
/// let buckets = bucket(&records, GroupingPeriod::Day, &[]);
/// let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
/// assert_eq!(keys, vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"]);
/// assert!(buckets[1].is_placeholder());
/// ```
#[must_use]
pub fn bucket(records: &[RawRecord], period: GroupingPeriod, fields: &[String]) -> Vec<Bucket> {
    let fields = if fields.is_empty() {
        fields_in(records)
    } else {
        fields.to_vec()
    };

    let mut buckets: Vec<Bucket> = range_keys(records, period)
        .into_iter()
        .map(|key| Bucket::placeholder(key, &fields))
        .collect();
    let index: HashMap<String, usize> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| (b.key.clone(), i))
        .collect();

    for record in records {
        let Some(&slot) = index.get(&key_of(record, period)) else {
            continue;
        };
        let target = &mut buckets[slot];
        for field in &fields {
            *target.totals.entry(field.clone()).or_insert(0) += record.count(field);
        }
        target.records += 1;
    }

    debug!(
        "Bucketed {} records into {} {} buckets",
        records.len(),
        buckets.len(),
        period
    );
    buckets
}

/// For each bucket key, the record with the largest value of `field`.
///
/// Keys span the same range as [`bucket`]. Keys with no record map to `None`.
/// Ties go to the later record.
#[must_use]
pub fn max_by_date<'a>(
    records: &'a [RawRecord],
    period: GroupingPeriod,
    field: &str,
) -> Vec<(String, Option<&'a RawRecord>)> {
    let mut chronological: Vec<&RawRecord> = records.iter().collect();
    chronological.sort_by_key(|r| r.start_time);

    let mut best: HashMap<String, &RawRecord> = HashMap::new();
    for record in chronological {
        let key = key_of(record, period);
        let replace = best
            .get(&key)
            .is_none_or(|current| record.count(field) >= current.count(field));
        if replace {
            best.insert(key, record);
        }
    }

    range_keys(records, period)
        .into_iter()
        .map(|key| {
            let record = best.get(&key).copied();
            (key, record)
        })
        .collect()
}
