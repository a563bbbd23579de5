//! Status-history analysis: flakiness and most-failed rankings.
//!
//! Each record with a status history is one test item. Histories are
//! ordered oldest first.

use crate::aggregation::ratio::format_two;
use crate::content::ChartObject;
use crate::record::{LaunchRef, RawRecord, StatusEntry, STATUS_FAILED};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

pub const TOTAL: &str = "total";
pub const SWITCHED: &str = "switched";
pub const PERCENTAGE: &str = "percentage";
pub const LAST_SWITCH: &str = "lastSwitch";
pub const STATUSES: &str = "statuses";
pub const FAILED_COUNT: &str = "failedCount";
pub const LAST_TIME: &str = "lastTime";
pub const IS_FAILED: &str = "isFailed";
pub const DURATION: &str = "duration";
pub const STATUS: &str = "status";

/// Statuses a content field may name as a ranking criteria.
pub const KNOWN_STATUSES: [&str; 9] = [
    "PASSED",
    "FAILED",
    "SKIPPED",
    "INTERRUPTED",
    "STOPPED",
    "CANCELLED",
    "IN_PROGRESS",
    "INFO",
    "WARN",
];

/// Reserved group key labelling a ranking with its reference run.
pub const LAST_LAUNCH: &str = "lastLaunch";
/// Group key of the most-failed ranking.
pub const MOST_FAILED: &str = "most_failed";

// ============================================================================
// Flakiness
// ============================================================================

/// Flakiness summary of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlakyItem {
    pub unique_id: String,
    pub name: String,
    /// Number of history entries.
    pub total: usize,
    /// Number of status changes between consecutive entries.
    pub switch_count: usize,
    /// `switch_count / total * 100`, two decimals.
    pub switch_percent: String,
    /// Time of the last status change, or of the first entry if none.
    pub last_switch: DateTime<Utc>,
    /// Statuses in history order.
    pub statuses: Vec<String>,
}

impl FlakyItem {
    /// Chart object carrying this item's values.
    #[must_use]
    pub fn to_chart_object(&self) -> ChartObject {
        let mut object = ChartObject::new()
            .with_name(self.name.clone())
            .with_value(TOTAL, self.total.to_string())
            .with_value(SWITCHED, self.switch_count.to_string())
            .with_value(PERCENTAGE, self.switch_percent.clone())
            .with_value(LAST_SWITCH, self.last_switch.timestamp_millis().to_string())
            .with_value(STATUSES, self.statuses.join(", "));
        object.id = Some(self.unique_id.clone());
        object
    }
}

/// Walk one history and count status switches.
///
/// Returns `None` for an empty history. The item id defaults to its name.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use widget_stats::aggregation::history::analyze_flakiness;
/// use widget_stats::record::StatusEntry;
///
/// let at = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
/// let history: Vec<StatusEntry> = ["PASSED", "PASSED", "FAILED", "FAILED", "PASSED"]
///     .iter()
///     .zip(1..)
///     .map(|(s, d)| StatusEntry::new(*s, at(d)))
///     .collect();
///
/// let item = analyze_flakiness("login", &history).unwrap();
/// assert_eq!(item.switch_count, 2);
/// assert_eq!(item.total, 5);
/// assert_eq!(item.switch_percent, "40.00");
/// assert_eq!(item.last_switch, at(5));
/// ```
#[must_use]
pub fn analyze_flakiness(name: &str, history: &[StatusEntry]) -> Option<FlakyItem> {
    let first = history.first()?;
    let mut last_switch = first.time;
    let mut switch_count = 0;
    let mut previous = first.status.as_str();

    for entry in history {
        if entry.status != previous {
            switch_count += 1;
            last_switch = entry.time;
        }
        previous = entry.status.as_str();
    }

    let total = history.len();
    Some(FlakyItem {
        unique_id: name.to_string(),
        name: name.to_string(),
        total,
        switch_count,
        switch_percent: format_two(switch_count as f64 / total as f64 * 100.0),
        last_switch,
        statuses: history.iter().map(|e| e.status.clone()).collect(),
    })
}

/// Rank items by switch count.
///
/// Items are sorted ascending by switch count (stable, so ties keep input
/// order) and then truncated to `top_n`. Records without history are skipped.
#[must_use]
pub fn rank_flaky(records: &[RawRecord], top_n: usize) -> Vec<FlakyItem> {
    let mut items: Vec<FlakyItem> = records
        .iter()
        .filter_map(|record| {
            let Some(mut item) = analyze_flakiness(&record.name, &record.status_history) else {
                warn!("Skipping item '{}' with empty status history", record.name);
                return None;
            };
            item.unique_id = record.id.clone();
            Some(item)
        })
        .collect();

    items.sort_by_key(|item| item.switch_count);
    items.truncate(top_n);
    debug!("Ranked {} flaky items (top {})", items.len(), top_n);
    items
}

// ============================================================================
// Most failed
// ============================================================================

/// Failure summary of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MostFailedItem {
    pub unique_id: String,
    pub name: String,
    /// Number of history entries.
    pub total: usize,
    /// Number of entries matching the failure status.
    pub failed_count: usize,
    /// `failed_count / total * 100`, two decimals.
    pub percentage: String,
    /// Time of the most recent failure.
    pub last_failure: Option<DateTime<Utc>>,
    /// Per-entry failure flags in history order.
    pub is_failed: Vec<bool>,
}

impl MostFailedItem {
    /// Chart object carrying this item's values.
    #[must_use]
    pub fn to_chart_object(&self) -> ChartObject {
        let mut object = ChartObject::new()
            .with_name(self.name.clone())
            .with_value(TOTAL, self.total.to_string())
            .with_value(FAILED_COUNT, self.failed_count.to_string())
            .with_value(PERCENTAGE, self.percentage.clone())
            .with_value(
                IS_FAILED,
                self.is_failed
                    .iter()
                    .map(bool::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        object.id = Some(self.unique_id.clone());
        if let Some(time) = self.last_failure {
            object.set(LAST_TIME, time.timestamp_millis().to_string());
        }
        object
    }
}

/// Status an item must report to count as failed under a criteria field.
///
/// The last segment of the field names the status, so
/// `statistics$executions$skipped` counts skips. No criteria means failures.
///
/// ```
/// use widget_stats::aggregation::history::criteria_status;
///
/// assert_eq!(criteria_status(None), "FAILED");
/// assert_eq!(criteria_status(Some("statistics$executions$skipped")), "SKIPPED");
/// ```
#[must_use]
pub fn criteria_status(criteria: Option<&str>) -> String {
    criteria
        .and_then(|c| c.rsplit(['.', '$']).next())
        .filter(|s| !s.is_empty())
        .map_or_else(|| STATUS_FAILED.to_string(), str::to_uppercase)
}

/// Rank items by how often they reported `failure_status`.
///
/// Items that never failed are left out. Sorted descending by failed count,
/// ties by name, truncated to `top_n`.
#[must_use]
pub fn rank_most_failed(
    records: &[RawRecord],
    failure_status: &str,
    top_n: usize,
) -> Vec<MostFailedItem> {
    let mut items: Vec<MostFailedItem> = records
        .iter()
        .filter(|record| !record.status_history.is_empty())
        .filter_map(|record| {
            let is_failed: Vec<bool> = record
                .status_history
                .iter()
                .map(|e| e.status.eq_ignore_ascii_case(failure_status))
                .collect();
            let failed_count = is_failed.iter().filter(|f| **f).count();
            if failed_count == 0 {
                return None;
            }
            let last_failure = record
                .status_history
                .iter()
                .zip(&is_failed)
                .filter(|(_, failed)| **failed)
                .map(|(entry, _)| entry.time)
                .last();
            let total = is_failed.len();
            Some(MostFailedItem {
                unique_id: record.id.clone(),
                name: record.name.clone(),
                total,
                failed_count,
                percentage: format_two(failed_count as f64 / total as f64 * 100.0),
                last_failure,
                is_failed,
            })
        })
        .collect();

    items.sort_by(|a, b| {
        b.failed_count
            .cmp(&a.failed_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    items.truncate(top_n);
    debug!("Ranked {} most failed items (top {})", items.len(), top_n);
    items
}

/// Statuses named by a set of criteria fields, unknown ones dropped.
///
/// ```
/// use widget_stats::aggregation::history::criteria_statuses;
///
/// let fields = ["statistics$executions$failed".to_string(), "executions.total".to_string()];
/// assert_eq!(criteria_statuses(&fields), vec!["FAILED"]);
/// ```
#[must_use]
pub fn criteria_statuses(fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|field| criteria_status(Some(field)))
        .filter(|status| KNOWN_STATUSES.contains(&status.as_str()))
        .collect()
}

// ============================================================================
// Most time consuming
// ============================================================================

/// Duration summary of one finished item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeConsumingItem {
    pub unique_id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Run time in milliseconds.
    pub duration_millis: i64,
    pub status: Option<String>,
}

impl TimeConsumingItem {
    /// Chart object carrying this item's values.
    #[must_use]
    pub fn to_chart_object(&self) -> ChartObject {
        let mut object = ChartObject {
            name: Some(self.name.clone()),
            start_time: Some(self.start_time.timestamp_millis()),
            id: Some(self.unique_id.clone()),
            ..ChartObject::default()
        }
        .with_value(DURATION, self.duration_millis.to_string());
        if let Some(status) = &self.status {
            object.set(STATUS, status.clone());
        }
        object
    }
}

/// Rank finished items by duration, longest first.
///
/// Only steps count, plus before/after methods when `include_methods` is
/// set. A non-empty `statuses` keeps items whose final status is listed.
/// Unfinished items are skipped. Ties go by name; truncated to `top_n`.
#[must_use]
pub fn rank_most_time_consuming(
    records: &[RawRecord],
    statuses: &[String],
    include_methods: bool,
    top_n: usize,
) -> Vec<TimeConsumingItem> {
    let mut items: Vec<TimeConsumingItem> = records
        .iter()
        .filter(|record| record.is_step(include_methods))
        .filter(|record| {
            statuses.is_empty()
                || record
                    .status
                    .as_deref()
                    .is_some_and(|s| statuses.iter().any(|wanted| wanted.eq_ignore_ascii_case(s)))
        })
        .filter_map(|record| {
            Some(TimeConsumingItem {
                unique_id: record.id.clone(),
                name: record.name.clone(),
                start_time: record.start_time,
                duration_millis: record.duration_millis()?,
                status: record.status.clone(),
            })
        })
        .collect();

    items.sort_by(|a, b| {
        b.duration_millis
            .cmp(&a.duration_millis)
            .then_with(|| a.name.cmp(&b.name))
    });
    items.truncate(top_n);
    debug!("Ranked {} time consuming items (top {})", items.len(), top_n);
    items
}

/// Chart object for the reserved `lastLaunch` entry.
#[must_use]
pub fn last_launch_object(launch: &LaunchRef) -> ChartObject {
    ChartObject {
        name: Some(launch.name.clone()),
        number: launch.number,
        id: launch.id.clone(),
        ..ChartObject::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn item(name: &str, statuses: &[&str]) -> RawRecord {
        statuses
            .iter()
            .zip(1..)
            .fold(RawRecord::new(name, name, at(1)), |r, (s, d)| {
                r.with_history_entry(*s, at(d))
            })
    }

    // =========================================================================
    // Flakiness tests
    // =========================================================================

    #[test]
    fn test_stable_history_has_no_switches() {
        let record = item("stable", &["PASSED", "PASSED", "PASSED"]);
        let flaky = analyze_flakiness(&record.name, &record.status_history).unwrap();
        assert_eq!(flaky.switch_count, 0);
        assert_eq!(flaky.switch_percent, "0.00");
        assert_eq!(flaky.last_switch, at(1));
    }

    #[test]
    fn test_empty_history_is_skipped() {
        assert!(analyze_flakiness("none", &[]).is_none());
        let ranked = rank_flaky(&[RawRecord::new("x", "x", at(1))], 20);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_sorts_ascending_then_truncates() {
        let records = vec![
            item("very", &["PASSED", "FAILED", "PASSED", "FAILED"]),
            item("stable", &["PASSED", "PASSED"]),
            item("some", &["PASSED", "FAILED"]),
        ];
        let ranked = rank_flaky(&records, 2);
        let names: Vec<&str> = ranked.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["stable", "some"]);
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let records = vec![
            item("b", &["PASSED", "FAILED"]),
            item("a", &["FAILED", "PASSED"]),
        ];
        let first = rank_flaky(&records, 20);
        let second = rank_flaky(&records, 20);
        assert_eq!(first, second);
        assert_eq!(first[0].name, "b");
    }

    #[test]
    fn test_flaky_chart_object_values() {
        let record = item("t", &["PASSED", "FAILED"]);
        let object = analyze_flakiness("t", &record.status_history)
            .unwrap()
            .to_chart_object();
        assert_eq!(object.value(STATUSES), Some("PASSED, FAILED"));
        assert_eq!(object.value(SWITCHED), Some("1"));
        assert_eq!(object.value(PERCENTAGE), Some("50.00"));
        assert_eq!(
            object.value(LAST_SWITCH),
            Some(at(2).timestamp_millis().to_string().as_str())
        );
    }

    // =========================================================================
    // Most failed tests
    // =========================================================================

    #[test]
    fn test_rank_most_failed() {
        let records = vec![
            item("once", &["FAILED", "PASSED", "PASSED"]),
            item("never", &["PASSED", "PASSED"]),
            item("twice", &["FAILED", "FAILED", "PASSED", "PASSED"]),
        ];
        let ranked = rank_most_failed(&records, "FAILED", 20);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "twice");
        assert_eq!(ranked[0].failed_count, 2);
        assert_eq!(ranked[0].percentage, "50.00");
        assert_eq!(ranked[0].last_failure, Some(at(2)));
        assert_eq!(ranked[0].is_failed, vec![true, true, false, false]);
        assert_eq!(ranked[1].name, "once");
    }

    #[test]
    fn test_rank_most_failed_ties_by_name() {
        let records = vec![item("zulu", &["FAILED"]), item("alpha", &["FAILED"])];
        let ranked = rank_most_failed(&records, "FAILED", 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "alpha");
    }

    #[test]
    fn test_criteria_status_from_field() {
        assert_eq!(criteria_status(Some("executions.passed")), "PASSED");
        assert_eq!(criteria_status(Some("")), "FAILED");
    }

    #[test]
    fn test_criteria_statuses_drop_counters() {
        let fields = vec![
            "statistics$executions$passed".to_string(),
            "statistics$executions$total".to_string(),
            "skipped".to_string(),
        ];
        assert_eq!(criteria_statuses(&fields), vec!["PASSED", "SKIPPED"]);
    }

    #[test]
    fn test_rank_flaky_keeps_item_ids() {
        let records = vec![
            RawRecord::new("id-1", "same", at(1))
                .with_history_entry("PASSED", at(1))
                .with_history_entry("FAILED", at(2)),
            RawRecord::new("id-2", "same", at(1)).with_history_entry("PASSED", at(1)),
        ];
        let ranked = rank_flaky(&records, 20);
        let ids: Vec<&str> = ranked.iter().map(|i| i.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["id-2", "id-1"]);
        assert_eq!(ranked[0].to_chart_object().id.as_deref(), Some("id-2"));
    }

    // =========================================================================
    // Most time consuming tests
    // =========================================================================

    fn timed(id: &str, seconds: i64) -> RawRecord {
        RawRecord::new(id, id, at(1)).with_end_time(at(1) + chrono::Duration::seconds(seconds))
    }

    #[test]
    fn test_rank_most_time_consuming_longest_first() {
        let records = vec![
            timed("fast", 2),
            timed("slow", 90),
            RawRecord::new("running", "running", at(1)),
            timed("medium", 30),
        ];
        let ranked = rank_most_time_consuming(&records, &[], false, 2);
        let names: Vec<&str> = ranked.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["slow", "medium"]);
        assert_eq!(ranked[0].duration_millis, 90_000);

        let object = ranked[0].to_chart_object();
        assert_eq!(object.value(DURATION), Some("90000"));
        assert_eq!(object.start_time, Some(at(1).timestamp_millis()));
    }

    #[test]
    fn test_rank_most_time_consuming_filters() {
        let records = vec![
            timed("step", 10).with_status("FAILED"),
            timed("passed", 50).with_status("PASSED"),
            timed("setup", 99).with_item_type("BEFORE_METHOD").with_status("FAILED"),
        ];
        let failed = vec!["FAILED".to_string()];

        let steps = rank_most_time_consuming(&records, &failed, false, 20);
        let names: Vec<&str> = steps.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["step"]);

        let with_methods = rank_most_time_consuming(&records, &failed, true, 20);
        let names: Vec<&str> = with_methods.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["setup", "step"]);
        assert_eq!(with_methods[0].to_chart_object().value(STATUS), Some("FAILED"));
    }

    #[test]
    fn test_last_launch_object() {
        let launch = LaunchRef {
            name: "Nightly".to_string(),
            number: Some(12),
            id: Some("l-12".to_string()),
        };
        let object = last_launch_object(&launch);
        assert_eq!(object.name.as_deref(), Some("Nightly"));
        assert_eq!(object.number, Some(12));
        assert!(object.values.is_empty());
    }
}
