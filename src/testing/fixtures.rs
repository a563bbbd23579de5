//! Test fixtures for building record batches.
//!
//! Provides run and test-item builders shared by unit tests, integration
//! tests and benches.

use crate::record::{
    RawRecord, EXECUTIONS_FAILED, EXECUTIONS_PASSED, EXECUTIONS_SKIPPED, EXECUTIONS_TOTAL,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// 08:00 UTC on the given date.
///
/// # Panics
///
/// Panics if the date is invalid.
#[must_use]
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    at_hour(year, month, day, 8)
}

/// The given hour UTC on the given date.
///
/// # Panics
///
/// Panics if the date or hour is invalid.
#[must_use]
pub fn at_hour(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("Invalid fixture date")
}

/// A run with no counters.
#[must_use]
pub fn run(id: &str, name: &str, start: DateTime<Utc>) -> RawRecord {
    RawRecord::new(id, name, start)
}

/// A run with execution counters; total is the sum of the three.
#[must_use]
pub fn run_with_executions(
    id: &str,
    name: &str,
    start: DateTime<Utc>,
    passed: i64,
    failed: i64,
    skipped: i64,
) -> RawRecord {
    run(id, name, start)
        .with_counter(EXECUTIONS_TOTAL, passed + failed + skipped)
        .with_counter(EXECUTIONS_PASSED, passed)
        .with_counter(EXECUTIONS_FAILED, failed)
        .with_counter(EXECUTIONS_SKIPPED, skipped)
}

/// A test item whose history has one entry per day from 2024-01-01.
///
/// The item name doubles as its id.
#[must_use]
pub fn history_item(name: &str, statuses: &[&str]) -> RawRecord {
    let first = at(2024, 1, 1);
    statuses
        .iter()
        .zip(0..)
        .fold(RawRecord::new(name, name, first), |record, (status, day)| {
            record.with_history_entry(*status, first + Duration::days(day))
        })
}

/// One run per day for `days` days, newest first, with growing totals.
#[must_use]
pub fn daily_runs(name: &str, start: DateTime<Utc>, days: i64) -> Vec<RawRecord> {
    (0..days)
        .rev()
        .map(|day| {
            let failed = day % 3;
            run_with_executions(
                &format!("{name}-{day}"),
                name,
                start + Duration::days(day),
                10 + day,
                failed,
                day % 2,
            )
        })
        .collect()
}

/// `count` test items with alternating histories of length `len`.
#[must_use]
pub fn history_items(count: usize, len: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let statuses: Vec<&str> = (0..len)
                .map(|j| if (i + j) % (i % 4 + 2) == 0 { "FAILED" } else { "PASSED" })
                .collect();
            history_item(&format!("item-{i}"), &statuses)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_item_is_chronological() {
        let item = history_item("login", &["PASSED", "FAILED"]);
        assert_eq!(item.id, "login");
        assert_eq!(item.status_history.len(), 2);
        assert!(item.status_history[0].time < item.status_history[1].time);
    }

    #[test]
    fn test_daily_runs_newest_first() {
        let runs = daily_runs("Smoke", at(2024, 1, 1), 3);
        assert_eq!(runs.len(), 3);
        assert!(runs[0].start_time > runs[2].start_time);
        assert_eq!(runs[2].counter(EXECUTIONS_TOTAL), 10);
    }
}
