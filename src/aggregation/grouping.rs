//! Record grouping strategies.
//!
//! Unlike [`bucket`](super::bucket), these groupers keep the records of each
//! group so callers can compute per-group statistics of their own. Date
//! grouping here uses real ISO weeks.

use super::period::GroupingPeriod;
use crate::record::RawRecord;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::HashMap;

/// Records of one group, in input order.
pub type Group<'a> = (String, Vec<&'a RawRecord>);

/// ISO week label of a date, e.g. `2024-W01`.
///
/// ```
/// use chrono::NaiveDate;
/// use widget_stats::aggregation::grouping::iso_week_key;
///
/// let date = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
/// assert_eq!(iso_week_key(date), "2025-W01");
/// ```
#[must_use]
pub fn iso_week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

/// Monday and Sunday of the ISO week containing `date`.
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = date.week(Weekday::Mon);
    (week.first_day(), week.last_day())
}

/// First and last day of the month containing `date`.
#[must_use]
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// Key of a date under a calendar interval.
fn interval_key(interval: GroupingPeriod, date: NaiveDate) -> String {
    match interval {
        GroupingPeriod::Week => iso_week_key(date),
        GroupingPeriod::Month => date.format("%Y-%m").to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

fn interval_step(interval: GroupingPeriod, date: NaiveDate) -> Option<NaiveDate> {
    match interval {
        GroupingPeriod::Week => date.checked_add_days(Days::new(7)),
        GroupingPeriod::Month => date.checked_add_months(chrono::Months::new(1)),
        _ => date.succ_opt(),
    }
}

fn interval_start(interval: GroupingPeriod, date: NaiveDate) -> NaiveDate {
    match interval {
        GroupingPeriod::Week => week_bounds(date).0,
        GroupingPeriod::Month => month_bounds(date).0,
        _ => date,
    }
}

/// Group records by calendar interval with gap-filling.
///
/// Day keys are `yyyy-MM-dd`, week keys ISO `YYYY-Www`, month keys `yyyy-MM`.
/// Intervals between the earliest and latest record with no runs appear as
/// empty groups. Groups are in ascending date order. `ByName` delegates to
/// [`group_by_name`].
#[must_use]
pub fn group_by_date(records: &[RawRecord], interval: GroupingPeriod) -> Vec<Group<'_>> {
    if !interval.is_temporal() {
        return group_by_name(records);
    }

    let dates = records.iter().map(|r| r.start_time.date_naive());
    let (Some(min), Some(max)) = (dates.clone().min(), dates.max()) else {
        return Vec::new();
    };

    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut cursor = interval_start(interval, min);
    while cursor <= max {
        groups.push((interval_key(interval, cursor), Vec::new()));
        match interval_step(interval, cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    let index: HashMap<String, usize> = groups
        .iter()
        .enumerate()
        .map(|(i, (key, _))| (key.clone(), i))
        .collect();
    for record in records {
        let key = interval_key(interval, record.start_time.date_naive());
        if let Some(&slot) = index.get(&key) {
            groups[slot].1.push(record);
        }
    }
    groups
}

/// Group records by display name, first-appearance order.
#[must_use]
pub fn group_by_name(records: &[RawRecord]) -> Vec<Group<'_>> {
    group_by_key(records, |r| Some(r.name.clone()))
}

/// Group records by the value of an attribute, first-appearance order.
///
/// Records without the attribute are left out.
#[must_use]
pub fn group_by_attribute<'a>(records: &'a [RawRecord], key: &str) -> Vec<Group<'a>> {
    group_by_key(records, |r| r.attribute(key).map(str::to_string))
}

fn group_by_key<F>(records: &[RawRecord], key_fn: F) -> Vec<Group<'_>>
where
    F: Fn(&RawRecord) -> Option<String>,
{
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let Some(key) = key_fn(record) else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record]));
            }
        }
    }
    groups
}
