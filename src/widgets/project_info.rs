//! Project-level activity widgets: launch counts and defect totals per
//! calendar interval, and per-name total statistics.

use super::options::IntervalOptions;
use super::StrategyInput;
use crate::aggregation::grouping::{month_bounds, week_bounds, Group};
use crate::aggregation::ratio::format_compact;
use crate::aggregation::{group_by_date, group_by_name, GroupingPeriod};
use crate::content::{ChartObject, WidgetContent};
use crate::error::Result;
use crate::record::{
    CounterSet, EXECUTIONS_TOTAL, ISSUE_AUTOMATION_BUG, ISSUE_PRODUCT_BUG,
    ISSUE_SYSTEM_ISSUE, ISSUE_TO_INVESTIGATE,
};
use chrono::{NaiveDate, Weekday};
use tracing::debug;

/// Display name of every launches quantity point.
pub const QUANTITY_NAME: &str = "Number of launches";

pub const COUNT: &str = "count";
pub const INTERVAL: &str = "interval";
pub const START: &str = "start";
pub const END: &str = "end";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const AVG: &str = "avg";

/// Defect sums reported per interval, keyed by their short output name.
const ISSUE_OUTPUTS: [(&str, &str); 4] = [
    ("productBug", ISSUE_PRODUCT_BUG),
    ("systemIssue", ISSUE_SYSTEM_ISSUE),
    ("automationBug", ISSUE_AUTOMATION_BUG),
    ("toInvestigate", ISSUE_TO_INVESTIGATE),
];

/// First day of a group, from any of its records.
fn group_date(group: &Group<'_>) -> Option<NaiveDate> {
    group.1.first().map(|r| r.start_time.date_naive())
}

/// Start and end labels of the interval containing `date`.
fn interval_bounds(interval: GroupingPeriod, date: NaiveDate) -> (NaiveDate, Option<NaiveDate>) {
    match interval {
        GroupingPeriod::Week => {
            let (start, end) = week_bounds(date);
            (start, Some(end))
        }
        GroupingPeriod::Month => {
            let (start, end) = month_bounds(date);
            (start, Some(end))
        }
        _ => (date, None),
    }
}

/// Date of the first day under a group key.
fn key_date(interval: GroupingPeriod, key: &str) -> Option<NaiveDate> {
    match interval {
        GroupingPeriod::Week => {
            let (year, week) = key.split_once("-W")?;
            NaiveDate::from_isoywd_opt(year.parse().ok()?, week.parse().ok()?, Weekday::Mon)
        }
        GroupingPeriod::Month => NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(key, "%Y-%m-%d").ok(),
    }
}

/// Number of runs per calendar interval, gap-filled.
///
/// Week intervals are ISO weeks (Monday to Sunday); each point carries the
/// interval bounds. Day points carry only their start.
///
/// # Errors
///
/// Fails when `interval` is absent or not a calendar period.
pub fn launches_quantity(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let options = IntervalOptions::parse(input)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let mut content = WidgetContent::new();
    for group in group_by_date(input.records, options.interval) {
        let mut object = ChartObject::new()
            .with_name(QUANTITY_NAME)
            .with_value(COUNT, group.1.len().to_string())
            .with_value(INTERVAL, options.interval.as_str());
        if let Some(date) = group_date(&group).or_else(|| key_date(options.interval, &group.0)) {
            let (start, end) = interval_bounds(options.interval, date);
            object.set(START, start.to_string());
            if let Some(end) = end {
                object.set(END, end.to_string());
            }
        }
        content.push(group.0, object);
    }
    debug!("Counted launches over {} {} intervals", content.len(), options.interval);
    Ok(content)
}

/// Defect sums per calendar interval, gap-filled.
///
/// # Errors
///
/// Fails when `interval` is absent or not a calendar period.
pub fn launches_issues(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let options = IntervalOptions::parse(input)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let mut content = WidgetContent::new();
    for (key, records) in group_by_date(input.records, options.interval) {
        let mut object = ChartObject::new();
        for (output, field) in ISSUE_OUTPUTS {
            let sum: i64 = records.iter().map(|r| r.count(field)).sum();
            object.set(output, sum.to_string());
        }
        content.push(key, object);
    }
    Ok(content)
}

/// Min, max and average total per launch name.
///
/// # Errors
///
/// Never fails; the signature matches the registry.
pub fn unique_launches(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let mut content = WidgetContent::new();
    for (name, records) in group_by_name(input.records) {
        let totals: Vec<i64> = records.iter().map(|r| r.count(EXECUTIONS_TOTAL)).collect();
        let (Some(min), Some(max)) = (totals.iter().min(), totals.iter().max()) else {
            continue;
        };
        let avg = totals.iter().sum::<i64>() as f64 / totals.len() as f64;
        let object = ChartObject::new()
            .with_name(name.clone())
            .with_value(MIN, min.to_string())
            .with_value(MAX, max.to_string())
            .with_value(AVG, format_compact(avg));
        content.push(name, object);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::WidgetError;
    use crate::request::AggregationRequest;
    use crate::testing::fixtures::{at, run};
    use crate::widgets::WidgetType;

    fn build(
        strategy: fn(&StrategyInput<'_>) -> Result<WidgetContent>,
        widget: WidgetType,
        request: &AggregationRequest,
    ) -> Result<WidgetContent> {
        let config = EngineConfig::default();
        strategy(&StrategyInput::new(widget, request, &config))
    }

    // =========================================================================
    // Launches quantity
    // =========================================================================

    #[test]
    fn test_quantity_requires_interval() {
        let request = AggregationRequest::new("launches_quantity").with_records(vec![run("1", "a", at(2024, 1, 1))]);
        let err = build(launches_quantity, WidgetType::LaunchesQuantity, &request).unwrap_err();
        assert!(matches!(err, WidgetError::MissingRequiredOption { .. }));
    }

    #[test]
    fn test_quantity_by_iso_week() {
        // 2024-01-01 is a Monday; 2024-01-17 falls in week 3.
        let request = AggregationRequest::new("launches_quantity")
            .with_option("interval", "week")
            .with_records(vec![
                run("1", "a", at(2024, 1, 1)),
                run("2", "a", at(2024, 1, 3)),
                run("3", "a", at(2024, 1, 17)),
            ]);
        let content = build(launches_quantity, WidgetType::LaunchesQuantity, &request).unwrap();
        let keys: Vec<&str> = content.keys().collect();
        assert_eq!(keys, vec!["2024-W01", "2024-W02", "2024-W03"]);

        let first = &content.get("2024-W01").unwrap()[0];
        assert_eq!(first.name.as_deref(), Some(QUANTITY_NAME));
        assert_eq!(first.value(COUNT), Some("2"));
        assert_eq!(first.value(START), Some("2024-01-01"));
        assert_eq!(first.value(END), Some("2024-01-07"));

        let gap = &content.get("2024-W02").unwrap()[0];
        assert_eq!(gap.value(COUNT), Some("0"));
        assert_eq!(gap.value(START), Some("2024-01-08"));
        assert_eq!(gap.value(END), Some("2024-01-14"));
    }

    #[test]
    fn test_quantity_by_day_has_no_end() {
        let request = AggregationRequest::new("launches_quantity")
            .with_option("interval", "day")
            .with_records(vec![run("1", "a", at(2024, 1, 1))]);
        let content = build(launches_quantity, WidgetType::LaunchesQuantity, &request).unwrap();
        let object = &content.get("2024-01-01").unwrap()[0];
        assert_eq!(object.value(START), Some("2024-01-01"));
        assert_eq!(object.value(END), None);
        assert_eq!(object.value(INTERVAL), Some("day"));
    }

    // =========================================================================
    // Launches issues
    // =========================================================================

    #[test]
    fn test_issues_per_month() {
        let request = AggregationRequest::new("launches_issues")
            .with_option("interval", "month")
            .with_records(vec![
                run("1", "a", at(2024, 1, 5)).with_counter(ISSUE_PRODUCT_BUG, 2),
                run("2", "a", at(2024, 1, 20)).with_counter(ISSUE_PRODUCT_BUG, 1),
                run("3", "a", at(2024, 3, 1)).with_counter(ISSUE_TO_INVESTIGATE, 4),
            ]);
        let content = build(launches_issues, WidgetType::LaunchesIssues, &request).unwrap();
        let keys: Vec<&str> = content.keys().collect();
        assert_eq!(keys, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(content.get("2024-01").unwrap()[0].value("productBug"), Some("3"));
        assert_eq!(content.get("2024-02").unwrap()[0].value("productBug"), Some("0"));
        assert_eq!(content.get("2024-03").unwrap()[0].value("toInvestigate"), Some("4"));
    }

    // =========================================================================
    // Unique launches
    // =========================================================================

    #[test]
    fn test_unique_launches_min_max_avg() {
        let request = AggregationRequest::new("unique_launches").with_records(vec![
            run("1", "Smoke", at(2024, 1, 1)).with_counter(EXECUTIONS_TOTAL, 10),
            run("2", "Regression", at(2024, 1, 2)).with_counter(EXECUTIONS_TOTAL, 100),
            run("3", "Smoke", at(2024, 1, 3)).with_counter(EXECUTIONS_TOTAL, 15),
        ]);
        let content = build(unique_launches, WidgetType::UniqueLaunches, &request).unwrap();
        let keys: Vec<&str> = content.keys().collect();
        assert_eq!(keys, vec!["Smoke", "Regression"]);

        let smoke = &content.get("Smoke").unwrap()[0];
        assert_eq!(smoke.value(MIN), Some("10"));
        assert_eq!(smoke.value(MAX), Some("15"));
        assert_eq!(smoke.value(AVG), Some("12.5"));
    }
}
