//! Counter-based chart strategies: trends, overall sums, durations and the
//! passing rate summary.

use super::options::{content_fields, TrendOptions};
use super::StrategyInput;
use crate::aggregation::ratio::{format_two, passing_rate, PASSING_RATE};
use crate::aggregation::{bucket, GroupingPeriod};
use crate::content::{ChartObject, WidgetContent};
use crate::error::Result;
use crate::record::{CounterSet, RawRecord, DEFECT_FIELDS, EXECUTIONS_PASSED, EXECUTIONS_TOTAL, EXECUTION_FIELDS};
use tracing::debug;

/// Output key of a run duration in milliseconds.
pub const DURATION: &str = "duration";
/// Output key of a run end time in epoch milliseconds.
pub const END_TIME: &str = "endTime";
/// Output key of a run status.
pub const STATUS: &str = "status";
/// Output key of the summed passed count.
pub const PASSED: &str = "passed";
/// Output key of the summed total count.
pub const TOTAL: &str = "total";

/// One chart object per record carrying the requested counters.
fn per_record(records: &[RawRecord], fields: &[String]) -> Vec<ChartObject> {
    records
        .iter()
        .map(|record| {
            let mut object = ChartObject::for_record(record);
            for field in fields {
                object.set(field.clone(), record.count(field).to_string());
            }
            object
        })
        .collect()
}

/// Gap-filled buckets keyed by date, one summed object each.
fn timeline(records: &[RawRecord], period: GroupingPeriod, fields: &[String]) -> WidgetContent {
    let mut content = WidgetContent::new();
    for bucket in bucket(records, period, fields) {
        content.push(bucket.key.clone(), bucket.to_chart_object());
    }
    content
}

fn trend(input: &StrategyInput<'_>, fields: &[String], options: TrendOptions) -> WidgetContent {
    match options.timeline {
        Some(period) => {
            debug!("Building {} over {} timeline", input.widget, period);
            timeline(input.records, period, fields)
        }
        None => WidgetContent::result(per_record(input.records, fields)),
    }
}

/// Requested counters per record, or summed per timeline bucket.
///
/// # Errors
///
/// Fails without content fields or on an invalid `timeline`.
pub fn statistic_trend(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let fields = content_fields(input, true)?;
    let options = TrendOptions::parse(input)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }
    Ok(trend(input, &fields, options))
}

/// Statistic trend defaulting to every execution and defect counter.
///
/// # Errors
///
/// Fails on a malformed content field or an invalid `timeline`.
pub fn launch_statistics(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let mut fields = content_fields(input, false)?;
    if fields.is_empty() {
        fields = EXECUTION_FIELDS
            .iter()
            .chain(DEFECT_FIELDS.iter())
            .map(|f| (*f).to_string())
            .collect();
    }
    let options = TrendOptions::parse(input)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }
    Ok(trend(input, &fields, options))
}

/// Sum of each requested counter across the batch.
///
/// # Errors
///
/// Fails without content fields.
pub fn overall_statistics(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let fields = content_fields(input, true)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let mut object = ChartObject::new();
    for field in &fields {
        let sum: i64 = input.records.iter().map(|r| r.count(field)).sum();
        object.set(field.clone(), sum.to_string());
    }
    Ok(WidgetContent::result(vec![object]))
}

/// Duration of every finished run.
///
/// Runs without an end time are still in progress and are left out.
///
/// # Errors
///
/// Never fails; the signature matches the registry.
pub fn launches_duration(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let series: Vec<ChartObject> = input
        .records
        .iter()
        .filter_map(|record| {
            let Some(duration) = record.duration_millis() else {
                debug!("Skipping unfinished run '{}'", record.id);
                return None;
            };
            let mut object = ChartObject::for_record(record).with_value(DURATION, duration.to_string());
            if let Some(end) = record.end_time {
                object.set(END_TIME, end.timestamp_millis().to_string());
            }
            if let Some(status) = &record.status {
                object.set(STATUS, status.clone());
            }
            Some(object)
        })
        .collect();

    if series.is_empty() {
        return Ok(WidgetContent::new());
    }
    Ok(WidgetContent::result(series))
}

/// Passed and total counts over the batch with the passing rate.
///
/// # Errors
///
/// Never fails; the signature matches the registry.
pub fn passing_rate_summary(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }
    let passed: i64 = input.records.iter().map(|r| r.count(EXECUTIONS_PASSED)).sum();
    let total: i64 = input.records.iter().map(|r| r.count(EXECUTIONS_TOTAL)).sum();

    let object = ChartObject::new()
        .with_value(PASSED, passed.to_string())
        .with_value(TOTAL, total.to_string())
        .with_value(PASSING_RATE, format_two(passing_rate(passed, total)));
    Ok(WidgetContent::result(vec![object]))
}
