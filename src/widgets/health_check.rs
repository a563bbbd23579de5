//! Component health-check table.

use super::options::HealthCheckOptions;
use super::StrategyInput;
use crate::aggregation::group_by_attribute;
use crate::aggregation::ratio::{format_two, passing_rate, PASSING_RATE};
use crate::content::{ChartObject, WidgetContent};
use crate::error::Result;
use crate::record::{CounterSet, RawRecord, EXECUTIONS_PASSED, EXECUTIONS_TOTAL};

/// Group key of the row summing every component.
pub const TOTAL_KEY: &str = "total";

fn health_row(records: &[&RawRecord]) -> ChartObject {
    let passed: i64 = records.iter().map(|r| r.count(EXECUTIONS_PASSED)).sum();
    let total: i64 = records.iter().map(|r| r.count(EXECUTIONS_TOTAL)).sum();
    ChartObject::new()
        .with_value(EXECUTIONS_PASSED, passed.to_string())
        .with_value(EXECUTIONS_TOTAL, total.to_string())
        .with_value(PASSING_RATE, format_two(passing_rate(passed, total)))
}

/// Passed, total and passing rate per value of an attribute key, plus a
/// `total` row over every record carrying the attribute.
///
/// Rows keep the first-appearance order of their attribute values.
///
/// # Errors
///
/// Fails without an `attributeKey` option.
pub fn health_check_table(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let options = HealthCheckOptions::parse(input)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let groups = group_by_attribute(input.records, &options.attribute_key);
    if groups.is_empty() {
        return Ok(WidgetContent::new());
    }

    let rows = groups
        .iter()
        .map(|(value, records)| health_row(records).with_name(value.clone()))
        .collect();
    let all: Vec<&RawRecord> = groups
        .iter()
        .flat_map(|(_, records)| records.iter().copied())
        .collect();

    let mut content = WidgetContent::result(rows);
    content.insert(TOTAL_KEY, vec![health_row(&all)]);
    Ok(content)
}
