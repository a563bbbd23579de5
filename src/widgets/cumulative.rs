//! Cumulative trend over attribute values.
//!
//! Runs are grouped by the value of one attribute key (typically a build or
//! release tag). Within a group only the latest run of each launch name
//! counts, so re-runs do not inflate the totals.

use super::options::{content_fields, CumulativeOptions};
use super::StrategyInput;
use crate::aggregation::group_by_attribute;
use crate::content::{ChartObject, WidgetContent};
use crate::error::Result;
use crate::record::{CounterSet, RawRecord};
use std::collections::HashMap;
use tracing::debug;

/// Latest run per launch name, in the group's order.
fn latest_per_name<'a>(records: &[&'a RawRecord]) -> Vec<&'a RawRecord> {
    let mut latest: Vec<&RawRecord> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for &record in records {
        match index.get(record.name.as_str()) {
            Some(&slot) if latest[slot].start_time <= record.start_time => latest[slot] = record,
            Some(_) => {}
            None => {
                index.insert(record.name.as_str(), latest.len());
                latest.push(record);
            }
        }
    }
    latest
}

/// Summed content fields per attribute value, oldest value first.
///
/// # Errors
///
/// Fails without a `prefix` option or without content fields.
pub fn cumulative_trend(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let options = CumulativeOptions::parse(input)?;
    let fields = content_fields(input, true)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let mut chronological: Vec<RawRecord> = input.records.to_vec();
    chronological.sort_by_key(|r| r.start_time);

    let mut content = WidgetContent::new();
    for (value, records) in group_by_attribute(&chronological, &options.prefix) {
        let latest = latest_per_name(&records);
        let mut object = ChartObject::new().with_name(value.clone());
        for field in &fields {
            let sum: i64 = latest.iter().map(|r| r.count(field)).sum();
            object.set(field.clone(), sum.to_string());
        }
        content.push(value, object);
    }
    debug!(
        "Cumulative trend over '{}' produced {} groups",
        options.prefix,
        content.len()
    );
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::WidgetError;
    use crate::record::EXECUTIONS_TOTAL;
    use crate::request::AggregationRequest;
    use crate::testing::fixtures::{at, run};
    use crate::widgets::WidgetType;

    fn build(request: &AggregationRequest) -> Result<WidgetContent> {
        let config = EngineConfig::default();
        cumulative_trend(&StrategyInput::new(WidgetType::CumulativeTrend, request, &config))
    }

    #[test]
    fn test_requires_prefix() {
        let request = AggregationRequest::new("cumulative_trend").with_content_fields(["executions.total"]);
        assert!(matches!(
            build(&request).unwrap_err(),
            WidgetError::MissingRequiredOption { .. }
        ));
    }

    #[test]
    fn test_latest_run_per_name_within_group() {
        let request = AggregationRequest::new("cumulative_trend")
            .with_option("prefix", "build")
            .with_content_fields(["statistics$executions$total"])
            .with_records(vec![
                run("4", "api", at(2024, 1, 4))
                    .with_attribute("build", "1.1")
                    .with_counter(EXECUTIONS_TOTAL, 7),
                run("3", "ui", at(2024, 1, 3))
                    .with_attribute("build", "1.0")
                    .with_counter(EXECUTIONS_TOTAL, 5),
                run("2", "api", at(2024, 1, 2))
                    .with_attribute("build", "1.0")
                    .with_counter(EXECUTIONS_TOTAL, 20),
                run("1", "api", at(2024, 1, 1))
                    .with_attribute("build", "1.0")
                    .with_counter(EXECUTIONS_TOTAL, 10),
                run("0", "api", at(2024, 1, 1)).with_counter(EXECUTIONS_TOTAL, 99),
            ]);
        let content = build(&request).unwrap();
        let keys: Vec<&str> = content.keys().collect();
        assert_eq!(keys, vec!["1.0", "1.1"]);
        assert_eq!(content.get("1.0").unwrap()[0].value(EXECUTIONS_TOTAL), Some("25"));
        assert_eq!(content.get("1.1").unwrap()[0].value(EXECUTIONS_TOTAL), Some("7"));
    }
}
