//! Investigated and not-passed percentage charts.

use super::options::TrendOptions;
use super::StrategyInput;
use crate::aggregation::ratio::{investigated, not_passed as not_passed_share, NOT_PASSED};
use crate::aggregation::bucket;
use crate::content::{ChartObject, WidgetContent};
use crate::error::Result;
use crate::record::{
    ISSUE_AUTOMATION_BUG, ISSUE_PRODUCT_BUG, ISSUE_SYSTEM_ISSUE, ISSUE_TO_INVESTIGATE,
};

const INVESTIGATION_FIELDS: [&str; 4] = [
    ISSUE_PRODUCT_BUG,
    ISSUE_SYSTEM_ISSUE,
    ISSUE_AUTOMATION_BUG,
    ISSUE_TO_INVESTIGATE,
];

/// Investigated and to-investigate shares per record, or per timeline bucket.
///
/// # Errors
///
/// Fails on an invalid `timeline`.
pub fn investigated_trend(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let options = TrendOptions::parse(input)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let Some(period) = options.timeline else {
        let series = input
            .records
            .iter()
            .map(|record| {
                let mut object = ChartObject::for_record(record);
                investigated(record).write_into(&mut object.values);
                object
            })
            .collect();
        return Ok(WidgetContent::result(series));
    };

    let fields: Vec<String> = INVESTIGATION_FIELDS.iter().map(|f| (*f).to_string()).collect();
    let mut content = WidgetContent::new();
    for bucket in bucket(input.records, period, &fields) {
        let mut object = ChartObject::new();
        investigated(&bucket).write_into(&mut object.values);
        content.push(bucket.key, object);
    }
    Ok(content)
}

/// Share of failed and skipped executions per record.
///
/// # Errors
///
/// Never fails; the signature matches the registry.
pub fn not_passed(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }
    let series = input
        .records
        .iter()
        .map(|record| ChartObject::for_record(record).with_value(NOT_PASSED, not_passed_share(record)))
        .collect();
    Ok(WidgetContent::result(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::ratio::{INVESTIGATED, TO_INVESTIGATE};
    use crate::config::EngineConfig;
    use crate::record::{EXECUTIONS_FAILED, EXECUTIONS_SKIPPED, EXECUTIONS_TOTAL};
    use crate::request::AggregationRequest;
    use crate::testing::fixtures::{at, run};
    use crate::widgets::WidgetType;

    #[test]
    fn test_not_passed_per_record() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("not_passed").with_records(vec![
            run("1", "a", at(2024, 1, 2))
                .with_counter(EXECUTIONS_TOTAL, 10)
                .with_counter(EXECUTIONS_FAILED, 2)
                .with_counter(EXECUTIONS_SKIPPED, 1),
            run("2", "a", at(2024, 1, 1)).with_counter(EXECUTIONS_TOTAL, 8),
        ]);
        let content = not_passed(&StrategyInput::new(WidgetType::NotPassed, &request, &config)).unwrap();
        let values: Vec<&str> = content
            .get("result")
            .unwrap()
            .iter()
            .filter_map(|o| o.value(NOT_PASSED))
            .collect();
        assert_eq!(values, vec!["30.00", "0"]);
    }

    #[test]
    fn test_investigated_per_record() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("investigated_trend").with_records(vec![run(
            "1",
            "a",
            at(2024, 1, 1),
        )
        .with_counter(ISSUE_PRODUCT_BUG, 1)
        .with_counter(ISSUE_TO_INVESTIGATE, 3)]);
        let content =
            investigated_trend(&StrategyInput::new(WidgetType::InvestigatedTrend, &request, &config)).unwrap();
        let object = &content.get("result").unwrap()[0];
        assert_eq!(object.value(INVESTIGATED), Some("25.00"));
        assert_eq!(object.value(TO_INVESTIGATE), Some("75.00"));
    }

    #[test]
    fn test_investigated_timeline_buckets() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("investigated_trend")
            .with_option("timeline", "day")
            .with_records(vec![
                run("1", "a", at(2024, 1, 1)).with_counter(ISSUE_SYSTEM_ISSUE, 1),
                run("2", "a", at(2024, 1, 1)).with_counter(ISSUE_TO_INVESTIGATE, 1),
                run("3", "a", at(2024, 1, 3)).with_counter(ISSUE_TO_INVESTIGATE, 2),
            ]);
        let content =
            investigated_trend(&StrategyInput::new(WidgetType::InvestigatedTrend, &request, &config)).unwrap();
        assert_eq!(content.len(), 3);
        assert_eq!(content.get("2024-01-01").unwrap()[0].value(INVESTIGATED), Some("50.00"));
        assert_eq!(content.get("2024-01-02").unwrap()[0].value(INVESTIGATED), Some("0"));
        assert_eq!(content.get("2024-01-03").unwrap()[0].value(TO_INVESTIGATE), Some("100.00"));
    }
}
