//! Typed widget options.
//!
//! The raw option bag of a request is parsed into one record per strategy
//! before any record is touched.

use super::StrategyInput;
use crate::aggregation::GroupingPeriod;
use crate::error::{Result, WidgetError};
use crate::record::{internal_field, is_valid_field};

/// Optional timeline period of trend widgets.
pub const TIMELINE: &str = "timeline";
/// Calendar interval of the project-info widgets.
pub const INTERVAL: &str = "interval";
/// Attribute key grouped by the cumulative trend.
pub const PREFIX: &str = "prefix";
/// Attribute key grouped by the health-check table.
pub const ATTRIBUTE_KEY: &str = "attributeKey";
/// Launch name the history rankings are scoped to.
pub const LAUNCH_NAME_FILTER: &str = "launchNameFilter";
/// Whether the duration ranking also counts before/after methods.
pub const INCLUDE_METHODS: &str = "includeMethods";

const CALENDAR_PERIODS: &str = "one of day, week, month";

fn calendar_period(option: &str, value: &str) -> Result<GroupingPeriod> {
    match value.parse::<GroupingPeriod>() {
        Ok(period) if period.is_temporal() => Ok(period),
        _ => Err(WidgetError::invalid_option(option, value, CALENDAR_PERIODS)),
    }
}

fn required<'a>(input: &StrategyInput<'a>, option: &str) -> Result<&'a str> {
    input
        .request
        .option(option)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WidgetError::missing_option(input.widget.key(), option))
}

// ============================================================================
// Option records
// ============================================================================

/// Options of the trend widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrendOptions {
    /// Period to bucket by, `None` for one point per record.
    pub timeline: Option<GroupingPeriod>,
}

impl TrendOptions {
    /// Parse the `timeline` option, falling back to the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::InvalidOptionValue`] for anything other than a
    /// calendar period.
    pub fn parse(input: &StrategyInput<'_>) -> Result<Self> {
        let raw = input
            .request
            .option(TIMELINE)
            .or(input.config.default_timeline.as_deref());
        let timeline = raw
            .map(|value| calendar_period(TIMELINE, value))
            .transpose()?;
        Ok(Self { timeline })
    }
}

/// Options of the launches quantity and issues widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalOptions {
    pub interval: GroupingPeriod,
}

impl IntervalOptions {
    /// Parse the required `interval` option.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::MissingRequiredOption`] when absent and
    /// [`WidgetError::InvalidOptionValue`] when not a calendar period.
    pub fn parse(input: &StrategyInput<'_>) -> Result<Self> {
        let value = required(input, INTERVAL)?;
        Ok(Self {
            interval: calendar_period(INTERVAL, value)?,
        })
    }
}

/// Options of the cumulative trend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeOptions {
    /// Attribute key whose values form the groups.
    pub prefix: String,
}

impl CumulativeOptions {
    /// Parse the required `prefix` option.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::MissingRequiredOption`] when absent.
    pub fn parse(input: &StrategyInput<'_>) -> Result<Self> {
        Ok(Self {
            prefix: required(input, PREFIX)?.to_string(),
        })
    }
}

/// Options of the health-check table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckOptions {
    pub attribute_key: String,
}

impl HealthCheckOptions {
    /// Parse the required `attributeKey` option.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::MissingRequiredOption`] when absent.
    pub fn parse(input: &StrategyInput<'_>) -> Result<Self> {
        Ok(Self {
            attribute_key: required(input, ATTRIBUTE_KEY)?.to_string(),
        })
    }
}

/// Options of the history rankings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryOptions {
    pub launch_name_filter: String,
}

impl HistoryOptions {
    /// Parse the required `launchNameFilter` option.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::MissingRequiredOption`] when absent.
    pub fn parse(input: &StrategyInput<'_>) -> Result<Self> {
        Ok(Self {
            launch_name_filter: required(input, LAUNCH_NAME_FILTER)?.to_string(),
        })
    }
}

/// Options of the most time consuming ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeConsumingOptions {
    pub launch_name_filter: String,
    /// Count before/after methods alongside steps.
    pub include_methods: bool,
}

impl TimeConsumingOptions {
    /// Parse the required `launchNameFilter` and optional `includeMethods`.
    ///
    /// `includeMethods` reads `true`, `yes` or `on` as set, anything else as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::MissingRequiredOption`] without a launch name.
    pub fn parse(input: &StrategyInput<'_>) -> Result<Self> {
        let launch_name_filter = required(input, LAUNCH_NAME_FILTER)?.to_string();
        let include_methods = input.request.option(INCLUDE_METHODS).is_some_and(|v| {
            ["true", "yes", "on"]
                .iter()
                .any(|t| v.trim().eq_ignore_ascii_case(t))
        });
        Ok(Self {
            launch_name_filter,
            include_methods,
        })
    }
}

// ============================================================================
// Field validation
// ============================================================================

/// Requested content fields in internal spelling.
///
/// # Errors
///
/// Returns [`WidgetError::MissingContentFields`] when `required` and none are
/// given, or when a field is not a counter path.
pub fn content_fields(input: &StrategyInput<'_>, required: bool) -> Result<Vec<String>> {
    let fields = &input.request.content_fields;
    if required && fields.is_empty() {
        return Err(WidgetError::content_fields(
            input.widget.key(),
            "content fields should exist for providing content",
        ));
    }
    fields
        .iter()
        .map(|field| {
            if is_valid_field(field) {
                Ok(internal_field(field))
            } else {
                Err(WidgetError::content_fields(
                    input.widget.key(),
                    format!("'{field}' is not a counter field"),
                ))
            }
        })
        .collect()
}

/// Check that metadata fields were requested.
///
/// # Errors
///
/// Returns [`WidgetError::MissingContentFields`] when none are given.
pub fn require_metadata(input: &StrategyInput<'_>) -> Result<()> {
    if input.request.metadata_fields.is_empty() {
        return Err(WidgetError::content_fields(
            input.widget.key(),
            "metadata fields should exist for providing content",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::request::AggregationRequest;
    use crate::widgets::WidgetType;

    fn input<'a>(
        widget: WidgetType,
        request: &'a AggregationRequest,
        config: &'a EngineConfig,
    ) -> StrategyInput<'a> {
        StrategyInput::new(widget, request, config)
    }

    // =========================================================================
    // Option tests
    // =========================================================================

    #[test]
    fn test_trend_timeline_optional() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("statistic_trend");
        let options = TrendOptions::parse(&input(WidgetType::StatisticTrend, &request, &config)).unwrap();
        assert_eq!(options.timeline, None);

        let request = request.with_option(TIMELINE, "WEEK");
        let options = TrendOptions::parse(&input(WidgetType::StatisticTrend, &request, &config)).unwrap();
        assert_eq!(options.timeline, Some(GroupingPeriod::Week));
    }

    #[test]
    fn test_trend_timeline_falls_back_to_config() {
        let config = EngineConfig {
            default_timeline: Some("month".to_string()),
            ..EngineConfig::default()
        };
        let request = AggregationRequest::new("statistic_trend");
        let options = TrendOptions::parse(&input(WidgetType::StatisticTrend, &request, &config)).unwrap();
        assert_eq!(options.timeline, Some(GroupingPeriod::Month));
    }

    #[test]
    fn test_trend_timeline_rejects_name() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("cases_trend").with_option(TIMELINE, "name");
        let err = TrendOptions::parse(&input(WidgetType::CasesTrend, &request, &config)).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidOptionValue { .. }));
    }

    #[test]
    fn test_interval_required() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("launches_quantity");
        let err = IntervalOptions::parse(&input(WidgetType::LaunchesQuantity, &request, &config)).unwrap_err();
        assert!(matches!(
            err,
            WidgetError::MissingRequiredOption { ref option, .. } if option == INTERVAL
        ));

        let request = request.with_option(INTERVAL, "fortnight");
        let err = IntervalOptions::parse(&input(WidgetType::LaunchesQuantity, &request, &config)).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidOptionValue { .. }));
    }

    #[test]
    fn test_blank_option_counts_as_missing() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("cumulative_trend").with_option(PREFIX, "  ");
        let err = CumulativeOptions::parse(&input(WidgetType::CumulativeTrend, &request, &config)).unwrap_err();
        assert!(matches!(err, WidgetError::MissingRequiredOption { .. }));
    }

    // =========================================================================
    // Field tests
    // =========================================================================

    #[test]
    fn test_content_fields_normalized() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("statistic_trend")
            .with_content_fields(["statistics$executions$total", "issueCounter.productBug"]);
        let fields = content_fields(&input(WidgetType::StatisticTrend, &request, &config), true).unwrap();
        assert_eq!(fields, vec!["executions.total", "issueCounter.productBug"]);
    }

    #[test]
    fn test_content_fields_required_and_validated() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("overall_statistics");
        let err = content_fields(&input(WidgetType::OverallStatistics, &request, &config), true).unwrap_err();
        assert!(matches!(err, WidgetError::MissingContentFields { .. }));
        assert!(content_fields(&input(WidgetType::OverallStatistics, &request, &config), false)
            .unwrap()
            .is_empty());

        let request = request.with_content_fields(["not a field!"]);
        let err = content_fields(&input(WidgetType::OverallStatistics, &request, &config), false).unwrap_err();
        assert!(matches!(err, WidgetError::MissingContentFields { .. }));
    }

    #[test]
    fn test_time_consuming_options() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("most_time_consuming");
        let err = TimeConsumingOptions::parse(&input(WidgetType::MostTimeConsumingTestCases, &request, &config))
            .unwrap_err();
        assert!(matches!(err, WidgetError::MissingRequiredOption { .. }));

        let request = request.with_option(LAUNCH_NAME_FILTER, "Nightly");
        let options =
            TimeConsumingOptions::parse(&input(WidgetType::MostTimeConsumingTestCases, &request, &config)).unwrap();
        assert_eq!(options.launch_name_filter, "Nightly");
        assert!(!options.include_methods);

        let request = request.with_option(INCLUDE_METHODS, "TRUE");
        let options =
            TimeConsumingOptions::parse(&input(WidgetType::MostTimeConsumingTestCases, &request, &config)).unwrap();
        assert!(options.include_methods);
    }

    #[test]
    fn test_metadata_required() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("cases_trend");
        assert!(require_metadata(&input(WidgetType::CasesTrend, &request, &config)).is_err());
        let request = request.with_metadata_fields(["name"]);
        assert!(require_metadata(&input(WidgetType::CasesTrend, &request, &config)).is_ok());
    }
}
