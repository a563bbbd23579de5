//! Widget strategies and their registry.
//!
//! Every dashboard widget is a [`WidgetType`] with one strategy function.
//! A strategy parses its typed options first, so a bad request fails before
//! any record is looked at, then computes its content from the batch.
//!
//! # Example
//!
//! ```
//! use widget_stats::config::EngineConfig;
//! use widget_stats::request::AggregationRequest;
//! use widget_stats::widgets::Registry;
//!
//! let registry = Registry::standard();
//! let request = AggregationRequest::new("not_passed");
//! let content = registry.dispatch(&request, &EngineConfig::default()).unwrap();
//! assert!(content.is_empty());
//! ```

pub mod cases_trend;
pub mod comparison;
pub mod cumulative;
pub mod health_check;
pub mod history;
pub mod investigated;
pub mod options;
pub mod project_info;
pub mod registry;
pub mod statistics;

pub use registry::{Registry, Strategy};

use crate::config::EngineConfig;
use crate::error::WidgetError;
use crate::record::RawRecord;
use crate::request::AggregationRequest;
use std::fmt;
use std::str::FromStr;

/// Every widget the engine knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidgetType {
    StatisticTrend,
    LaunchStatistics,
    InvestigatedTrend,
    NotPassed,
    CasesTrend,
    LaunchesComparison,
    LaunchesDuration,
    PassingRateSummary,
    OverallStatistics,
    LaunchesQuantity,
    LaunchesIssues,
    UniqueLaunches,
    CumulativeTrend,
    HealthCheckTable,
    FlakyTestCases,
    MostFailedTestCases,
    MostTimeConsumingTestCases,
}

impl WidgetType {
    /// All widget types in registry order.
    pub const ALL: [WidgetType; 17] = [
        Self::StatisticTrend,
        Self::LaunchStatistics,
        Self::InvestigatedTrend,
        Self::NotPassed,
        Self::CasesTrend,
        Self::LaunchesComparison,
        Self::LaunchesDuration,
        Self::PassingRateSummary,
        Self::OverallStatistics,
        Self::LaunchesQuantity,
        Self::LaunchesIssues,
        Self::UniqueLaunches,
        Self::CumulativeTrend,
        Self::HealthCheckTable,
        Self::FlakyTestCases,
        Self::MostFailedTestCases,
        Self::MostTimeConsumingTestCases,
    ];

    /// Request key of this widget.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::StatisticTrend => "statistic_trend",
            Self::LaunchStatistics => "launch_statistics",
            Self::InvestigatedTrend => "investigated_trend",
            Self::NotPassed => "not_passed",
            Self::CasesTrend => "cases_trend",
            Self::LaunchesComparison => "launches_comparison",
            Self::LaunchesDuration => "launches_duration",
            Self::PassingRateSummary => "passing_rate_summary",
            Self::OverallStatistics => "overall_statistics",
            Self::LaunchesQuantity => "launches_quantity",
            Self::LaunchesIssues => "launches_issues",
            Self::UniqueLaunches => "unique_launches",
            Self::CumulativeTrend => "cumulative_trend",
            Self::HealthCheckTable => "health_check_table",
            Self::FlakyTestCases => "flaky_test_cases",
            Self::MostFailedTestCases => "most_failed_test_cases",
            Self::MostTimeConsumingTestCases => "most_time_consuming",
        }
    }

    /// Options the widget cannot be built without.
    #[must_use]
    pub fn required_options(self) -> &'static [&'static str] {
        match self {
            Self::LaunchesQuantity | Self::LaunchesIssues => &[options::INTERVAL],
            Self::CumulativeTrend => &[options::PREFIX],
            Self::HealthCheckTable => &[options::ATTRIBUTE_KEY],
            Self::FlakyTestCases | Self::MostFailedTestCases | Self::MostTimeConsumingTestCases => {
                &[options::LAUNCH_NAME_FILTER]
            }
            _ => &[],
        }
    }

    /// Whether the widget orders its own output, so the presentation
    /// reversal must not touch it.
    #[must_use]
    pub fn manages_own_order(self) -> bool {
        matches!(
            self,
            Self::CumulativeTrend
                | Self::HealthCheckTable
                | Self::LaunchesComparison
                | Self::FlakyTestCases
                | Self::MostFailedTestCases
                | Self::MostTimeConsumingTestCases
        )
    }
}

impl FromStr for WidgetType {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.key() == s)
            .ok_or_else(|| WidgetError::unknown_widget(s))
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Everything a strategy reads.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    pub widget: WidgetType,
    pub request: &'a AggregationRequest,
    /// The request's batch after the quantity limit.
    pub records: &'a [RawRecord],
    pub config: &'a EngineConfig,
}

impl<'a> StrategyInput<'a> {
    /// Input over a request's limited batch.
    #[must_use]
    pub fn new(widget: WidgetType, request: &'a AggregationRequest, config: &'a EngineConfig) -> Self {
        Self {
            widget,
            request,
            records: request.limited_records(),
            config,
        }
    }

    /// Whether there is nothing to aggregate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip_through_from_str() {
        for widget in WidgetType::ALL {
            assert_eq!(widget.key().parse::<WidgetType>().unwrap(), widget);
        }
    }

    #[test]
    fn test_unknown_key() {
        let err = "does_not_exist".parse::<WidgetType>().unwrap_err();
        assert!(matches!(err, WidgetError::UnknownWidgetType { .. }));
    }

    #[test]
    fn test_required_options() {
        assert_eq!(WidgetType::CumulativeTrend.required_options(), &["prefix"]);
        assert_eq!(
            WidgetType::FlakyTestCases.required_options(),
            &["launchNameFilter"]
        );
        assert!(WidgetType::NotPassed.required_options().is_empty());
        assert_eq!(
            WidgetType::MostTimeConsumingTestCases.required_options(),
            &["launchNameFilter"]
        );
        assert_eq!(
            "most_time_consuming".parse::<WidgetType>().unwrap(),
            WidgetType::MostTimeConsumingTestCases
        );
    }

    #[test]
    fn test_order_exempt_widgets() {
        assert!(WidgetType::HealthCheckTable.manages_own_order());
        assert!(WidgetType::MostFailedTestCases.manages_own_order());
        assert!(WidgetType::MostTimeConsumingTestCases.manages_own_order());
        assert!(!WidgetType::CasesTrend.manages_own_order());
        assert!(!WidgetType::StatisticTrend.manages_own_order());
    }
}
