//! Widget type to strategy registry.

use super::{
    cases_trend, comparison, cumulative, health_check, history, investigated, project_info,
    statistics, StrategyInput, WidgetType,
};
use crate::assembler;
use crate::config::EngineConfig;
use crate::content::WidgetContent;
use crate::error::{Result, WidgetError};
use crate::request::AggregationRequest;
use std::collections::BTreeMap;
use tracing::debug;

/// A strategy computing one widget's content.
pub type Strategy = fn(&StrategyInput<'_>) -> Result<WidgetContent>;

/// Maps widget types to strategies.
///
/// Built once and passed explicitly; holds only function pointers, so a
/// registry can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    strategies: BTreeMap<WidgetType, Strategy>,
}

impl Registry {
    /// Registry with no strategies.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in widget.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with(WidgetType::StatisticTrend, statistics::statistic_trend)
            .with(WidgetType::LaunchStatistics, statistics::launch_statistics)
            .with(WidgetType::InvestigatedTrend, investigated::investigated_trend)
            .with(WidgetType::NotPassed, investigated::not_passed)
            .with(WidgetType::CasesTrend, cases_trend::cases_trend)
            .with(WidgetType::LaunchesComparison, comparison::launches_comparison)
            .with(WidgetType::LaunchesDuration, statistics::launches_duration)
            .with(WidgetType::PassingRateSummary, statistics::passing_rate_summary)
            .with(WidgetType::OverallStatistics, statistics::overall_statistics)
            .with(WidgetType::LaunchesQuantity, project_info::launches_quantity)
            .with(WidgetType::LaunchesIssues, project_info::launches_issues)
            .with(WidgetType::UniqueLaunches, project_info::unique_launches)
            .with(WidgetType::CumulativeTrend, cumulative::cumulative_trend)
            .with(WidgetType::HealthCheckTable, health_check::health_check_table)
            .with(WidgetType::FlakyTestCases, history::flaky_test_cases)
            .with(WidgetType::MostFailedTestCases, history::most_failed_test_cases)
            .with(WidgetType::MostTimeConsumingTestCases, history::most_time_consuming)
    }

    /// Register a strategy, replacing any previous one for the same widget.
    #[must_use]
    pub fn with(mut self, widget: WidgetType, strategy: Strategy) -> Self {
        self.strategies.insert(widget, strategy);
        self
    }

    /// Registered widget types.
    pub fn widget_types(&self) -> impl Iterator<Item = WidgetType> + '_ {
        self.strategies.keys().copied()
    }

    /// Whether a widget has a strategy.
    #[must_use]
    pub fn contains(&self, widget: WidgetType) -> bool {
        self.strategies.contains_key(&widget)
    }

    /// Compute the content of a request.
    ///
    /// The widget key is resolved before any record is looked at. The
    /// strategy validates its options and fields, computes over the batch
    /// limited to `quantity`, and the result is assembled for presentation.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::UnknownWidgetType`] for an unregistered key, or
    /// the strategy's validation error.
    pub fn dispatch(&self, request: &AggregationRequest, config: &EngineConfig) -> Result<WidgetContent> {
        let widget: WidgetType = request.widget_type.parse()?;
        let strategy = self
            .strategies
            .get(&widget)
            .ok_or_else(|| WidgetError::unknown_widget(&request.widget_type))?;

        let input = StrategyInput::new(widget, request, config);
        debug!(
            "Dispatching {} records to {}",
            input.records.len(),
            widget
        );
        let content = strategy(&input)?;
        Ok(assembler::assemble(widget, content, request, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EXECUTIONS_TOTAL;
    use crate::testing::fixtures::{at, run};

    #[test]
    fn test_standard_registers_every_widget() {
        let registry = Registry::standard();
        for widget in WidgetType::ALL {
            assert!(registry.contains(widget), "{widget} not registered");
        }
        assert_eq!(registry.widget_types().count(), WidgetType::ALL.len());
    }

    #[test]
    fn test_unknown_widget_before_records() {
        let request = AggregationRequest::new("does_not_exist")
            .with_records(vec![run("1", "a", at(2024, 1, 1)).with_counter(EXECUTIONS_TOTAL, -5)]);
        let err = Registry::standard()
            .dispatch(&request, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, WidgetError::UnknownWidgetType { ref key } if key == "does_not_exist"));
    }

    #[test]
    fn test_unregistered_widget_in_custom_registry() {
        let registry = Registry::empty().with(WidgetType::NotPassed, investigated::not_passed);
        let request = AggregationRequest::new("cases_trend");
        let err = registry.dispatch(&request, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, WidgetError::UnknownWidgetType { .. }));
    }

    #[test]
    fn test_validation_precedes_empty_short_circuit() {
        let request = AggregationRequest::new("launches_quantity");
        let err = Registry::standard()
            .dispatch(&request, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, WidgetError::MissingRequiredOption { .. }));
    }

    #[test]
    fn test_dispatch_respects_quantity() {
        let records = (1..=5)
            .map(|d| run(&d.to_string(), "a", at(2024, 1, d)))
            .collect();
        let request = AggregationRequest::new("not_passed")
            .with_records(records)
            .with_quantity(2);
        let content = Registry::standard()
            .dispatch(&request, &EngineConfig::default())
            .unwrap();
        assert_eq!(content.get("result").unwrap().len(), 2);
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
