//! Launches comparison chart.

use super::StrategyInput;
use crate::aggregation::ratio::comparison_breakdown;
use crate::content::{ChartObject, WidgetContent};
use crate::error::Result;
use crate::record::RawRecord;

/// Percentage breakdown of the newest runs, oldest first.
///
/// The number of runs compared comes from `comparisonQuantity` in the
/// engine config.
///
/// # Errors
///
/// Never fails; the signature matches the registry.
pub fn launches_comparison(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let mut newest: Vec<&RawRecord> = input.records.iter().collect();
    newest.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    newest.truncate(input.config.comparison_quantity);
    newest.reverse();

    let series = newest
        .into_iter()
        .map(|record| ChartObject {
            values: comparison_breakdown(record),
            ..ChartObject::for_record(record)
        })
        .collect();
    Ok(WidgetContent::result(series))
}
