//! Flaky, most-failed and most time consuming test case rankings.
//!
//! Records here are test items, each carrying its status history across the
//! runs of one launch.

use super::options::{content_fields, HistoryOptions, TimeConsumingOptions};
use super::StrategyInput;
use crate::aggregation::history::{
    criteria_status, criteria_statuses, last_launch_object, LAST_LAUNCH, MOST_FAILED,
};
use crate::aggregation::{rank_flaky, rank_most_failed, rank_most_time_consuming};
use crate::content::WidgetContent;
use crate::error::Result;
use crate::record::LaunchRef;
use tracing::debug;

/// Reference run the ranking is labelled with.
fn reference_launch(input: &StrategyInput<'_>, options: &HistoryOptions) -> LaunchRef {
    input
        .request
        .reference_launch
        .clone()
        .unwrap_or_else(|| LaunchRef::named(options.launch_name_filter.clone()))
}

/// Items ranked by status switches, one group per item id, plus the
/// reserved `lastLaunch` entry.
///
/// Items sharing a display name stay separate. An item whose id is
/// `lastLaunch` is shadowed by the reserved entry.
///
/// # Errors
///
/// Fails without a `launchNameFilter` option.
pub fn flaky_test_cases(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let options = HistoryOptions::parse(input)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let mut content = WidgetContent::new();
    for item in rank_flaky(input.records, input.config.history_top_n) {
        content.push(item.unique_id.clone(), item.to_chart_object());
    }
    content.insert(LAST_LAUNCH, vec![last_launch_object(&reference_launch(input, &options))]);
    debug!(
        "Flaky ranking for '{}' has {} items",
        options.launch_name_filter,
        content.len() - 1
    );
    Ok(content)
}

/// Items ranked by how often they reported the criteria status, plus the
/// reserved `lastLaunch` entry.
///
/// The first content field, if any, names the criteria counter.
///
/// # Errors
///
/// Fails without a `launchNameFilter` option or on a malformed content field.
pub fn most_failed_test_cases(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let options = HistoryOptions::parse(input)?;
    let criteria = content_fields(input, false)?.into_iter().next();
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let status = criteria_status(criteria.as_deref());
    let items = rank_most_failed(input.records, &status, input.config.history_top_n);
    debug!(
        "Most failed ranking for '{}' by {} has {} items",
        options.launch_name_filter,
        status,
        items.len()
    );

    let mut content = WidgetContent::new();
    content.insert(MOST_FAILED, items.iter().map(|i| i.to_chart_object()).collect());
    content.insert(LAST_LAUNCH, vec![last_launch_object(&reference_launch(input, &options))]);
    Ok(content)
}

/// Finished items of the launch ranked by duration, longest first, under
/// `result`.
///
/// Content fields naming a status (`statistics$executions$failed`) restrict
/// the ranking to items with that final status.
///
/// # Errors
///
/// Fails without a `launchNameFilter` option or on a malformed content field.
pub fn most_time_consuming(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    let options = TimeConsumingOptions::parse(input)?;
    let statuses = criteria_statuses(&content_fields(input, false)?);
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let items = rank_most_time_consuming(
        input.records,
        &statuses,
        options.include_methods,
        input.config.history_top_n,
    );
    debug!(
        "Time consuming ranking for '{}' has {} items",
        options.launch_name_filter,
        items.len()
    );
    Ok(WidgetContent::result(
        items.iter().map(|i| i.to_chart_object()).collect(),
    ))
}
