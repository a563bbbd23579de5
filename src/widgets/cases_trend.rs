//! Test cases growth trend.
//!
//! Each point carries the total case count and its change against the
//! chronologically previous point.

use super::options::{content_fields, require_metadata, TrendOptions};
use super::StrategyInput;
use crate::aggregation::delta::{annotate, annotate_timeline};
use crate::aggregation::max_by_date;
use crate::content::{ChartObject, WidgetContent};
use crate::error::Result;
use crate::record::{CounterSet, EXECUTIONS_TOTAL};
use tracing::debug;

/// Total and delta per record, or per day with the day's largest run.
///
/// The total field is the first content field, `executions.total` when none
/// is given. Timeline points are keyed chronologically: each is compared
/// with the previous point unless the request is sorted ascending.
///
/// # Errors
///
/// Fails without metadata fields, on a malformed content field, or on an
/// invalid `timeline`.
pub fn cases_trend(input: &StrategyInput<'_>) -> Result<WidgetContent> {
    require_metadata(input)?;
    let total_field = content_fields(input, false)?
        .into_iter()
        .next()
        .unwrap_or_else(|| EXECUTIONS_TOTAL.to_string());
    let options = TrendOptions::parse(input)?;
    if input.is_empty() {
        return Ok(WidgetContent::new());
    }

    let Some(period) = options.timeline else {
        let mut series: Vec<ChartObject> = input
            .records
            .iter()
            .map(|record| {
                ChartObject::for_record(record)
                    .with_value(total_field.clone(), record.count(&total_field).to_string())
            })
            .collect();
        annotate(&mut series, &total_field, input.request.sort.direction);
        return Ok(WidgetContent::result(series));
    };

    debug!("Building cases trend over {} timeline", period);
    let points = max_by_date(input.records, period, &total_field);
    let (keys, mut series): (Vec<String>, Vec<ChartObject>) = points
        .into_iter()
        .map(|(key, record)| {
            let object = match record {
                Some(record) => ChartObject::for_record(record)
                    .with_value(total_field.clone(), record.count(&total_field).to_string()),
                None => ChartObject::new().with_value(total_field.clone(), "0"),
            };
            (key, object)
        })
        .unzip();
    annotate_timeline(&mut series, &total_field, input.request.sort.direction);

    let mut content = WidgetContent::new();
    for (key, object) in keys.into_iter().zip(series) {
        content.push(key, object);
    }
    Ok(content)
}
