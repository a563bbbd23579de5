//! Final shaping of strategy output.
//!
//! Strategies compute with internal dotted counter names and in fetch order.
//! The assembler renames values back to the caller's spelling of each
//! content field and reverses chart series for presentation.

use crate::config::EngineConfig;
use crate::content::WidgetContent;
use crate::record::internal_field;
use crate::request::AggregationRequest;
use crate::widgets::WidgetType;
use tracing::debug;

/// Rename internal value keys to the spelling the caller requested.
///
/// Only content fields whose spelling differs from the internal name are
/// touched.
pub fn rename_fields(content: &mut WidgetContent, content_fields: &[String]) {
    let renames: Vec<(String, &String)> = content_fields
        .iter()
        .map(|field| (internal_field(field), field))
        .filter(|(internal, field)| internal != *field)
        .collect();
    if renames.is_empty() {
        return;
    }

    for series in content.series_mut() {
        for object in series.iter_mut() {
            for (internal, field) in &renames {
                if let Some(value) = object.values.remove(internal) {
                    object.values.insert((*field).clone(), value);
                }
            }
        }
    }
}

/// Whether the widget's series are reversed for presentation.
#[must_use]
pub fn should_reverse(widget: WidgetType, request: &AggregationRequest, config: &EngineConfig) -> bool {
    !widget.manages_own_order() && !request.sort.is_ascending_by(&config.sort_field)
}

/// Produce the final content of a widget.
#[must_use]
pub fn assemble(
    widget: WidgetType,
    mut content: WidgetContent,
    request: &AggregationRequest,
    config: &EngineConfig,
) -> WidgetContent {
    rename_fields(&mut content, &request.content_fields);
    if should_reverse(widget, request, config) {
        for series in content.series_mut() {
            series.reverse();
        }
    }
    debug!("Assembled {} with {} groups", widget, content.len());
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ChartObject;
    use crate::request::SortOrder;

    fn series(ids: &[&str]) -> Vec<ChartObject> {
        ids.iter()
            .map(|id| ChartObject {
                id: Some((*id).to_string()),
                ..ChartObject::default()
            })
            .collect()
    }

    fn ids(content: &WidgetContent) -> Vec<&str> {
        content
            .get("result")
            .unwrap()
            .iter()
            .filter_map(|o| o.id.as_deref())
            .collect()
    }

    // =========================================================================
    // Renaming
    // =========================================================================

    #[test]
    fn test_renames_dollar_spelling() {
        let mut content = WidgetContent::result(vec![ChartObject::new()
            .with_value("executions.total", "4")
            .with_value("delta", "1")]);
        rename_fields(&mut content, &["statistics$executions$total".to_string()]);

        let object = &content.get("result").unwrap()[0];
        assert_eq!(object.value("statistics$executions$total"), Some("4"));
        assert_eq!(object.value("executions.total"), None);
        assert_eq!(object.value("delta"), Some("1"));
    }

    #[test]
    fn test_internal_spelling_untouched() {
        let mut content = WidgetContent::result(vec![ChartObject::new().with_value("executions.total", "4")]);
        rename_fields(&mut content, &["executions.total".to_string()]);
        assert_eq!(content.get("result").unwrap()[0].value("executions.total"), Some("4"));
    }

    // =========================================================================
    // Reversal
    // =========================================================================

    #[test]
    fn test_reverses_descending_trend() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("not_passed");
        let content = assemble(
            WidgetType::NotPassed,
            WidgetContent::result(series(&["3", "2", "1"])),
            &request,
            &config,
        );
        assert_eq!(ids(&content), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_keeps_ascending_start_time_order() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("not_passed").with_sort(SortOrder::ascending("startTime"));
        let content = assemble(
            WidgetType::NotPassed,
            WidgetContent::result(series(&["1", "2", "3"])),
            &request,
            &config,
        );
        assert_eq!(ids(&content), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_ascending_by_other_field_still_reverses() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("not_passed").with_sort(SortOrder::ascending("number"));
        let content = assemble(
            WidgetType::NotPassed,
            WidgetContent::result(series(&["1", "2"])),
            &request,
            &config,
        );
        assert_eq!(ids(&content), vec!["2", "1"]);
    }

    #[test]
    fn test_exempt_widgets_keep_order() {
        let config = EngineConfig::default();
        let request = AggregationRequest::new("launches_comparison");
        let content = assemble(
            WidgetType::LaunchesComparison,
            WidgetContent::result(series(&["old", "new"])),
            &request,
            &config,
        );
        assert_eq!(ids(&content), vec!["old", "new"]);
    }
}
