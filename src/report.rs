//! Widget content rendering.
//!
//! This module renders computed widget content as JSON (the wire format
//! dashboards consume) or as Markdown tables for reading in a terminal.

use crate::content::{ChartObject, WidgetContent};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Output format for widget reports.
///
/// # Example
///
/// ```
/// use widget_stats::report::ReportFormat;
///
/// assert_eq!(ReportFormat::Json.extension(), "json");
/// assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON format.
    #[default]
    Json,
    /// Markdown format.
    Markdown,
}

impl ReportFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(anyhow::anyhow!(
                "Invalid report format: {}. Valid formats: json, markdown",
                s
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

/// Computed content of one widget, ready for export.
#[derive(Debug, Clone)]
pub struct WidgetReport {
    /// Widget type key.
    pub widget: String,
    /// Computed content.
    pub content: WidgetContent,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
}

impl WidgetReport {
    /// Create a report generated now.
    #[must_use]
    pub fn new(widget: impl Into<String>, content: WidgetContent) -> Self {
        Self {
            widget: widget.into(),
            content,
            generated_at: Utc::now(),
        }
    }

    /// Export the content as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.content).context("Failed to serialize widget content to JSON")
    }

    /// Export the content as Markdown, one table per group.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# Widget Report: {}\n\n", self.widget));

        if self.content.is_empty() {
            md.push_str("*No content.*\n\n");
        }

        for (key, series) in self.content.iter() {
            md.push_str(&format!("## {}\n\n", key));
            md.push_str(&series_table(series));
            md.push('\n');
        }

        md.push_str("---\n\n");
        md.push_str(&format!(
            "*Generated at {}*\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md
    }

    /// Export the report in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn export(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => self.to_json(),
            ReportFormat::Markdown => Ok(self.to_markdown()),
        }
    }
}

fn series_table(series: &[ChartObject]) -> String {
    let value_keys: BTreeSet<&str> = series
        .iter()
        .flat_map(|o| o.values.keys().map(String::as_str))
        .collect();

    let mut header = vec!["name", "number", "startTime"];
    header.extend(value_keys.iter().copied());

    let mut table = String::new();
    table.push_str(&format!("| {} |\n", header.join(" | ")));
    table.push_str(&format!("|{}\n", "---|".repeat(header.len())));

    for object in series {
        let start = object
            .start_time
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string());
        let mut cells = vec![
            object.name.clone().unwrap_or_default(),
            object.number.map(|n| n.to_string()).unwrap_or_default(),
            start.unwrap_or_default(),
        ];
        cells.extend(
            value_keys
                .iter()
                .map(|key| object.value(key).unwrap_or("").to_string()),
        );
        table.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> WidgetContent {
        let mut content = WidgetContent::new();
        content.push(
            "2024-01-01",
            ChartObject::new()
                .with_name("Smoke")
                .with_value("executions.total", "5"),
        );
        content.push("2024-01-02", ChartObject::new().with_value("executions.total", "0"));
        content
    }

    // ========================================================================
    // ReportFormat Tests
    // ========================================================================

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("markdown".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert!("html".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_report_format_extension() {
        assert_eq!(ReportFormat::Markdown.extension(), "md");
    }

    // ========================================================================
    // WidgetReport Tests
    // ========================================================================

    #[test]
    fn test_json_preserves_group_order() {
        let report = WidgetReport::new("statistic_trend", content());
        let json = report.export(ReportFormat::Json).unwrap();
        let first = json.find("2024-01-01").unwrap();
        let second = json.find("2024-01-02").unwrap();
        assert!(first < second);
        assert!(json.contains("\"executions.total\": \"5\""));
    }

    #[test]
    fn test_markdown_has_table_per_group() {
        let report = WidgetReport::new("statistic_trend", content());
        let md = report.export(ReportFormat::Markdown).unwrap();
        assert!(md.starts_with("# Widget Report: statistic_trend"));
        assert!(md.contains("## 2024-01-01"));
        assert!(md.contains("| name | number | startTime | executions.total |"));
        assert!(md.contains("| Smoke |  |  | 5 |"));
    }

    #[test]
    fn test_markdown_empty_content() {
        let report = WidgetReport::new("not_passed", WidgetContent::new());
        assert!(report.to_markdown().contains("*No content.*"));
    }
}
