//! widget-stats - Widget statistics aggregation engine
//!
//! Turns batches of test-run records into chart-ready datasets for
//! test-reporting dashboards: investigated and not-passed trends, launch
//! comparisons, gap-filled time buckets, cumulative attribute trends, and
//! flaky / most-failed rankings built from per-item status histories.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`record`] - Raw records, counter fields and the record fetch boundary
//! - [`request`] - Aggregation requests and sort order
//! - [`aggregation`] - Bucketing, grouping, ratios, deltas and history rankings
//! - [`widgets`] - Per-widget strategies and the dispatch registry
//! - [`assembler`] - Field renaming and presentation order
//! - [`content`] - Chart-ready output structures
//! - [`report`] - JSON and Markdown rendering
//! - [`config`] - Engine configuration and its inheritance chain
//! - [`error`] - Custom error types
//! - [`testing`] - Fixtures, mocks and assertions
//!
//! # Example
//!
//! ```
//! use widget_stats::config::EngineConfig;
//! use widget_stats::request::AggregationRequest;
//! use widget_stats::testing::{at, run_with_executions};
//! use widget_stats::widgets::Registry;
//!
//! let request = AggregationRequest::new("not_passed").with_records(vec![
//!     run_with_executions("2", "Smoke", at(2024, 1, 2), 8, 0, 0),
//!     run_with_executions("1", "Smoke", at(2024, 1, 1), 7, 2, 1),
//! ]);
//!
//! let content = Registry::standard()
//!     .dispatch(&request, &EngineConfig::default())
//!     .unwrap();
//!
//! // Newest-first input is reversed into chronological order.
//! let series = content.get("result").unwrap();
//! assert_eq!(series[0].value("notPassed"), Some("30.00"));
//! assert_eq!(series[1].value("notPassed"), Some("0"));
//! ```

pub mod aggregation;
pub mod assembler;
pub mod config;
pub mod content;
pub mod error;
pub mod record;
pub mod report;
pub mod request;
pub mod testing;
pub mod widgets;

// Re-export commonly used types
pub use error::{Result, WidgetError};

pub use config::{ConfigLoader, EngineConfig};
pub use content::{ChartObject, WidgetContent};
pub use record::{LaunchRef, RawRecord, RecordQuery, RecordSource, StatusEntry};
pub use report::{ReportFormat, WidgetReport};
pub use request::{AggregationRequest, SortDirection, SortOrder};
pub use widgets::{Registry, StrategyInput, WidgetType};

// Re-export aggregation helpers
pub use aggregation::{
    bucket, deltas, group_by_attribute, group_by_date, group_by_name, max_by_date, rank_flaky,
    rank_most_failed, rank_most_time_consuming, Bucket, FlakyItem, GroupingPeriod, MostFailedItem,
    TimeConsumingItem,
};
