//! Pure aggregation helpers shared by the widget strategies.
//!
//! - [`period`]: grouping periods and their key/step rules
//! - [`bucket`]: contiguous, gap-filled time buckets
//! - [`grouping`]: day / ISO week / month / name / attribute groupers
//! - [`ratio`]: percentages with defined zero-division behavior
//! - [`delta`]: direction-aware period-over-period deltas
//! - [`history`]: flakiness and most-failed rankings
//!
//! Nothing here mutates its input or keeps state between calls.

pub mod bucket;
pub mod delta;
pub mod grouping;
pub mod history;
pub mod period;
pub mod ratio;

pub use bucket::{bucket, max_by_date, Bucket};
pub use delta::deltas;
pub use grouping::{group_by_attribute, group_by_date, group_by_name};
pub use history::{
    rank_flaky, rank_most_failed, rank_most_time_consuming, FlakyItem, MostFailedItem,
    TimeConsumingItem,
};
pub use period::GroupingPeriod;
