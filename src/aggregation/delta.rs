//! Period-over-period deltas of a total field.
//!
//! A series is ordered the way it was fetched. For every point `i`,
//! `delta[i] = total[i] - total[i + 1]`; the tail point has delta 0.

use crate::content::ChartObject;
use crate::request::SortDirection;

/// Output key of the delta value.
pub const DELTA: &str = "delta";

/// Compute deltas of `totals` for a series fetched in `direction`.
///
/// Ascending series are scanned from the tail backward, descending series
/// from the head forward. Both compare a point with its successor in the
/// series, which for descending input is the chronologically previous one.
///
/// ```
/// use widget_stats::aggregation::delta::deltas;
/// use widget_stats::request::SortDirection;
///
/// assert_eq!(deltas(&[10, 7, 7, 2], SortDirection::Desc), vec![3, 0, 5, 0]);
/// assert_eq!(deltas(&[2, 7, 7, 10], SortDirection::Asc), vec![-5, 0, -3, 0]);
/// assert!(deltas(&[], SortDirection::Asc).is_empty());
/// ```
#[must_use]
pub fn deltas(totals: &[i64], direction: SortDirection) -> Vec<i64> {
    let n = totals.len();
    let mut out = vec![0; n];
    if n < 2 {
        return out;
    }

    if direction.is_ascending() {
        let mut previous = totals[n - 1];
        for i in (0..n - 1).rev() {
            out[i] = totals[i] - previous;
            previous = totals[i];
        }
    } else {
        for i in 0..n - 1 {
            out[i] = totals[i] - totals[i + 1];
        }
    }
    out
}

/// Deltas of chronologically keyed timeline points.
///
/// Ascending requests keep the fetch-order formula. Otherwise each point is
/// compared with the point before it and the oldest point has delta 0.
///
/// ```
/// use widget_stats::aggregation::delta::timeline_deltas;
/// use widget_stats::request::SortDirection;
///
/// assert_eq!(timeline_deltas(&[9, 0, 6], SortDirection::Desc), vec![0, -9, 6]);
/// assert_eq!(timeline_deltas(&[9, 0, 6], SortDirection::Asc), vec![9, -6, 0]);
/// ```
#[must_use]
pub fn timeline_deltas(totals: &[i64], direction: SortDirection) -> Vec<i64> {
    if direction.is_ascending() {
        return deltas(totals, direction);
    }
    if totals.is_empty() {
        return Vec::new();
    }
    std::iter::once(0)
        .chain(totals.windows(2).map(|pair| pair[1] - pair[0]))
        .collect()
}

fn write_deltas(series: &mut [ChartObject], deltas: Vec<i64>) {
    for (object, delta) in series.iter_mut().zip(deltas) {
        object.set(DELTA, delta.to_string());
    }
}

/// Annotate a series of chart objects with a `delta` value computed from
/// the integer value under `total_key`.
pub fn annotate(series: &mut [ChartObject], total_key: &str, direction: SortDirection) {
    let totals: Vec<i64> = series.iter().map(|o| o.int_value(total_key)).collect();
    write_deltas(series, deltas(&totals, direction));
}

/// Annotate chronologically keyed timeline points with `delta` values.
pub fn annotate_timeline(series: &mut [ChartObject], total_key: &str, direction: SortDirection) {
    let totals: Vec<i64> = series.iter().map(|o| o.int_value(total_key)).collect();
    write_deltas(series, timeline_deltas(&totals, direction));
}
