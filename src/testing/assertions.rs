//! Custom assertions for widget content.

use crate::content::WidgetContent;
use chrono::{Days, NaiveDate};

/// Assert that the group keys are consecutive `yyyy-MM-dd` days.
///
/// # Panics
///
/// Panics if a key is not a date or a day is skipped.
pub fn assert_contiguous_days(content: &WidgetContent) {
    let dates: Vec<NaiveDate> = content
        .keys()
        .map(|key| {
            NaiveDate::parse_from_str(key, "%Y-%m-%d")
                .unwrap_or_else(|_| panic!("Group key '{}' is not a day", key))
        })
        .collect();
    for pair in dates.windows(2) {
        assert_eq!(
            pair[0].checked_add_days(Days::new(1)),
            Some(pair[1]),
            "Expected {} to follow {}",
            pair[1],
            pair[0]
        );
    }
}

/// Assert that two formatted percentages add up to exactly 100.
///
/// # Panics
///
/// Panics if either value does not parse or the sum is off.
pub fn assert_sums_to_hundred(a: &str, b: &str) {
    let parse = |v: &str| {
        v.parse::<f64>()
            .unwrap_or_else(|_| panic!("'{}' is not a number", v))
    };
    let sum = parse(a) + parse(b);
    assert!(
        (sum - 100.0).abs() < 1e-9,
        "Expected {} + {} to be 100, got {}",
        a,
        b,
        sum
    );
}

/// Assert the number of objects under a group key.
///
/// # Panics
///
/// Panics if the key is absent or the length differs.
pub fn assert_series_len(content: &WidgetContent, key: &str, expected: usize) {
    let series = content
        .get(key)
        .unwrap_or_else(|| panic!("Missing group '{}'", key));
    assert_eq!(
        series.len(),
        expected,
        "Expected {} objects under '{}', got {}",
        expected,
        key,
        series.len()
    );
}
