//! Ratio and percentage computation.
//!
//! Division by zero is defined behavior everywhere in this module: a zero
//! denominator yields `"0"` (or `"0.00"` for the comparison breakdown).

use crate::record::{
    CounterSet, EXECUTIONS_FAILED, EXECUTIONS_PASSED, EXECUTIONS_SKIPPED, EXECUTIONS_TOTAL,
    ISSUE_AUTOMATION_BUG, ISSUE_NO_DEFECT, ISSUE_PRODUCT_BUG, ISSUE_SYSTEM_ISSUE,
    ISSUE_TO_INVESTIGATE,
};
use std::collections::BTreeMap;

/// Output key of the investigated share.
pub const INVESTIGATED: &str = "investigated";
/// Output key of the to-investigate share.
pub const TO_INVESTIGATE: &str = "toInvestigate";
/// Output key of the not-passed share.
pub const NOT_PASSED: &str = "notPassed";
/// Output key of the passing rate.
pub const PASSING_RATE: &str = "passingRate";

/// Format a value with two decimals.
#[must_use]
pub fn format_two(value: f64) -> String {
    format!("{value:.2}")
}

/// Format a value with at most two decimals, dropping trailing zeros.
///
/// ```
/// use widget_stats::aggregation::ratio::format_compact;
///
/// assert_eq!(format_compact(12.5), "12.5");
/// assert_eq!(format_compact(3.0), "3");
/// assert_eq!(format_compact(2.0 / 3.0), "0.67");
/// ```
#[must_use]
pub fn format_compact(value: f64) -> String {
    let fixed = format_two(value);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn share(numerator: i64, denominator: i64) -> f64 {
    numerator as f64 / denominator as f64 * 100.0
}

/// Percentage of `numerator` in `denominator`, two decimals.
///
/// Returns `"0"` when the denominator is 0.
///
/// ```
/// use widget_stats::aggregation::ratio::percentage;
///
/// assert_eq!(percentage(3, 10), "30.00");
/// assert_eq!(percentage(5, 0), "0");
/// ```
#[must_use]
pub fn percentage(numerator: i64, denominator: i64) -> String {
    if denominator == 0 {
        return "0".to_string();
    }
    format_two(share(numerator, denominator))
}

/// Investigated and to-investigate shares of the defect-relevant count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestigatedShare {
    pub investigated: String,
    pub to_investigate: String,
}

impl InvestigatedShare {
    /// Insert both shares into a values map.
    pub fn write_into(self, values: &mut BTreeMap<String, String>) {
        values.insert(INVESTIGATED.to_string(), self.investigated);
        values.insert(TO_INVESTIGATE.to_string(), self.to_investigate);
    }
}

/// Investigated % = (productBug + systemIssue + automationBug) over that sum
/// plus toInvestigate. To-investigate % is the complement to 100, so the
/// formatted pair always sums to exactly 100.
#[must_use]
pub fn investigated<C: CounterSet + ?Sized>(counters: &C) -> InvestigatedShare {
    let investigated = counters.sum(&[ISSUE_PRODUCT_BUG, ISSUE_SYSTEM_ISSUE, ISSUE_AUTOMATION_BUG]);
    let to_investigate = counters.count(ISSUE_TO_INVESTIGATE);
    let relevant = investigated + to_investigate;
    if relevant == 0 {
        return InvestigatedShare {
            investigated: "0".to_string(),
            to_investigate: "0".to_string(),
        };
    }
    let investigated_pct = round_two(share(investigated, relevant));
    InvestigatedShare {
        investigated: format_two(investigated_pct),
        to_investigate: format_two(100.0 - investigated_pct),
    }
}

/// Not-passed % = (failed + skipped) / total.
///
/// A run with nothing failed or skipped reads `"0"`, like an empty one.
#[must_use]
pub fn not_passed<C: CounterSet + ?Sized>(counters: &C) -> String {
    let not_passed = counters.sum(&[EXECUTIONS_FAILED, EXECUTIONS_SKIPPED]);
    if not_passed == 0 {
        return "0".to_string();
    }
    percentage(not_passed, counters.count(EXECUTIONS_TOTAL))
}

/// Percentage breakdown used by the launches comparison chart.
///
/// Execution shares are relative to the total, with passed as the remainder.
/// Defect shares are relative to the sum of the five defect counters, with
/// automationBug as the remainder. The raw total is carried alongside as a
/// count. Values are keyed by internal field name.
#[must_use]
pub fn comparison_breakdown<C: CounterSet + ?Sized>(counters: &C) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();

    let total = counters.count(EXECUTIONS_TOTAL);
    values.insert(EXECUTIONS_TOTAL.to_string(), total.to_string());
    if total == 0 {
        for field in [EXECUTIONS_PASSED, EXECUTIONS_FAILED, EXECUTIONS_SKIPPED] {
            values.insert(field.to_string(), format_two(0.0));
        }
    } else {
        let failed = round_two(share(counters.count(EXECUTIONS_FAILED), total));
        let skipped = round_two(share(counters.count(EXECUTIONS_SKIPPED), total));
        values.insert(EXECUTIONS_FAILED.to_string(), format_two(failed));
        values.insert(EXECUTIONS_SKIPPED.to_string(), format_two(skipped));
        values.insert(
            EXECUTIONS_PASSED.to_string(),
            format_two(100.0 - failed - skipped),
        );
    }

    let defects = counters.sum(&[
        ISSUE_TO_INVESTIGATE,
        ISSUE_PRODUCT_BUG,
        ISSUE_SYSTEM_ISSUE,
        ISSUE_AUTOMATION_BUG,
        ISSUE_NO_DEFECT,
    ]);
    if defects == 0 {
        for field in [
            ISSUE_TO_INVESTIGATE,
            ISSUE_PRODUCT_BUG,
            ISSUE_SYSTEM_ISSUE,
            ISSUE_AUTOMATION_BUG,
            ISSUE_NO_DEFECT,
        ] {
            values.insert(field.to_string(), format_two(0.0));
        }
    } else {
        let mut assigned = 0.0;
        for field in [ISSUE_TO_INVESTIGATE, ISSUE_PRODUCT_BUG, ISSUE_SYSTEM_ISSUE, ISSUE_NO_DEFECT] {
            let pct = round_two(share(counters.count(field), defects));
            assigned += pct;
            values.insert(field.to_string(), format_two(pct));
        }
        values.insert(
            ISSUE_AUTOMATION_BUG.to_string(),
            format_two((100.0 - assigned).max(0.0)),
        );
    }

    values
}

/// Passing rate rounded half-up to two decimals, 0 when total is 0.
///
/// ```
/// use widget_stats::aggregation::ratio::passing_rate;
///
/// assert_eq!(passing_rate(2, 3), 66.67);
/// assert_eq!(passing_rate(1, 8), 12.5);
/// assert_eq!(passing_rate(0, 0), 0.0);
/// ```
#[must_use]
pub fn passing_rate(passed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    // Hundredths of a percent, rounded half-up in integer arithmetic.
    let scaled = (i128::from(passed) * 20_000 + i128::from(total)) / (2 * i128::from(total));
    scaled as f64 / 100.0
}
