//! Counter field names and the statistics extractor.
//!
//! Counters are stored under dotted internal names (`executions.failed`).
//! Consumers may spell the same field with `$` separators and an optional
//! `statistics` prefix (`statistics$executions$failed`); [`internal_field`]
//! and [`ui_field`] convert between the two spellings.

use super::RawRecord;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::warn;

pub const EXECUTIONS_TOTAL: &str = "executions.total";
pub const EXECUTIONS_PASSED: &str = "executions.passed";
pub const EXECUTIONS_FAILED: &str = "executions.failed";
pub const EXECUTIONS_SKIPPED: &str = "executions.skipped";

pub const ISSUE_PRODUCT_BUG: &str = "issueCounter.productBug";
pub const ISSUE_SYSTEM_ISSUE: &str = "issueCounter.systemIssue";
pub const ISSUE_AUTOMATION_BUG: &str = "issueCounter.automationBug";
pub const ISSUE_TO_INVESTIGATE: &str = "issueCounter.toInvestigate";
pub const ISSUE_NO_DEFECT: &str = "issueCounter.noDefect";

/// Execution counters in display order.
pub const EXECUTION_FIELDS: [&str; 4] = [
    EXECUTIONS_TOTAL,
    EXECUTIONS_PASSED,
    EXECUTIONS_FAILED,
    EXECUTIONS_SKIPPED,
];

/// Defect counters in display order.
pub const DEFECT_FIELDS: [&str; 5] = [
    ISSUE_PRODUCT_BUG,
    ISSUE_AUTOMATION_BUG,
    ISSUE_SYSTEM_ISSUE,
    ISSUE_NO_DEFECT,
    ISSUE_TO_INVESTIGATE,
];

const STATISTICS_PREFIX: &str = "statistics.";

fn field_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            // Segments of letters/digits/underscores separated by '.' or '$'.
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*([.$][A-Za-z_][A-Za-z0-9_]*)*$").ok()
        })
        .as_ref()
}

/// Whether `field` is a well-formed counter field name in either spelling.
#[must_use]
pub fn is_valid_field(field: &str) -> bool {
    field_pattern().is_some_and(|re| re.is_match(field))
}

/// Normalize a consumer field name to the internal dotted spelling.
///
/// ```
/// use widget_stats::record::internal_field;
///
/// assert_eq!(internal_field("statistics$executions$failed"), "executions.failed");
/// assert_eq!(internal_field("issueCounter.productBug"), "issueCounter.productBug");
/// ```
#[must_use]
pub fn internal_field(field: &str) -> String {
    let dotted = field.replace('$', ".");
    match dotted.strip_prefix(STATISTICS_PREFIX) {
        Some(rest) => rest.to_string(),
        None => dotted,
    }
}

/// Convert an internal field name to the `$`-separated consumer spelling.
#[must_use]
pub fn ui_field(field: &str) -> String {
    field.replace('.', "$")
}

/// Read a counter out of a record's counter set, 0 when absent.
///
/// Negative stored values are treated as corrupt and read as 0.
#[must_use]
pub fn extract(record: &RawRecord, field: &str) -> i64 {
    let value = match record.counters.get(field) {
        Some(v) => *v,
        None => match record.counters.get(&internal_field(field)) {
            Some(v) => *v,
            None => return 0,
        },
    };
    if value < 0 {
        warn!(
            "Record '{}' has negative counter {}={}, reading as 0",
            record.id, field, value
        );
        return 0;
    }
    value
}

/// Anything counters can be read from: a record or a folded bucket.
pub trait CounterSet {
    /// Counter value, 0 when absent.
    fn count(&self, field: &str) -> i64;

    /// Sum of several counters.
    fn sum(&self, fields: &[&str]) -> i64 {
        fields.iter().map(|f| self.count(f)).sum()
    }
}

impl CounterSet for RawRecord {
    fn count(&self, field: &str) -> i64 {
        extract(self, field)
    }
}

impl CounterSet for BTreeMap<String, i64> {
    fn count(&self, field: &str) -> i64 {
        self.get(field)
            .or_else(|| self.get(&internal_field(field)))
            .copied()
            .unwrap_or(0)
    }
}
