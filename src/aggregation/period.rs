//! Grouping periods.

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// How records are grouped into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupingPeriod {
    /// One bucket per calendar day.
    Day,
    /// Day-keyed buckets. The cursor advances one day at a time.
    Week,
    /// One bucket per calendar month.
    Month,
    /// One bucket per record display name, no gap-filling.
    ByName,
}

impl GroupingPeriod {
    /// Whether this period produces a date-keyed, gap-filled range.
    #[must_use]
    pub fn is_temporal(self) -> bool {
        !matches!(self, Self::ByName)
    }

    /// Bucket key for a date. `ByName` has no date key.
    #[must_use]
    pub fn date_key(self, date: NaiveDate) -> Option<String> {
        match self {
            Self::Day | Self::Week => Some(date.format("%Y-%m-%d").to_string()),
            Self::Month => Some(date.format("%Y-%m").to_string()),
            Self::ByName => None,
        }
    }

    /// First cursor position of a range starting at `date`.
    #[must_use]
    pub fn range_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Month => date.with_day(1).unwrap_or(date),
            _ => date,
        }
    }

    /// Advance the range cursor by one step.
    #[must_use]
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day | Self::Week => date.succ_opt(),
            Self::Month => date.checked_add_months(Months::new(1)),
            Self::ByName => None,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::ByName => "name",
        }
    }
}

impl FromStr for GroupingPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" => Ok(Self::Day),
            "week" | "weeks" => Ok(Self::Week),
            "month" | "months" => Ok(Self::Month),
            "name" | "by_name" => Ok(Self::ByName),
            _ => Err(anyhow::anyhow!(
                "Invalid grouping period: {}. Valid periods: day, week, month, name",
                s
            )),
        }
    }
}

impl fmt::Display for GroupingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("DAY".parse::<GroupingPeriod>().unwrap(), GroupingPeriod::Day);
        assert_eq!("Week".parse::<GroupingPeriod>().unwrap(), GroupingPeriod::Week);
        assert_eq!("month".parse::<GroupingPeriod>().unwrap(), GroupingPeriod::Month);
        assert_eq!("by_name".parse::<GroupingPeriod>().unwrap(), GroupingPeriod::ByName);
        assert!("fortnight".parse::<GroupingPeriod>().is_err());
    }

    #[test]
    fn test_date_keys() {
        let d = date(2024, 3, 9);
        assert_eq!(GroupingPeriod::Day.date_key(d).unwrap(), "2024-03-09");
        assert_eq!(GroupingPeriod::Week.date_key(d).unwrap(), "2024-03-09");
        assert_eq!(GroupingPeriod::Month.date_key(d).unwrap(), "2024-03");
        assert!(GroupingPeriod::ByName.date_key(d).is_none());
    }

    #[test]
    fn test_week_advances_one_day() {
        let d = date(2024, 1, 31);
        assert_eq!(GroupingPeriod::Week.advance(d), Some(date(2024, 2, 1)));
        assert_eq!(GroupingPeriod::Day.advance(d), Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_month_range_start_and_advance() {
        let start = GroupingPeriod::Month.range_start(date(2024, 1, 31));
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(GroupingPeriod::Month.advance(start), Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_by_name_is_not_temporal() {
        assert!(!GroupingPeriod::ByName.is_temporal());
        assert!(GroupingPeriod::Month.is_temporal());
        assert!(GroupingPeriod::ByName.advance(date(2024, 1, 1)).is_none());
    }
}
