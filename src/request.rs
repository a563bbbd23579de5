//! Aggregation requests.
//!
//! An [`AggregationRequest`] bundles everything a strategy needs: the
//! already-fetched record batch, the fields the caller wants echoed, the sort
//! order the batch was fetched in, and the raw widget option bag.

use crate::record::{LaunchRef, RawRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sort field that trend widgets treat as chronological.
pub const START_TIME_FIELD: &str = "startTime";

/// Direction of the sort the record batch was fetched with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Whether this is ascending order.
    #[must_use]
    pub fn is_ascending(self) -> bool {
        matches!(self, Self::Asc)
    }
}

impl FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(anyhow::anyhow!(
                "Invalid sort direction: {}. Valid directions: asc, desc",
                s
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Sort order of the record batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    /// Field the batch was sorted by.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::descending(START_TIME_FIELD)
    }
}

impl SortOrder {
    /// Ascending order by `field`.
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending order by `field`.
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Whether this order sorts by the given field.
    ///
    /// Field names compare case-insensitively and ignore `_`, so
    /// `start_time` and `startTime` name the same field.
    #[must_use]
    pub fn is_by(&self, field: &str) -> bool {
        normalize(&self.field) == normalize(field)
    }

    /// Whether this order is ascending by the given field.
    #[must_use]
    pub fn is_ascending_by(&self, field: &str) -> bool {
        self.direction.is_ascending() && self.is_by(field)
    }
}

fn normalize(field: &str) -> String {
    field
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A widget content request.
///
/// # Example
///
/// ```
/// use widget_stats::request::{AggregationRequest, SortOrder};
///
/// let request = AggregationRequest::new("launches_quantity")
///     .with_option("interval", "week")
///     .with_sort(SortOrder::ascending("startTime"));
///
/// assert_eq!(request.option("interval"), Some("week"));
/// assert!(request.records.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRequest {
    /// Widget type key.
    pub widget_type: String,
    /// Filtered, sorted record batch.
    #[serde(default)]
    pub records: Vec<RawRecord>,
    /// Maximum number of records to consider.
    #[serde(default)]
    pub quantity: Option<usize>,
    /// Fields the caller wants in the output values.
    #[serde(default)]
    pub content_fields: Vec<String>,
    /// Additional identity fields the caller wants echoed.
    #[serde(default)]
    pub metadata_fields: Vec<String>,
    /// Sort order the batch was fetched with.
    #[serde(default)]
    pub sort: SortOrder,
    /// Raw widget options.
    #[serde(default)]
    pub options: BTreeMap<String, Vec<String>>,
    /// Run that history rankings are labelled with.
    #[serde(default)]
    pub reference_launch: Option<LaunchRef>,
}

impl AggregationRequest {
    /// Create an empty request for a widget type.
    #[must_use]
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            records: Vec::new(),
            quantity: None,
            content_fields: Vec::new(),
            metadata_fields: Vec::new(),
            sort: SortOrder::default(),
            options: BTreeMap::new(),
            reference_launch: None,
        }
    }

    /// Set the record batch.
    #[must_use]
    pub fn with_records(mut self, records: Vec<RawRecord>) -> Self {
        self.records = records;
        self
    }

    /// Set the quantity limit.
    #[must_use]
    pub fn with_quantity(mut self, quantity: usize) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the content fields.
    #[must_use]
    pub fn with_content_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the metadata fields.
    #[must_use]
    pub fn with_metadata_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Append a value to a widget option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Set the reference launch.
    #[must_use]
    pub fn with_reference_launch(mut self, launch: LaunchRef) -> Self {
        self.reference_launch = Some(launch);
        self
    }

    /// First value of a widget option.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// The record batch, limited to `quantity` when set.
    #[must_use]
    pub fn limited_records(&self) -> &[RawRecord] {
        match self.quantity {
            Some(limit) if limit < self.records.len() => &self.records[..limit],
            _ => &self.records,
        }
    }
}
