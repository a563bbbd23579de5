//! Chart-ready output structures.
//!
//! [`WidgetContent`] is the ordered mapping a strategy hands to the
//! dashboard: group key (a date label, a name, or the literal `"result"`)
//! to a list of [`ChartObject`]s. Insertion order is the presentation order
//! and is preserved through serialization.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Group key used by strategies that produce a single flat series.
pub const RESULT_KEY: &str = "result";

/// One point of a chart series.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Start time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Formatted values keyed by output field name.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl ChartObject {
    /// Create an empty chart object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chart object carrying the identity of a record.
    #[must_use]
    pub fn for_record(record: &crate::record::RawRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            start_time: Some(record.start_millis()),
            number: record.number,
            id: Some(record.id.clone()),
            values: BTreeMap::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set a single value.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set a value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read a value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Read a value as an integer, 0 when absent or not an integer.
    #[must_use]
    pub fn int_value(&self, key: &str) -> i64 {
        self.value(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0)
    }
}

/// Ordered mapping from group key to chart series.
///
/// # Example
///
/// ```
/// use widget_stats::content::{ChartObject, WidgetContent};
///
/// let mut content = WidgetContent::new();
/// content.push("2024-01-02", ChartObject::new().with_value("total", "3"));
/// content.push("2024-01-01", ChartObject::new().with_value("total", "1"));
///
/// let keys: Vec<&str> = content.keys().collect();
/// assert_eq!(keys, vec!["2024-01-02", "2024-01-01"]);
///
/// let json = serde_json::to_string(&content).unwrap();
/// assert!(json.starts_with("{\"2024-01-02\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetContent {
    entries: Vec<(String, Vec<ChartObject>)>,
}

impl WidgetContent {
    /// Create empty content.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content with a single `"result"` series.
    #[must_use]
    pub fn result(series: Vec<ChartObject>) -> Self {
        let mut content = Self::new();
        content.insert(RESULT_KEY, series);
        content
    }

    /// Insert or replace a whole series, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, series: Vec<ChartObject>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = series,
            None => self.entries.push((key, series)),
        }
    }

    /// Append one object to the series under `key`, creating it if needed.
    pub fn push(&mut self, key: impl Into<String>, object: ChartObject) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(object),
            None => self.entries.push((key, vec![object])),
        }
    }

    /// Series under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[ChartObject]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, series)| series.as_slice())
    }

    /// Group keys in presentation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over `(key, series)` pairs in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ChartObject])> {
        self.entries
            .iter()
            .map(|(k, series)| (k.as_str(), series.as_slice()))
    }

    /// Mutable access to every series.
    pub fn series_mut(&mut self) -> impl Iterator<Item = &mut Vec<ChartObject>> {
        self.entries.iter_mut().map(|(_, series)| series)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for WidgetContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, series) in &self.entries {
            map.serialize_entry(key, series)?;
        }
        map.end()
    }
}
