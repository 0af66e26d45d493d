//! The committed bar table.

use barwire_types::BarEvent;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// One committed row of the bar table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Bar timestamp; unique within a series.
    pub timestamp: DateTime<Utc>,
    /// All fields the feed sent for this bar, keyed by upstream name.
    pub fields: Map<String, Value>,
}

impl Bar {
    /// Copies an event's fields into a new bar row.
    #[must_use]
    pub fn from_event(event: &BarEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            fields: event.fields.clone(),
        }
    }

    /// Returns the `Close` field, if present.
    #[must_use]
    pub fn close(&self) -> Option<&Value> {
        self.fields.get("Close")
    }

    /// Overwrites every field present in `fields` onto this row; keys
    /// the row already has but the update lacks are left untouched.
    ///
    /// Returns true if any value actually changed.
    pub(crate) fn merge(&mut self, fields: &Map<String, Value>) -> bool {
        let mut mutated = false;
        for (key, value) in fields {
            if self.fields.get(key) != Some(value) {
                self.fields.insert(key.clone(), value.clone());
                mutated = true;
            }
        }
        mutated
    }
}

/// The ordered, timestamp-ascending table of committed bars.
///
/// Timestamps are strictly increasing and unique; later events for an
/// existing timestamp revise that row in place rather than adding one.
/// Only the aggregator mutates a series; everyone else reads cloned
/// snapshots.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Creates an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { bars: Vec::new() }
    }

    pub(crate) const fn from_bars(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    /// Returns the number of committed bars.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if no bars have been committed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the committed bars in timestamp order.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Returns the most recent (open) bar.
    #[must_use]
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Bar> {
        self.bars.last_mut()
    }

    pub(crate) fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    /// Returns the union of field names across all bars, in first-seen
    /// order. This is the column set for flat table export.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        for bar in &self.bars {
            for key in bar.fields.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(secs: i64, pairs: &[(&str, f64)]) -> Bar {
        let mut fields = Map::new();
        for (key, value) in pairs {
            fields.insert((*key).to_string(), Value::from(*value));
        }
        Bar {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            fields,
        }
    }

    #[test]
    fn test_merge_overwrites_present_keys_only() {
        let mut row = bar(1, &[("Open", 100.0), ("Close", 101.0), ("Volume", 5.0)]);
        let mut update = Map::new();
        update.insert("Close".to_string(), Value::from(102.0));

        assert!(row.merge(&update));
        assert_eq!(row.fields.get("Close"), Some(&Value::from(102.0)));
        // Untouched columns survive.
        assert_eq!(row.fields.get("Open"), Some(&Value::from(100.0)));
        assert_eq!(row.fields.get("Volume"), Some(&Value::from(5.0)));
    }

    #[test]
    fn test_merge_identical_values_reports_no_change() {
        let mut row = bar(1, &[("Close", 101.0)]);
        let update = row.fields.clone();
        assert!(!row.merge(&update));
    }

    #[test]
    fn test_merge_adds_new_columns() {
        let mut row = bar(1, &[("Close", 101.0)]);
        let mut update = Map::new();
        update.insert("OpenInterest".to_string(), Value::from(42.0));

        assert!(row.merge(&update));
        assert_eq!(row.fields.get("OpenInterest"), Some(&Value::from(42.0)));
    }

    #[test]
    fn test_columns_union_first_seen_order() {
        let series = BarSeries::from_bars(vec![
            bar(1, &[("Open", 1.0), ("Close", 2.0)]),
            bar(2, &[("Close", 3.0), ("Volume", 4.0)]),
        ]);
        assert_eq!(series.columns(), vec!["Close", "Open", "Volume"]);
    }

    #[test]
    fn test_empty_series() {
        let series = BarSeries::new();
        assert!(series.is_empty());
        assert!(series.last().is_none());
        assert!(series.columns().is_empty());
    }
}
