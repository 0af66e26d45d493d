//! Decoded bar event representation.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::BarStatus;

/// One decoded record from the bar stream.
///
/// `status` and `timestamp` are first-class because all control logic
/// branches on them. Everything else the feed sends (Open/High/Low/Close/
/// Volume and whatever auxiliary columns the upstream schema carries) is
/// kept as an open field set and merged into the series by key name.
///
/// Events are constructed once per decoded line, never mutated, and
/// consumed exactly once by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct BarEvent {
    /// Status bitmask classifying this event.
    pub status: BarStatus,
    /// Bar timestamp, parsed from the record's epoch-millisecond field.
    pub timestamp: DateTime<Utc>,
    /// The complete decoded record, keyed by upstream field name.
    pub fields: Map<String, Value>,
}

impl BarEvent {
    /// Creates a new bar event.
    #[must_use]
    pub const fn new(
        status: BarStatus,
        timestamp: DateTime<Utc>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            status,
            timestamp,
            fields,
        }
    }

    /// Returns the `Close` field, if present.
    ///
    /// Used by the aggregator's value-based dirty check; compared as raw
    /// JSON values so a missing field on either side counts as a change.
    #[must_use]
    pub fn close(&self) -> Option<&Value> {
        self.fields.get("Close")
    }

    /// Returns a named field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
