//! JSON output formats.

use barwire_aggregate::{Bar, BarSeries};
use serde_json::{Map, Value};
use std::io::Write;

use crate::{FormatError, Formatter};

/// JSON formatter producing either a single array or newline-delimited
/// objects, one flattened row per bar.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Emit one object per line instead of a single array.
    ndjson: bool,
}

impl JsonFormatter {
    /// Creates a formatter producing a JSON array.
    #[must_use]
    pub const fn new() -> Self {
        Self { ndjson: false }
    }

    /// Creates a formatter producing newline-delimited JSON.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self { ndjson: true }
    }

    /// Flattens one bar into a single object with the timestamp as a
    /// leading `timestamp` key next to the feed's own columns.
    fn row(bar: &Bar) -> Value {
        let mut row = Map::new();
        row.insert(
            "timestamp".to_string(),
            Value::from(bar.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        );
        for (key, value) in &bar.fields {
            row.insert(key.clone(), value.clone());
        }
        Value::Object(row)
    }
}

impl Formatter for JsonFormatter {
    fn write_series<W: Write + Send>(
        &self,
        series: &BarSeries,
        mut writer: W,
    ) -> Result<(), FormatError> {
        if self.ndjson {
            for bar in series.bars() {
                serde_json::to_writer(&mut writer, &Self::row(bar))?;
                writeln!(writer)?;
            }
        } else {
            let rows: Vec<Value> = series.bars().iter().map(Self::row).collect();
            serde_json::to_writer_pretty(&mut writer, &rows)?;
            writeln!(writer)?;
        }
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.ndjson { "ndjson" } else { "json" }
    }
}
