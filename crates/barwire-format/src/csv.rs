//! CSV output format.

use barwire_aggregate::BarSeries;
use serde_json::Value;
use std::io::Write;

use crate::{FormatError, Formatter};

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: '\t',
            include_header: true,
        }
    }

    /// Renders one field value as a CSV cell.
    ///
    /// Strings containing the delimiter, quotes, or newlines are quoted
    /// with doubled inner quotes; missing values become empty cells.
    fn render_cell(&self, value: Option<&Value>) -> String {
        let text = match value {
            None | Some(Value::Null) => return String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        if text.contains(self.delimiter)
            || text.contains('"')
            || text.contains('\n')
            || text.contains('\r')
        {
            format!("\"{}\"", text.replace('"', "\"\""))
        } else {
            text
        }
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for CsvFormatter {
    fn write_series<W: Write + Send>(
        &self,
        series: &BarSeries,
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;
        let columns = series.columns();

        if self.include_header {
            write!(writer, "timestamp")?;
            for column in &columns {
                write!(writer, "{d}{}", self.render_cell(Some(&Value::from(column.as_str()))))?;
            }
            writeln!(writer)?;
        }

        for bar in series.bars() {
            write!(writer, "{}", bar.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;
            for column in &columns {
                write!(writer, "{d}{}", self.render_cell(bar.fields.get(column)))?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barwire_aggregate::{BarAggregator, BarSeries};
    use barwire_types::{BarEvent, BarStatus};
    use chrono::{TimeZone, Utc};
    use serde_json::Map;
    use std::io::Cursor;

    fn series_of(rows: &[(i64, &[(&str, Value)])]) -> BarSeries {
        // Build through the aggregator so the series stays the crate's
        // single-writer product.
        let (mut agg, _watch) = BarAggregator::new();
        for (secs, pairs) in rows {
            let mut fields = Map::new();
            for (key, value) in *pairs {
                fields.insert((*key).to_string(), value.clone());
            }
            let status = BarStatus::new(
                BarStatus::HISTORICAL.raw() | BarStatus::STANDARD_CLOSE.raw(),
            );
            let event = BarEvent::new(status, Utc.timestamp_opt(*secs, 0).unwrap(), fields);
            agg.process(event).unwrap();
        }
        let terminal = BarEvent::new(
            BarStatus::new(BarStatus::END_OF_HISTORY_STREAM.raw() | BarStatus::GHOST_BAR.raw()),
            Utc.timestamp_opt(999_999, 0).unwrap(),
            Map::new(),
        );
        agg.process(terminal).unwrap();
        agg.series().clone()
    }

    #[test]
    fn test_csv_flat_table() {
        let series = series_of(&[
            (0, &[("Close", Value::from(1.5)), ("Open", Value::from(1.0))]),
            (60, &[("Close", Value::from(2.5)), ("Volume", Value::from(10))]),
        ]);
        let mut output = Cursor::new(Vec::new());
        CsvFormatter::new().write_series(&series, &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        let lines: Vec<_> = result.lines().collect();
        assert_eq!(lines[0], "timestamp,Close,Open,Volume");
        assert_eq!(lines[1], "1970-01-01T00:00:00.000Z,1.5,1.0,");
        assert_eq!(lines[2], "1970-01-01T00:01:00.000Z,2.5,,10");
    }

    #[test]
    fn test_csv_no_header() {
        let series = series_of(&[(0, &[("Close", Value::from(1.5))])]);
        let mut output = Cursor::new(Vec::new());
        CsvFormatter::new()
            .with_header(false)
            .write_series(&series, &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(!result.contains("timestamp"));
    }

    #[test]
    fn test_csv_quotes_awkward_strings() {
        let series = series_of(&[(
            0,
            &[("Note", Value::from("hello, \"world\""))],
        )]);
        let mut output = Cursor::new(Vec::new());
        CsvFormatter::new().write_series(&series, &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.contains("\"hello, \"\"world\"\"\""));
    }

    #[test]
    fn test_tsv() {
        let series = series_of(&[(0, &[("Close", Value::from(1.5))])]);
        let mut output = Cursor::new(Vec::new());
        CsvFormatter::tsv().write_series(&series, &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.starts_with("timestamp\tClose"));
    }
}
