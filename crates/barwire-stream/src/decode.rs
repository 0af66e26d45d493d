//! Per-record decoding of the newline-delimited stream.

use barwire_types::{BarEvent, BarStatus};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while decoding a single stream record.
///
/// Decode errors are never fatal to a session: the caller logs them and
/// skips the record.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Record is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Record parsed but is not a JSON object.
    #[error("record is not a JSON object")]
    NotAnObject,

    /// `Status` field present but not an unsigned 32-bit integer.
    #[error("invalid Status field: {0}")]
    InvalidStatus(Value),

    /// `TimeStamp` field present but not a string.
    #[error("invalid TimeStamp field: {0}")]
    InvalidTimestamp(Value),

    /// Embedded epoch value does not represent a valid instant.
    #[error("timestamp out of range: {0}ms")]
    TimestampOutOfRange(i64),
}

/// Extracts the first contiguous digit run from a string as an integer.
///
/// The feed wraps epoch milliseconds in a decorated timestamp string
/// (`/Date(1672531200000)/` and similar); only the digit run matters.
#[must_use]
pub fn extract_epoch_millis(raw: &str) -> Option<i64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &raw[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Decodes one line from the stream.
///
/// Returns `Ok(None)` for records that carry no bar event:
///
/// - blank lines (heartbeats),
/// - records without a `Status` field,
/// - records without a `TimeStamp` field or without an embedded digit
///   run (malformed timestamp, skipped rather than fatal).
///
/// Notable status values are logged with their full flag decomposition
/// as an observability side effect.
///
/// # Errors
///
/// Returns a [`DecodeError`] for structurally broken records; the session
/// logs these and continues.
pub fn decode_line(line: &str) -> Result<Option<BarEvent>, DecodeError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(line)?;
    let Value::Object(fields) = value else {
        return Err(DecodeError::NotAnObject);
    };

    // Not every record is a bar event; heartbeat objects and ancillary
    // messages carry no Status.
    let Some(status_value) = fields.get("Status") else {
        return Ok(None);
    };
    let status = status_value
        .as_u64()
        .and_then(|raw| u32::try_from(raw).ok())
        .map(BarStatus::new)
        .ok_or_else(|| DecodeError::InvalidStatus(status_value.clone()))?;

    if status.is_notable() {
        warn!(status = status.raw(), "notable bar status: {}", status.describe());
    }

    let Some(ts_value) = fields.get("TimeStamp") else {
        return Ok(None);
    };
    let ts_raw = ts_value
        .as_str()
        .ok_or_else(|| DecodeError::InvalidTimestamp(ts_value.clone()))?;
    let Some(millis) = extract_epoch_millis(ts_raw) else {
        return Ok(None);
    };
    let timestamp = epoch_millis_to_instant(millis)
        .ok_or(DecodeError::TimestampOutOfRange(millis))?;

    Ok(Some(BarEvent::new(status, timestamp, fields)))
}

/// Converts epoch milliseconds to a UTC instant.
#[must_use]
fn epoch_millis_to_instant(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
