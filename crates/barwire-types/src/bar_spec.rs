//! Stream request description.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Bar aggregation unit requested from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BarType {
    /// Minute bars.
    #[default]
    Minute,
    /// Daily bars.
    Daily,
    /// Weekly bars.
    Weekly,
    /// Monthly bars.
    Monthly,
    /// Tick bars (aggregated by tick count, not wall time).
    Tick,
}

impl BarType {
    /// Returns the capitalized identifier the feed expects in URLs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "Minute",
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Tick => "Tick",
        }
    }

    /// Returns true for tick-count bars, which use a different stream
    /// endpoint than time-based bars.
    #[must_use]
    pub const fn is_tick(&self) -> bool {
        matches!(self, Self::Tick)
    }

    /// Returns all available bar types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute,
            Self::Daily,
            Self::Weekly,
            Self::Monthly,
            Self::Tick,
        ]
    }
}

impl std::fmt::Display for BarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BarType {
    type Err = BarTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minute" => Ok(Self::Minute),
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "tick" => Ok(Self::Tick),
            _ => Err(BarTypeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid bar type string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid bar type '{0}', expected one of: minute, daily, weekly, monthly, tick")]
pub struct BarTypeParseError(String);

/// Describes one logical bar stream: which symbol, at which resolution,
/// and how much history to replay before going live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarSpec {
    /// Instrument symbol (uppercased when embedded in URLs).
    pub symbol: String,
    /// Bar aggregation unit.
    pub bar_type: BarType,
    /// Bar interval (minutes for minute bars, ticks for tick bars).
    pub interval: u32,
    /// Days of history to replay before live data.
    pub days_back: u32,
    /// Trading session template name.
    pub session_template: String,
}

impl BarSpec {
    /// Creates a spec with the feed's default session template and one
    /// day of backfill.
    #[must_use]
    pub fn new(symbol: impl Into<String>, bar_type: BarType, interval: u32) -> Self {
        Self {
            symbol: symbol.into(),
            bar_type,
            interval,
            days_back: 1,
            session_template: "Default".to_string(),
        }
    }

    /// Sets the number of days of history to replay.
    #[must_use]
    pub const fn with_days_back(mut self, days_back: u32) -> Self {
        self.days_back = days_back;
        self
    }

    /// Sets the session template.
    #[must_use]
    pub fn with_session_template(mut self, template: impl Into<String>) -> Self {
        self.session_template = template.into();
        self
    }
}
