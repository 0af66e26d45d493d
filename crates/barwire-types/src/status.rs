//! Bar status bitmask decoding.

use serde::{Deserialize, Serialize};

/// Status values above this are unusual enough to warrant a diagnostic
/// log line with the full [`BarStatus::describe`] breakdown.
pub const NOTABLE_THRESHOLD: u32 = 13;

/// Descriptive labels for status bits 0 through 29.
///
/// The feed documents a sparse subset of positions; the remaining bits are
/// reserved but must still decode to a stable label. Bits at index 30 and
/// above are undefined and ignored by [`BarStatus::describe`].
const BIT_LABELS: [&str; 30] = [
    "NEW",
    "REAL_TIME_DATA",
    "HISTORICAL_DATA",
    "STANDARD_CLOSE",
    "END_OF_SESSION_CLOSE",
    "UPDATE_CORPACTION",
    "UPDATE_CORRECTION",
    "ANALYSIS_BAR",
    "EXTENDED_BAR",
    "RESERVED_9",
    "RESERVED_10",
    "RESERVED_11",
    "RESERVED_12",
    "RESERVED_13",
    "RESERVED_14",
    "RESERVED_15",
    "RESERVED_16",
    "RESERVED_17",
    "RESERVED_18",
    "PREV_DAY_CORRECTION",
    "RESERVED_20",
    "RESERVED_21",
    "RESERVED_22",
    "AFTER_MARKET_CORRECTION",
    "PHANTOM_BAR",
    "EMPTY_BAR",
    "BACKFILL_DATA",
    "ARCHIVE_DATA",
    "GHOST_BAR",
    "END_OF_HISTORY_STREAM",
];

/// Status bitmask attached to every bar event.
///
/// Multiple flags are routinely set at once (a live closing tick carries
/// both `REAL_TIME` and `STANDARD_CLOSE`), so flags are tested with
/// bitwise AND via [`Self::contains`], never with equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarStatus(pub u32);

impl BarStatus {
    /// First tick of a bar.
    pub const NEW: Self = Self(1);
    /// Real-time (live) data.
    pub const REAL_TIME: Self = Self(1 << 1);
    /// Historical backfill data.
    pub const HISTORICAL: Self = Self(1 << 2);
    /// Closing tick of a regular bar.
    pub const STANDARD_CLOSE: Self = Self(1 << 3);
    /// Closing tick at the end of a trading session.
    pub const END_OF_SESSION_CLOSE: Self = Self(1 << 4);
    /// Provisional bar that must never be committed to the series.
    pub const GHOST_BAR: Self = Self(1 << 28);
    /// Marks the boundary between historical replay and live data.
    pub const END_OF_HISTORY_STREAM: Self = Self(1 << 29);

    /// Creates a status from its raw integer value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Returns true if any bit of `mask` is set in this status.
    #[must_use]
    pub const fn contains(&self, mask: Self) -> bool {
        self.0 & mask.0 != 0
    }

    /// Returns true if this event belongs to the historical replay.
    #[must_use]
    pub const fn is_historical(&self) -> bool {
        self.contains(Self::HISTORICAL)
    }

    /// Returns true if this event is real-time data.
    #[must_use]
    pub const fn is_real_time(&self) -> bool {
        self.contains(Self::REAL_TIME)
    }

    /// Returns true if this event closes a bar, either at a standard
    /// boundary or at the end of a session.
    #[must_use]
    pub const fn is_close(&self) -> bool {
        self.0 & (Self::STANDARD_CLOSE.0 | Self::END_OF_SESSION_CLOSE.0) != 0
    }

    /// Returns true if this event opens a bar.
    ///
    /// The last historical bar and real-time bars can report both `NEW`
    /// and a close flag in a single event; a closing tick wins.
    #[must_use]
    pub const fn is_opening(&self) -> bool {
        self.contains(Self::NEW) && !self.is_close()
    }

    /// Returns true if this is a ghost (provisional) bar.
    #[must_use]
    pub const fn is_ghost(&self) -> bool {
        self.contains(Self::GHOST_BAR)
    }

    /// Returns true if this event ends the historical replay.
    #[must_use]
    pub const fn is_end_of_history(&self) -> bool {
        self.contains(Self::END_OF_HISTORY_STREAM)
    }

    /// Returns true if this status is worth a diagnostic log line.
    #[must_use]
    pub const fn is_notable(&self) -> bool {
        self.0 > NOTABLE_THRESHOLD
    }

    /// Decomposes the status into its set bits and concatenates each
    /// bit's label, least significant first.
    ///
    /// Total over the full `u32` domain: reserved positions resolve
    /// through the same table, and bits at index 30 and above are
    /// silently ignored.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        for (idx, label) in BIT_LABELS.iter().enumerate() {
            if self.0 >> idx & 1 == 1 {
                parts.push(*label);
            }
        }
        parts.join(" ")
    }
}

impl From<u32> for BarStatus {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for BarStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_bitwise_and() {
        for bit in 0..32u32 {
            let status = BarStatus::new(1 << bit);
            assert!(status.contains(BarStatus::new(1 << bit)));
            assert_eq!(
                status.contains(BarStatus::REAL_TIME),
                (1u32 << bit) & BarStatus::REAL_TIME.raw() != 0
            );
        }
    }

    #[test]
    fn test_combined_flags() {
        let status = BarStatus::new(
            BarStatus::REAL_TIME.raw() | BarStatus::STANDARD_CLOSE.raw(),
        );
        assert!(status.is_real_time());
        assert!(status.is_close());
        assert!(!status.is_historical());
        assert!(!status.is_ghost());
    }

    #[test]
    fn test_is_close_either_flag() {
        assert!(BarStatus::STANDARD_CLOSE.is_close());
        assert!(BarStatus::END_OF_SESSION_CLOSE.is_close());
        assert!(!BarStatus::NEW.is_close());
    }

    #[test]
    fn test_is_opening_excludes_closes() {
        assert!(BarStatus::NEW.is_opening());
        let new_and_close = BarStatus::new(BarStatus::NEW.raw() | BarStatus::STANDARD_CLOSE.raw());
        assert!(!new_and_close.is_opening());
    }

    #[test]
    fn test_describe_single_bits() {
        assert_eq!(BarStatus::NEW.describe(), "NEW");
        assert_eq!(BarStatus::GHOST_BAR.describe(), "GHOST_BAR");
        assert_eq!(
            BarStatus::END_OF_HISTORY_STREAM.describe(),
            "END_OF_HISTORY_STREAM"
        );
    }

    #[test]
    fn test_describe_multiple_bits_lsb_first() {
        let status = BarStatus::new(
            BarStatus::HISTORICAL.raw() | BarStatus::STANDARD_CLOSE.raw(),
        );
        assert_eq!(status.describe(), "HISTORICAL_DATA STANDARD_CLOSE");
    }

    #[test]
    fn test_describe_reserved_bits() {
        assert_eq!(BarStatus::new(1 << 9).describe(), "RESERVED_9");
        assert_eq!(BarStatus::new(1 << 22).describe(), "RESERVED_22");
    }

    #[test]
    fn test_describe_ignores_high_bits() {
        assert_eq!(BarStatus::new(1 << 30).describe(), "");
        assert_eq!(BarStatus::new(1 << 31).describe(), "");
        assert_eq!(
            BarStatus::new(1 << 31 | BarStatus::NEW.raw()).describe(),
            "NEW"
        );
    }

    #[test]
    fn test_describe_total_over_domain() {
        // Spot-check across the whole range; must never panic.
        for raw in [0, 1, 13, 14, u32::MAX / 2, u32::MAX - 1, u32::MAX] {
            let _ = BarStatus::new(raw).describe();
        }
        assert_eq!(BarStatus::new(0).describe(), "");
    }

    #[test]
    fn test_notable_threshold() {
        assert!(!BarStatus::new(13).is_notable());
        assert!(BarStatus::new(14).is_notable());
        assert!(BarStatus::GHOST_BAR.is_notable());
    }
}
