use std::fmt;

use serde::{Deserialize, Serialize};

pub const MINUTE_IN_MILLIS: i64 = 60_000;
pub const QUARTER_HOUR_IN_MILLIS: i64 = 15 * MINUTE_IN_MILLIS;
pub const HOUR_IN_MILLIS: i64 = 60 * MINUTE_IN_MILLIS;
pub const DAY_IN_MILLIS: i64 = 24 * HOUR_IN_MILLIS;

/// The four calendar-aligned firing cadences.
///
/// The set is closed: every dispatch path matches exhaustively, so adding a
/// cadence is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Top of every minute, shifted by a per-registration sub-minute offset.
    Minute,
    /// Minute values 0, 15, 30 and 45 of every hour.
    QuarterHour,
    /// Top of every hour.
    Hour,
    /// 00:00:00 of every calendar day, in the clock's timezone.
    Midnight,
}

impl Cadence {
    pub const ALL: [Cadence; 4] = [
        Cadence::Minute,
        Cadence::QuarterHour,
        Cadence::Hour,
        Cadence::Midnight,
    ];

    /// Nominal period in milliseconds.
    ///
    /// `Midnight` reports the nominal 24 h day; the real interval between two
    /// midnights varies across DST transitions and is always derived from the
    /// calendar, never from this value.
    pub const fn period_millis(self) -> i64 {
        match self {
            Cadence::Minute => MINUTE_IN_MILLIS,
            Cadence::QuarterHour => QUARTER_HOUR_IN_MILLIS,
            Cadence::Hour => HOUR_IN_MILLIS,
            Cadence::Midnight => DAY_IN_MILLIS,
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cadence::Minute => "minute",
            Cadence::QuarterHour => "quarter_hour",
            Cadence::Hour => "hour",
            Cadence::Midnight => "midnight",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_are_consistent() {
        assert_eq!(Cadence::QuarterHour.period_millis(), 15 * 60_000);
        assert_eq!(Cadence::Hour.period_millis(), 4 * QUARTER_HOUR_IN_MILLIS);
        assert_eq!(Cadence::Midnight.period_millis(), 24 * HOUR_IN_MILLIS);
    }

    #[test]
    fn all_lists_every_cadence_once() {
        assert_eq!(Cadence::ALL.len(), 4);
        for c in Cadence::ALL {
            assert_eq!(Cadence::ALL.iter().filter(|x| **x == c).count(), 1);
        }
    }
}
