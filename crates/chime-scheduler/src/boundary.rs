use std::time::Duration;

use chime_core::Cadence;
use chrono::{
    DateTime, Days, LocalResult, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike,
};

/// Delay from `now` until the next firing instant for `cadence`, shifted by
/// `offset_ms`.
///
/// The firing instant is the earliest calendar boundary strictly after
/// `now - offset`, plus the offset: a clock sitting exactly on an
/// offset-adjusted boundary waits one full period. The result is never zero,
/// so re-arming directly after a firing cannot fire again in the same
/// instant.
///
/// Boundaries are calendar boundaries of the *local* wall clock in `now`'s
/// timezone: quarter-hour firings land on local minute values 0/15/30/45 and
/// hour firings on local minute 0 even in zones offset from UTC by a
/// fraction of an hour.
pub fn delay_to_next<Tz: TimeZone>(
    cadence: Cadence,
    now: &DateTime<Tz>,
    offset_ms: i64,
) -> Duration {
    let shifted = now.clone() - TimeDelta::milliseconds(offset_ms);
    let local = shifted.naive_local();
    let next_local = next_boundary(cadence, local);

    let delay = match resolve_local(&shifted.timezone(), next_local) {
        Some(next) => next.signed_duration_since(shifted),
        // Unmappable wall time around a zone transition: fall back to the
        // naive difference. The engine re-computes after every firing, so a
        // one-off skewed delay self-corrects.
        None => next_local - local,
    };

    delay
        .to_std()
        .unwrap_or_default()
        .max(Duration::from_millis(1))
}

/// The earliest calendar boundary strictly after `t`, in local wall time.
fn next_boundary(cadence: Cadence, t: NaiveDateTime) -> NaiveDateTime {
    match cadence {
        Cadence::Minute => floor_minute(t) + TimeDelta::minutes(1),
        Cadence::QuarterHour => {
            let floor = floor_minute(t)
                .with_minute(t.minute() - t.minute() % 15)
                .unwrap_or(t);
            floor + TimeDelta::minutes(15)
        }
        Cadence::Hour => {
            let floor = floor_minute(t).with_minute(0).unwrap_or(t);
            floor + TimeDelta::hours(1)
        }
        Cadence::Midnight => t
            .date()
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(NaiveTime::MIN))
            .unwrap_or(t + TimeDelta::days(1)),
    }
}

fn floor_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Map a local wall-clock time back onto an instant in `tz`.
///
/// A boundary inside a spring-forward gap does not exist on the wall clock;
/// it resolves to the matching time one hour later. An ambiguous fall-back
/// time resolves to its earlier occurrence.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, _) => Some(first),
        LocalResult::None => tz
            .from_local_datetime(&(local + TimeDelta::hours(1)))
            .earliest(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    // Delay tables pinning the strictly-after contract one millisecond to
    // either side of each boundary, with signed offsets on every cadence.
    // Epoch-millisecond inputs read naturally against the
    // minute/quarter-hour/hour grid (60_000 / 900_000 / 3_600_000).

    fn at(epoch_ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(epoch_ms).expect("valid timestamp")
    }

    fn delay_ms(cadence: Cadence, now_ms: i64, offset_ms: i64) -> u128 {
        delay_to_next(cadence, &at(now_ms), offset_ms).as_millis()
    }

    #[test]
    fn minute_delay() {
        assert_eq!(delay_ms(Cadence::Minute, 56_999, -3000), 1);
        assert_eq!(delay_ms(Cadence::Minute, 57_000, -3000), 60_000);
        assert_eq!(delay_ms(Cadence::Minute, 57_001, -3000), 59_999);

        assert_eq!(delay_ms(Cadence::Minute, 59_999, 0), 1);
        assert_eq!(delay_ms(Cadence::Minute, 60_000, 0), 60_000);
        assert_eq!(delay_ms(Cadence::Minute, 60_001, 0), 59_999);

        assert_eq!(delay_ms(Cadence::Minute, 59_999, 3000), 3001);
        assert_eq!(delay_ms(Cadence::Minute, 60_000, 3000), 3000);
        assert_eq!(delay_ms(Cadence::Minute, 62_999, 3000), 1);
        assert_eq!(delay_ms(Cadence::Minute, 63_000, 3000), 60_000);
        assert_eq!(delay_ms(Cadence::Minute, 63_001, 3000), 59_999);
    }

    #[test]
    fn quarter_hour_delay() {
        assert_eq!(delay_ms(Cadence::QuarterHour, 896_999, -3000), 1);
        assert_eq!(delay_ms(Cadence::QuarterHour, 897_000, -3000), 900_000);
        assert_eq!(delay_ms(Cadence::QuarterHour, 897_001, -3000), 899_999);

        assert_eq!(delay_ms(Cadence::QuarterHour, 899_999, 0), 1);
        assert_eq!(delay_ms(Cadence::QuarterHour, 900_000, 0), 900_000);
        assert_eq!(delay_ms(Cadence::QuarterHour, 900_001, 0), 899_999);

        assert_eq!(delay_ms(Cadence::QuarterHour, 899_999, 3000), 3001);
        assert_eq!(delay_ms(Cadence::QuarterHour, 900_000, 3000), 3000);
        assert_eq!(delay_ms(Cadence::QuarterHour, 902_999, 3000), 1);
        assert_eq!(delay_ms(Cadence::QuarterHour, 903_000, 3000), 900_000);
        assert_eq!(delay_ms(Cadence::QuarterHour, 903_001, 3000), 899_999);
    }

    #[test]
    fn hour_delay() {
        assert_eq!(delay_ms(Cadence::Hour, 3_596_999, -3000), 1);
        assert_eq!(delay_ms(Cadence::Hour, 3_597_000, -3000), 3_600_000);
        assert_eq!(delay_ms(Cadence::Hour, 3_597_001, -3000), 3_599_999);

        assert_eq!(delay_ms(Cadence::Hour, 3_599_999, 0), 1);
        assert_eq!(delay_ms(Cadence::Hour, 3_600_000, 0), 3_600_000);
        assert_eq!(delay_ms(Cadence::Hour, 3_600_001, 0), 3_599_999);

        assert_eq!(delay_ms(Cadence::Hour, 3_599_999, 3000), 3001);
        assert_eq!(delay_ms(Cadence::Hour, 3_600_000, 3000), 3000);
        assert_eq!(delay_ms(Cadence::Hour, 3_602_999, 3000), 1);
        assert_eq!(delay_ms(Cadence::Hour, 3_603_000, 3000), 3_600_000);
        assert_eq!(delay_ms(Cadence::Hour, 3_603_001, 3000), 3_599_999);
    }

    #[test]
    fn midnight_delay() {
        // Fixed +02:00 zone: midnight is a local notion, not a UTC one.
        let tz = FixedOffset::east_opt(2 * 3600).expect("valid zone offset");
        let midnight = tz
            .with_ymd_and_hms(2016, 1, 20, 0, 0, 0)
            .single()
            .expect("unambiguous");
        let d = |delta_ms: i64, offset_ms: i64| {
            let now = midnight + TimeDelta::milliseconds(delta_ms);
            delay_to_next(Cadence::Midnight, &now, offset_ms).as_millis()
        };

        assert_eq!(d(-3001, -3000), 1);
        assert_eq!(d(-3000, -3000), 86_400_000);
        assert_eq!(d(-2999, -3000), 86_399_999);

        assert_eq!(d(-1, 0), 1);
        assert_eq!(d(0, 0), 86_400_000);
        assert_eq!(d(1, 0), 86_399_999);

        assert_eq!(d(-1, 3000), 3001);
        assert_eq!(d(0, 3000), 3000);
        assert_eq!(d(2999, 3000), 1);
        assert_eq!(d(3000, 3000), 86_400_000);
        assert_eq!(d(3001, 3000), 86_399_999);
    }

    #[test]
    fn quarter_hour_lands_on_quarter_minutes() {
        // 10:07:00 local in a half-hour zone (+05:30): the next boundary is
        // local 10:15:00, not an epoch multiple of 900_000.
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).expect("valid zone offset");
        let now = tz
            .with_ymd_and_hms(2024, 6, 1, 10, 7, 0)
            .single()
            .expect("unambiguous");
        let delay = delay_to_next(Cadence::QuarterHour, &now, 0);
        assert_eq!(delay, Duration::from_secs(8 * 60));
    }

    #[test]
    fn hour_lands_on_local_minute_zero() {
        let tz = FixedOffset::east_opt(5 * 3600 + 45 * 60).expect("valid zone offset");
        let now = tz
            .with_ymd_and_hms(2024, 6, 1, 10, 7, 30)
            .single()
            .expect("unambiguous");
        let delay = delay_to_next(Cadence::Hour, &now, 0);
        assert_eq!(delay, Duration::from_secs(52 * 60 + 30));
    }
}
