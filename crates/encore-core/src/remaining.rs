//! Time remaining until an absolute end instant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: i64 = 60 * 1_000;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Remaining duration, floored to whole minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    /// Whole days
    pub days: i64,
    /// Hours after whole days (0–23)
    pub hours: i64,
    /// Minutes after whole hours (0–59)
    pub minutes: i64,
    /// Exact remaining milliseconds
    pub total_millis: i64,
    /// End is absent or not after `now`
    pub is_expired: bool,
}

impl TimeRemaining {
    /// The expired value: every number zero
    pub const fn expired() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            total_millis: 0,
            is_expired: true,
        }
    }
}

/// Compute the time left between `now` and `end`.
///
/// Always derived from the two instants given; the reported value never
/// exceeds the true remaining time.
pub fn remaining(end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TimeRemaining {
    let Some(end) = end else {
        return TimeRemaining::expired();
    };
    if end <= now {
        return TimeRemaining::expired();
    }

    let total_millis = (end - now).num_milliseconds();
    TimeRemaining {
        days: total_millis / MILLIS_PER_DAY,
        hours: (total_millis % MILLIS_PER_DAY) / MILLIS_PER_HOUR,
        minutes: (total_millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
        total_millis,
        is_expired: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_ninety_minutes() {
        let r = remaining(Some(now() + Duration::minutes(90)), now());
        assert_eq!((r.days, r.hours, r.minutes), (0, 1, 30));
        assert_eq!(r.total_millis, 90 * 60 * 1_000);
        assert!(!r.is_expired);
    }

    #[test]
    fn test_just_past_is_expired() {
        let r = remaining(Some(now() - Duration::milliseconds(1)), now());
        assert_eq!(r, TimeRemaining::expired());
    }

    #[test]
    fn test_end_equal_to_now_is_expired() {
        assert!(remaining(Some(now()), now()).is_expired);
    }

    #[test]
    fn test_absent_end_is_expired() {
        assert_eq!(remaining(None, now()), TimeRemaining::expired());
    }

    #[test]
    fn test_floors_and_drops_seconds() {
        let end = now() + Duration::days(2) + Duration::hours(23) + Duration::minutes(59)
            + Duration::seconds(59);
        let r = remaining(Some(end), now());
        assert_eq!((r.days, r.hours, r.minutes), (2, 23, 59));

        let r = remaining(Some(now() + Duration::seconds(59)), now());
        assert_eq!((r.days, r.hours, r.minutes), (0, 0, 0));
        assert!(!r.is_expired);
    }

    #[test]
    fn test_recomputed_from_inputs_only() {
        let end = now() + Duration::hours(5);
        let first = remaining(Some(end), now());
        let _ = remaining(Some(end), now() + Duration::hours(1));
        assert_eq!(remaining(Some(end), now()), first);
    }
}
