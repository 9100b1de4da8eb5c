//! Half-open time windows used for event queries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open window `[from, to)`; a missing bound is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Unbounded window
    pub const fn all() -> Self {
        Self { from: None, to: None }
    }

    /// Window between two instants
    pub const fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Trailing window of `days` × 24h ending (inclusively) at `now`.
    ///
    /// A bound that falls outside the representable time range is left
    /// unbounded.
    pub fn trailing_days(days: i64, now: DateTime<Utc>) -> Self {
        Self {
            from: Duration::try_days(days).and_then(|span| now.checked_sub_signed(span)),
            to: now.checked_add_signed(Duration::milliseconds(1)),
        }
    }

    /// Whether an instant falls inside the window
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at < to)
    }
}
