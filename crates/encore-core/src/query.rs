//! Admin user listing by derived status

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use encore_types::{Subscription, SubscriptionStatus, UserId, UserSubscription};

use crate::error::CoreError;
use crate::remaining::TimeRemaining;
use crate::status::{resolve_status, status_end_date, status_remaining};

/// Status filter for the admin user list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Premium users
    Premium,
    /// Users in an active trial
    Trial,
    /// Users with no access
    Expired,
    /// Premium or trial users whose access ends soon
    #[serde(alias = "expiring")]
    ExpiringSoon,
}

impl StatusFilter {
    /// Get the query-string name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::Trial => "trial",
            Self::Expired => "expired",
            Self::ExpiringSoon => "expiring",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "premium" => Ok(Self::Premium),
            "trial" | "trial_active" => Ok(Self::Trial),
            "expired" => Ok(Self::Expired),
            "expiring" | "expiring_soon" => Ok(Self::ExpiringSoon),
            other => Err(CoreError::Validation(format!("unknown status filter: {other}"))),
        }
    }
}

/// One row of the admin user list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStatusView {
    /// User ID
    pub user_id: UserId,
    /// Stored subscription
    pub subscription: Subscription,
    /// Status at query time
    pub status: SubscriptionStatus,
    /// End of the current status, if bounded
    pub status_end_date: Option<DateTime<Utc>>,
    /// Time left in the current status
    pub remaining: TimeRemaining,
}

impl UserStatusView {
    /// Derive the view of a user at `now`
    pub fn at(user: &UserSubscription, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.user_id,
            subscription: user.subscription.clone(),
            status: resolve_status(&user.subscription, now),
            status_end_date: status_end_date(&user.subscription, now),
            remaining: status_remaining(&user.subscription, now),
        }
    }
}

/// Per-status user counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// All users considered
    pub total: u64,
    /// Premium users
    pub premium: u64,
    /// Users in an active trial
    pub trial_active: u64,
    /// Users with no access
    pub expired: u64,
    /// Users also counted above whose access ends soon
    pub expiring_soon: u64,
}

/// Filters users by their status at query time
#[derive(Debug, Clone, Copy)]
pub struct AdminQueryService {
    expiring_soon_days: i64,
}

impl AdminQueryService {
    /// Create a query service with the given expiring-soon threshold
    pub fn new(expiring_soon_days: i64) -> Self {
        Self { expiring_soon_days }
    }

    /// Whether a derived view counts as expiring soon.
    ///
    /// Lifetime premium never expires, so it is never expiring soon.
    pub fn is_expiring_soon(&self, view: &UserStatusView) -> bool {
        view.status_end_date.is_some()
            && !view.remaining.is_expired
            && view.remaining.days <= self.expiring_soon_days
    }

    fn matches(&self, filter: StatusFilter, view: &UserStatusView) -> bool {
        match filter {
            StatusFilter::Premium => view.status == SubscriptionStatus::Premium,
            StatusFilter::Trial => view.status == SubscriptionStatus::TrialActive,
            StatusFilter::Expired => view.status == SubscriptionStatus::Expired,
            StatusFilter::ExpiringSoon => self.is_expiring_soon(view),
        }
    }

    /// Users matching `filter` at `now`, in input order.
    ///
    /// `None` returns every user.
    pub fn filter(
        &self,
        users: &[UserSubscription],
        filter: Option<StatusFilter>,
        now: DateTime<Utc>,
    ) -> Vec<UserStatusView> {
        users
            .iter()
            .map(|user| UserStatusView::at(user, now))
            .filter(|view| filter.is_none_or(|f| self.matches(f, view)))
            .collect()
    }

    /// Count users by status at `now`
    pub fn status_counts(&self, users: &[UserSubscription], now: DateTime<Utc>) -> StatusCounts {
        users
            .iter()
            .map(|user| UserStatusView::at(user, now))
            .fold(StatusCounts::default(), |mut counts, view| {
                counts.total += 1;
                match view.status {
                    SubscriptionStatus::Premium => counts.premium += 1,
                    SubscriptionStatus::TrialActive => counts.trial_active += 1,
                    SubscriptionStatus::Expired => counts.expired += 1,
                }
                if self.is_expiring_soon(&view) {
                    counts.expiring_soon += 1;
                }
                counts
            })
    }
}
