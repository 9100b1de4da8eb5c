//! Subscription status resolution

use chrono::{DateTime, Utc};

use encore_types::{Subscription, SubscriptionStatus, SubscriptionType};

use crate::remaining::{remaining, TimeRemaining};

/// Resolve the access status of a subscription at `now`.
///
/// Precedence:
/// 1. active or admin-granted: lifetime, or an `end_date` after `now`, is premium
/// 2. otherwise a `trial_end_date` after `now` is an active trial
/// 3. everything else is expired
///
/// A record that enters rule 1 but satisfies neither of its conditions goes
/// straight to expired; its trial is not consulted.
pub fn resolve_status(subscription: &Subscription, now: DateTime<Utc>) -> SubscriptionStatus {
    if subscription.is_active || subscription.granted_by_admin {
        if subscription.subscription_type == SubscriptionType::Lifetime {
            return SubscriptionStatus::Premium;
        }
        if subscription.end_date.is_some_and(|end| end > now) {
            return SubscriptionStatus::Premium;
        }
        return SubscriptionStatus::Expired;
    }

    if subscription.trial_end_date.is_some_and(|end| end > now) {
        return SubscriptionStatus::TrialActive;
    }

    SubscriptionStatus::Expired
}

/// The end instant that bounds the current status, if any.
///
/// Premium uses `end_date`, an active trial uses `trial_end_date`. Lifetime
/// premium and expired have none.
pub fn status_end_date(
    subscription: &Subscription,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match resolve_status(subscription, now) {
        SubscriptionStatus::Premium
            if subscription.subscription_type == SubscriptionType::Lifetime =>
        {
            None
        }
        SubscriptionStatus::Premium => subscription.end_date,
        SubscriptionStatus::TrialActive => subscription.trial_end_date,
        SubscriptionStatus::Expired => None,
    }
}

/// Time left in the current status.
///
/// Lifetime premium has no end and reports as not expired with zero fields.
pub fn status_remaining(subscription: &Subscription, now: DateTime<Utc>) -> TimeRemaining {
    let status = resolve_status(subscription, now);
    let end = status_end_date(subscription, now);
    if status == SubscriptionStatus::Premium && end.is_none() {
        return TimeRemaining::default();
    }
    remaining(end, now)
}
