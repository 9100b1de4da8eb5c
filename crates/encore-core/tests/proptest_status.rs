//! Property-based tests for status resolution and time remaining
//!
//! - Lifetime with an active or admin flag is premium whatever the dates
//! - Active records never fall through to the trial rule
//! - Remaining time never rounds up and never exceeds the true remainder
//! - Extend never moves the end date backwards

mod common;

use chrono::{DateTime, Duration, Utc};
use common::{admin, core_config, t0};
use encore_core::{remaining, resolve_status, status_remaining, AdminCommand};
use encore_types::{Subscription, SubscriptionStatus, SubscriptionType};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Offset from `t0` in minutes, up to about two years either way
fn arb_offset() -> impl Strategy<Value = Duration> {
    (-1_000_000i64..1_000_000).prop_map(Duration::minutes)
}

fn arb_instant() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop::option::of(arb_offset().prop_map(|d| t0() + d))
}

fn arb_type() -> impl Strategy<Value = SubscriptionType> {
    prop_oneof![
        Just(SubscriptionType::Trial),
        Just(SubscriptionType::Monthly),
        Just(SubscriptionType::Yearly),
        Just(SubscriptionType::Lifetime),
        Just(SubscriptionType::None),
    ]
}

fn arb_subscription() -> impl Strategy<Value = Subscription> {
    (arb_type(), any::<bool>(), any::<bool>(), arb_instant(), arb_instant()).prop_map(
        |(subscription_type, is_active, granted_by_admin, end_date, trial_end_date)| Subscription {
            subscription_type,
            is_active,
            granted_by_admin,
            end_date,
            trial_end_date,
            ..Subscription::none(t0() - Duration::days(800))
        },
    )
}

// ============================================================================
// Status properties
// ============================================================================

proptest! {
    /// Property: active lifetime is premium for any end date and any `now`
    #[test]
    fn prop_active_lifetime_is_premium(
        end in arb_instant(),
        now in arb_offset().prop_map(|d| t0() + d),
        admin_flag in any::<bool>(),
    ) {
        let sub = Subscription {
            subscription_type: SubscriptionType::Lifetime,
            is_active: true,
            granted_by_admin: admin_flag,
            end_date: end,
            ..Subscription::none(t0())
        };
        prop_assert_eq!(resolve_status(&sub, now), SubscriptionStatus::Premium);
        prop_assert!(!status_remaining(&sub, now).is_expired);
    }

    /// Property: an active or admin record is never reported as trial_active
    #[test]
    fn prop_active_record_never_trial(sub in arb_subscription(), now in arb_offset()) {
        prop_assume!(sub.is_active || sub.granted_by_admin);
        prop_assert_ne!(resolve_status(&sub, t0() + now), SubscriptionStatus::TrialActive);
    }

    /// Property: a plain trial is active strictly before its end and expired from it on
    #[test]
    fn prop_trial_flips_at_end(trial_minutes in 1i64..100_000, probe in 0i64..200_000) {
        let sub = Subscription {
            subscription_type: SubscriptionType::Trial,
            trial_end_date: Some(t0() + Duration::minutes(trial_minutes)),
            ..Subscription::none(t0())
        };
        let expected = if probe < trial_minutes {
            SubscriptionStatus::TrialActive
        } else {
            SubscriptionStatus::Expired
        };
        prop_assert_eq!(resolve_status(&sub, t0() + Duration::minutes(probe)), expected);
    }

    /// Property: status remaining is expired exactly when status is expired
    #[test]
    fn prop_remaining_agrees_with_status(sub in arb_subscription(), now in arb_offset()) {
        let now = t0() + now;
        let expired = resolve_status(&sub, now) == SubscriptionStatus::Expired;
        prop_assert_eq!(status_remaining(&sub, now).is_expired, expired);
    }
}

// ============================================================================
// Remaining time properties
// ============================================================================

proptest! {
    /// Property: decomposition is floored and within range
    #[test]
    fn prop_remaining_never_rounds_up(millis in 1i64..10_000_000_000) {
        let r = remaining(Some(t0() + Duration::milliseconds(millis)), t0());
        prop_assert!(!r.is_expired);
        prop_assert_eq!(r.total_millis, millis);
        prop_assert!((0..24).contains(&r.hours));
        prop_assert!((0..60).contains(&r.minutes));
        let reported = ((r.days * 24 + r.hours) * 60 + r.minutes) * 60_000;
        prop_assert!(reported <= millis);
        prop_assert!(millis - reported < 60_000);
    }

    /// Property: any end at or before now is expired with zero fields
    #[test]
    fn prop_past_end_is_expired(back in 0i64..10_000_000_000) {
        let r = remaining(Some(t0() - Duration::milliseconds(back)), t0());
        prop_assert!(r.is_expired);
        prop_assert_eq!((r.days, r.hours, r.minutes, r.total_millis), (0, 0, 0, 0));
    }
}

// ============================================================================
// Extend properties
// ============================================================================

proptest! {
    /// Property: extend never shortens access and always lands `days` past max(now, end)
    #[test]
    fn prop_extend_never_decreases_end(
        end_offset in -100_000i64..100_000,
        days in 1i64..400,
    ) {
        let end = t0() + Duration::minutes(end_offset);
        let mut sub = Subscription {
            subscription_type: SubscriptionType::Monthly,
            end_date: Some(end),
            // A running trial keeps lapsed-end records extendable.
            trial_end_date: Some(t0() + Duration::days(1)),
            ..Subscription::none(t0() - Duration::days(90))
        };
        sub.is_active = end > t0();

        let m = AdminCommand::Extend { days, reason: None }
            .plan(&sub, &admin(), &core_config(), t0())
            .unwrap();
        let new_end = m.subscription.end_date.unwrap();
        prop_assert!(new_end >= end);
        prop_assert_eq!(new_end, end.max(t0()) + Duration::days(days));
    }
}
