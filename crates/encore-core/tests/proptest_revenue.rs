//! Property-based tests for revenue aggregation
//!
//! - Figures do not depend on the order events are supplied in
//! - Published figures are never negative, whatever the refund volume
//! - Count-only notification types never move money
//! - Day counts at the edge of the time range never panic

mod common;

use chrono::{DateTime, Duration, Utc};
use common::{notification, revenue_config, t0};
use encore_core::{ErrorKind, ReportWindow, RevenueAggregator, MAX_REPORT_DAYS};
use encore_db::{MemoryNotificationStore, NotificationStore};
use encore_types::{NotificationEvent, NotificationType};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_type() -> impl Strategy<Value = NotificationType> {
    prop_oneof![
        4 => Just(NotificationType::Subscribed),
        4 => Just(NotificationType::DidRenew),
        3 => Just(NotificationType::Refund),
        1 => Just(NotificationType::Expired),
        1 => Just(NotificationType::DidFailToRenew),
        1 => "[A-Z_]{4,12}".prop_map(NotificationType::Other),
    ]
}

/// Event within 60 days before `t0`, with an occasionally unusable price
fn arb_event() -> impl Strategy<Value = NotificationEvent> {
    (
        "[a-f0-9]{12}",
        0i64..(60 * 24 * 60),
        arb_type(),
        prop_oneof![8 => (1i64..100_000).prop_map(Some), 1 => Just(None), 1 => Just(Some(0))],
        prop_oneof![Just("TRY"), Just("USD"), Just("eur"), Just("??")],
    )
        .prop_map(|(uuid, minutes_ago, notification_type, price, currency)| {
            let mut event = notification(
                uuid,
                t0() - Duration::minutes(minutes_ago),
                notification_type,
                0,
            );
            event.price = price;
            event.currency = Some(currency.to_string());
            event
        })
}

fn arb_window() -> impl Strategy<Value = ReportWindow> {
    prop_oneof![
        Just(ReportWindow::All),
        (1u32..90).prop_map(ReportWindow::LastDays),
        (MAX_REPORT_DAYS..=u32::MAX).prop_map(ReportWindow::LastDays),
        (0i64..30, 1i64..30).prop_map(|(start, len)| ReportWindow::Range {
            from: t0() - Duration::days(start + len),
            to: t0() - Duration::days(start),
        }),
    ]
}

fn now() -> DateTime<Utc> {
    t0() + Duration::minutes(1)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: any permutation of the input yields the same report
    #[test]
    fn prop_order_independent(
        (events, shuffled) in prop::collection::vec(arb_event(), 0..40)
            .prop_flat_map(|events| {
                let shuffled = Just(events.clone()).prop_shuffle();
                (Just(events), shuffled)
            }),
        window in arb_window(),
    ) {
        let aggregator = RevenueAggregator::new(revenue_config());
        let a = aggregator.aggregate_revenue(&events, &window, now());
        let b = aggregator.aggregate_revenue(&shuffled, &window, now());
        prop_assert_eq!(a.total, b.total);
        prop_assert_eq!(a.today, b.today);
        prop_assert_eq!(a.week, b.week);
        prop_assert_eq!(a.month, b.month);
        prop_assert_eq!(&a.per_currency, &b.per_currency);
        prop_assert_eq!(a.fallback_priced_events, b.fallback_priced_events);
        prop_assert_eq!(a.daily_buckets.len(), b.daily_buckets.len());
        for (x, y) in a.daily_buckets.iter().zip(&b.daily_buckets) {
            prop_assert_eq!(x.gross_revenue, y.gross_revenue);
            prop_assert_eq!(x.transaction_count, y.transaction_count);
        }
    }

    /// Property: no published figure is negative
    #[test]
    fn prop_never_negative(
        events in prop::collection::vec(arb_event(), 0..60),
        window in arb_window(),
    ) {
        let report = RevenueAggregator::new(revenue_config())
            .aggregate_revenue(&events, &window, now());
        prop_assert!(report.total >= 0);
        prop_assert!(report.today >= 0);
        prop_assert!(report.week >= 0);
        prop_assert!(report.month >= 0);
        prop_assert!(report.estimated_revenue >= 0);
        prop_assert!(report.per_currency.values().all(|v| *v >= 0));
        prop_assert!(report.daily_buckets.iter().all(|b| b.gross_revenue >= 0));
    }

    /// Property: refunds alone always publish zero
    #[test]
    fn prop_refund_only_is_zero(prices in prop::collection::vec(1i64..100_000, 1..20)) {
        let events: Vec<_> = prices
            .iter()
            .enumerate()
            .map(|(i, p)| notification(format!("r-{i}"), t0(), NotificationType::Refund, *p))
            .collect();
        let report = RevenueAggregator::new(revenue_config())
            .aggregate_revenue(&events, &ReportWindow::All, now());
        prop_assert_eq!(report.total, 0);
        prop_assert_eq!(report.today, 0);
        prop_assert_eq!(report.refund_count, prices.len() as u64);
    }

    /// Property: every event in the window is counted exactly once
    #[test]
    fn prop_counts_partition_events(events in prop::collection::vec(arb_event(), 0..60)) {
        let report = RevenueAggregator::new(revenue_config())
            .aggregate_revenue(&events, &ReportWindow::All, now());
        let counted = report.new_subscriptions
            + report.renewals
            + report.refund_count
            + report.expirations
            + report.other_events;
        prop_assert_eq!(counted, events.len() as u64);
    }
}

#[test]
fn test_subscribe_renew_refund_end_to_end() {
    let d0 = t0() - Duration::days(40);
    let events = vec![
        notification("n-1", d0, NotificationType::Subscribed, 9_990),
        notification("n-2", d0 + Duration::days(30), NotificationType::DidRenew, 9_990),
        notification("n-3", d0 + Duration::days(31), NotificationType::Refund, 9_990),
    ];
    let report = RevenueAggregator::new(revenue_config()).aggregate_revenue(
        &events,
        &ReportWindow::All,
        d0 + Duration::days(32),
    );
    assert_eq!(report.total, 9_990);
    assert_eq!(report.refund_count, 1);
    assert_eq!(report.new_subscriptions, 1);
    assert_eq!(report.renewals, 1);
    assert_eq!(report.fallback_priced_events, 0);
}

#[tokio::test]
async fn test_report_day_count_limits() {
    let store = MemoryNotificationStore::new();
    let old = notification("n-old", t0() - Duration::days(3_000), NotificationType::Subscribed, 500);
    let recent = notification("n-new", t0(), NotificationType::DidRenew, 700);
    store.insert(&old).await.unwrap();
    store.insert(&recent).await.unwrap();
    let aggregator = RevenueAggregator::new(revenue_config());

    let report = aggregator
        .report(&store, &ReportWindow::LastDays(MAX_REPORT_DAYS), now())
        .await
        .unwrap();
    assert_eq!(report.total, 1_200);

    for days in [MAX_REPORT_DAYS + 1, u32::MAX] {
        let err = aggregator
            .report(&store, &ReportWindow::LastDays(days), now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    // The pure fold does not validate; an oversized window covers everything.
    let folded = aggregator.aggregate_revenue(
        &[old, recent],
        &ReportWindow::LastDays(u32::MAX),
        now(),
    );
    assert_eq!(folded.total, 1_200);
}
