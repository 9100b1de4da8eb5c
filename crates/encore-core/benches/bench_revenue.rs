//! Benchmarks for revenue aggregation and status resolution

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use encore_core::{
    resolve_status, ReportWindow, RevenueAggregator, RevenueConfig, WebhookVerifier,
};
use encore_types::{Currency, Money, NotificationEvent, NotificationType, Subscription};

fn events(count: usize) -> Vec<NotificationEvent> {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| NotificationEvent {
            notification_uuid: format!("n-{i}"),
            created_at: start + Duration::minutes(i as i64 * 17),
            notification_type: match i % 7 {
                0 => NotificationType::Refund,
                1 | 2 => NotificationType::Subscribed,
                6 => NotificationType::Expired,
                _ => NotificationType::DidRenew,
            },
            product_id: "premium.monthly".to_string(),
            // Every tenth event exercises the fallback path.
            price: (i % 10 != 0).then_some(9_990),
            currency: Some("TRY".to_string()),
            original_transaction_id: None,
            username: None,
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let aggregator = RevenueAggregator::new(RevenueConfig::new(Money::new(
        9_990,
        Currency::parse("TRY").unwrap(),
    )));
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

    let mut group = c.benchmark_group("aggregate_revenue");
    for count in [100, 1_000, 10_000] {
        let input = events(count);
        group.bench_with_input(BenchmarkId::new("all", count), &input, |b, input| {
            b.iter(|| aggregator.aggregate_revenue(black_box(input), &ReportWindow::All, now));
        });
        group.bench_with_input(BenchmarkId::new("last_30_days", count), &input, |b, input| {
            b.iter(|| {
                aggregator.aggregate_revenue(black_box(input), &ReportWindow::LastDays(30), now)
            });
        });
    }
    group.finish();
}

fn bench_status(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let mut sub = Subscription::none(now);
    sub.trial_end_date = Some(now + Duration::days(3));

    c.bench_function("resolve_status", |b| {
        b.iter(|| resolve_status(black_box(&sub), black_box(now)));
    });
}

fn bench_webhook_verify(c: &mut Criterion) {
    let verifier = WebhookVerifier::new("whsec_bench");
    let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let payload = serde_json::to_vec(&events(1)[0]).unwrap();
    let header = verifier.sign(&payload, now.timestamp()).unwrap();

    c.bench_function("webhook_verify_and_parse", |b| {
        b.iter(|| verifier.verify_and_parse(black_box(&payload), black_box(&header), now));
    });
}

criterion_group!(benches, bench_aggregate, bench_status, bench_webhook_verify);
criterion_main!(benches);
