//! Shared fixtures

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use encore_core::{CoreConfig, ProductCatalog, RevenueConfig};
use encore_types::{AdminContext, Currency, Money, NotificationEvent, NotificationType};

/// Fixed reference instant
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn admin() -> AdminContext {
    AdminContext::new("admin-test").with_request_id("req-test")
}

pub fn try_money(amount_minor: i64) -> Money {
    Money::new(amount_minor, Currency::parse("TRY").unwrap())
}

pub fn revenue_config() -> RevenueConfig {
    RevenueConfig::new(try_money(9_990)).with_catalog(ProductCatalog::new().with_product(
        "premium.yearly",
        "Premium Yearly",
        try_money(79_990),
    ))
}

pub fn core_config() -> CoreConfig {
    CoreConfig::new(revenue_config())
}

/// A priced TRY notification for `premium.monthly`
pub fn notification(
    uuid: impl Into<String>,
    at: DateTime<Utc>,
    notification_type: NotificationType,
    price: i64,
) -> NotificationEvent {
    NotificationEvent {
        notification_uuid: uuid.into(),
        created_at: at,
        notification_type,
        product_id: "premium.monthly".to_string(),
        price: Some(price),
        currency: Some("TRY".to_string()),
        original_transaction_id: Some("2000000123".to_string()),
        username: Some("elif".to_string()),
    }
}
