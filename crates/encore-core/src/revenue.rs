//! Revenue aggregation over payment-provider notifications
//!
//! Aggregation is a pure fold over a snapshot of events. Money is summed in
//! integer minor units; every published figure is clamped at zero so refunds
//! never push a dashboard number negative. That clamp makes these figures an
//! approximation, not ledger accounting.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use encore_db::NotificationStore;
use encore_types::{Currency, Money, NotificationEvent, NotificationType, TimeWindow};

use crate::catalog::CatalogLookup;
use crate::config::RevenueConfig;
use crate::error::{CoreError, CoreResult};

/// Longest trailing window a report accepts (about a century)
pub const MAX_REPORT_DAYS: u32 = 36_500;

/// Reporting window requested by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// Every event supplied
    All,
    /// Trailing `n` × 24h ending at `now`
    LastDays(u32),
    /// Explicit half-open range
    Range {
        /// Inclusive start
        from: DateTime<Utc>,
        /// Exclusive end
        to: DateTime<Utc>,
    },
}

impl ReportWindow {
    /// Check the window is non-empty
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            Self::All => Ok(()),
            Self::LastDays(0) => Err(CoreError::Validation(
                "days must be positive".to_string(),
            )),
            Self::LastDays(days) if *days > MAX_REPORT_DAYS => Err(CoreError::Validation(
                format!("days must be at most {MAX_REPORT_DAYS}"),
            )),
            Self::LastDays(_) => Ok(()),
            Self::Range { from, to } if from >= to => Err(CoreError::Validation(
                "range start must be before its end".to_string(),
            )),
            Self::Range { .. } => Ok(()),
        }
    }

    /// Concrete bounds at `now`
    pub fn to_time_window(&self, now: DateTime<Utc>) -> TimeWindow {
        match *self {
            Self::All => TimeWindow::all(),
            Self::LastDays(days) => TimeWindow::trailing_days(i64::from(days), now),
            Self::Range { from, to } => TimeWindow::between(from, to),
        }
    }
}

/// Where an event's price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// The event carried a valid price and currency
    Event,
    /// Catalog default for a known product
    Catalog,
    /// Configured default for an unknown product
    Default,
}

impl PriceSource {
    /// Whether the amount is a substitute for a missing price
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Event)
    }
}

/// Revenue for one local calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueBucket {
    /// `YYYY-MM-DD` in reporting-local time
    pub period_key: String,
    /// Local calendar date
    pub date: NaiveDate,
    /// Currency of the last event folded into this day
    pub currency: Currency,
    /// Net revenue for the day, clamped at zero
    pub gross_revenue: i64,
    /// SUBSCRIBED and DID_RENEW events
    pub transaction_count: u64,
    /// REFUND events
    pub refund_count: u64,
}

/// Aggregated revenue report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueReport {
    /// Instant the report was computed for
    pub generated_at: DateTime<Utc>,
    /// Bounds the window-scoped figures cover
    pub window: TimeWindow,
    /// Net revenue in the window
    pub total: i64,
    /// Net revenue for the local calendar day of `generated_at`
    pub today: i64,
    /// Net revenue for the trailing 7 × 24h
    pub week: i64,
    /// Net revenue for the local calendar month of `generated_at`
    pub month: i64,
    /// Net revenue in the window per currency
    pub per_currency: BTreeMap<Currency, i64>,
    /// Daily buckets in the window, oldest first
    pub daily_buckets: Vec<RevenueBucket>,
    /// SUBSCRIBED events in the window
    pub new_subscriptions: u64,
    /// DID_RENEW events in the window
    pub renewals: u64,
    /// REFUND events in the window
    pub refund_count: u64,
    /// EXPIRED events in the window
    pub expirations: u64,
    /// Events of any other type in the window
    pub other_events: u64,
    /// Money-affecting events in the window priced by fallback
    pub fallback_priced_events: u64,
    /// Share of `total` that came from fallback prices
    pub estimated_revenue: i64,
}

/// Fixed reporting periods relative to `now`
#[derive(Debug, Clone, Copy)]
struct Periods {
    today: TimeWindow,
    week: TimeWindow,
    month: TimeWindow,
}

impl Periods {
    fn at(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_today = now.with_timezone(&offset).date_naive();
        let today_start = local_midnight(local_today, offset);
        let tomorrow_start = local_midnight(local_today + TimeDelta::days(1), offset);
        let month_start = local_midnight(
            local_today - TimeDelta::days(i64::from(local_today.day0())),
            offset,
        );

        Self {
            today: TimeWindow::between(today_start, tomorrow_start),
            week: TimeWindow::trailing_days(7, now),
            month: TimeWindow::between(month_start, tomorrow_start),
        }
    }

    fn earliest(&self) -> Option<DateTime<Utc>> {
        self.month.from.min(self.week.from)
    }

    fn latest(&self) -> Option<DateTime<Utc>> {
        self.today.to.max(self.week.to)
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    (local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// +1 for money in, -1 for money out, `None` for count-only types
fn direction(notification_type: &NotificationType) -> Option<i64> {
    match notification_type {
        NotificationType::Subscribed | NotificationType::DidRenew => Some(1),
        NotificationType::Refund => Some(-1),
        _ => None,
    }
}

#[derive(Debug)]
struct DayTally {
    currency: Currency,
    net: i64,
    transactions: u64,
    refunds: u64,
}

#[derive(Debug, Default)]
struct Tally {
    total: i64,
    today: i64,
    week: i64,
    month: i64,
    per_currency: BTreeMap<Currency, i64>,
    days: BTreeMap<NaiveDate, DayTally>,
    new_subscriptions: u64,
    renewals: u64,
    refunds: u64,
    expirations: u64,
    other_events: u64,
    fallback_priced: u64,
    estimated: i64,
}

impl Tally {
    fn count(&mut self, notification_type: &NotificationType) {
        match notification_type {
            NotificationType::Subscribed => self.new_subscriptions += 1,
            NotificationType::DidRenew => self.renewals += 1,
            NotificationType::Refund => self.refunds += 1,
            NotificationType::Expired => self.expirations += 1,
            _ => self.other_events += 1,
        }
    }

    fn publish(self, generated_at: DateTime<Utc>, window: TimeWindow) -> RevenueReport {
        RevenueReport {
            generated_at,
            window,
            total: self.total.max(0),
            today: self.today.max(0),
            week: self.week.max(0),
            month: self.month.max(0),
            per_currency: self
                .per_currency
                .into_iter()
                .map(|(currency, net)| (currency, net.max(0)))
                .collect(),
            daily_buckets: self
                .days
                .into_iter()
                .map(|(date, day)| RevenueBucket {
                    period_key: date.format("%Y-%m-%d").to_string(),
                    date,
                    currency: day.currency,
                    gross_revenue: day.net.max(0),
                    transaction_count: day.transactions,
                    refund_count: day.refunds,
                })
                .collect(),
            new_subscriptions: self.new_subscriptions,
            renewals: self.renewals,
            refund_count: self.refunds,
            expirations: self.expirations,
            other_events: self.other_events,
            fallback_priced_events: self.fallback_priced,
            estimated_revenue: self.estimated.max(0),
        }
    }
}

/// Folds notification events into revenue figures
#[derive(Debug, Clone)]
pub struct RevenueAggregator {
    config: RevenueConfig,
}

impl RevenueAggregator {
    /// Create a new aggregator
    pub fn new(config: RevenueConfig) -> Self {
        Self { config }
    }

    /// Price of a single event, with its source.
    ///
    /// The event's own price is used when it is positive and its currency is
    /// a valid code; otherwise the catalog default for the product, and
    /// failing that the configured default.
    pub fn price_of(&self, event: &NotificationEvent) -> (Money, PriceSource) {
        let own = event
            .price
            .filter(|price| *price > 0)
            .zip(event.currency.as_deref().and_then(|c| Currency::parse(c).ok()));
        if let Some((amount, currency)) = own {
            return (Money::new(amount, currency), PriceSource::Event);
        }

        let (money, source) = match self.config.catalog.lookup(&event.product_id) {
            CatalogLookup::Known(entry) => (entry.default_price.clone(), PriceSource::Catalog),
            CatalogLookup::Unknown(_) => (self.config.default_price.clone(), PriceSource::Default),
        };
        warn!(
            notification_uuid = %event.notification_uuid,
            product_id = %event.product_id,
            source = ?source,
            "Notification has no usable price, using fallback"
        );
        (money, source)
    }

    /// Aggregate `events` for `window` at `now`.
    ///
    /// `total`, `per_currency`, buckets and counts cover events inside the
    /// window. `today`, `week` and `month` are fixed periods around `now` and
    /// cover every supplied event. The result does not depend on input order.
    pub fn aggregate_revenue(
        &self,
        events: &[NotificationEvent],
        window: &ReportWindow,
        now: DateTime<Utc>,
    ) -> RevenueReport {
        let offset = self.config.utc_offset;
        let bounds = window.to_time_window(now);
        let periods = Periods::at(now, offset);

        let mut ordered: Vec<&NotificationEvent> = events.iter().collect();
        ordered.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.notification_uuid.cmp(&b.notification_uuid))
        });

        let mut tally = Tally::default();
        for event in ordered {
            let in_window = bounds.contains(event.created_at);
            if in_window {
                tally.count(&event.notification_type);
            }

            let Some(sign) = direction(&event.notification_type) else {
                continue;
            };
            let (price, source) = self.price_of(event);
            let amount = price.amount_minor.saturating_mul(sign);

            if periods.today.contains(event.created_at) {
                tally.today = tally.today.saturating_add(amount);
            }
            if periods.week.contains(event.created_at) {
                tally.week = tally.week.saturating_add(amount);
            }
            if periods.month.contains(event.created_at) {
                tally.month = tally.month.saturating_add(amount);
            }
            if !in_window {
                continue;
            }

            tally.total = tally.total.saturating_add(amount);
            let net = tally.per_currency.entry(price.currency.clone()).or_default();
            *net = net.saturating_add(amount);
            if source.is_fallback() {
                tally.fallback_priced += 1;
                tally.estimated = tally.estimated.saturating_add(amount);
            }

            let date = event.created_at.with_timezone(&offset).date_naive();
            let day = tally.days.entry(date).or_insert_with(|| DayTally {
                currency: price.currency.clone(),
                net: 0,
                transactions: 0,
                refunds: 0,
            });
            day.currency = price.currency;
            day.net = day.net.saturating_add(amount);
            if sign > 0 {
                day.transactions += 1;
            } else {
                day.refunds += 1;
            }
        }

        tally.publish(now, bounds)
    }

    /// Smallest window to fetch so every figure of a report can be computed
    pub fn query_window(&self, window: &ReportWindow, now: DateTime<Utc>) -> TimeWindow {
        let requested = window.to_time_window(now);
        let periods = Periods::at(now, self.config.utc_offset);
        TimeWindow {
            from: requested.from.and_then(|from| periods.earliest().map(|e| from.min(e))),
            to: requested.to.and_then(|to| periods.latest().map(|l| to.max(l))),
        }
    }

    /// Fetch events from `store` and aggregate them
    #[instrument(skip(self, store))]
    pub async fn report<N: NotificationStore + ?Sized>(
        &self,
        store: &N,
        window: &ReportWindow,
        now: DateTime<Utc>,
    ) -> CoreResult<RevenueReport> {
        window.validate()?;
        let fetch = self.query_window(window, now);
        let events = store.query(&fetch).await?;
        debug!(events = events.len(), "Aggregating revenue");
        Ok(self.aggregate_revenue(&events, window, now))
    }
}
