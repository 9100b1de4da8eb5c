//! Core configuration

use chrono::{FixedOffset, Offset, Utc};

use encore_types::Money;

use crate::catalog::ProductCatalog;

/// Length of a standard trial reset, in days
pub const DEFAULT_TRIAL_RESET_DAYS: i64 = 7;

/// A subscription is "expiring soon" when this many days or fewer remain
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 3;

/// Revenue aggregation configuration
#[derive(Debug, Clone)]
pub struct RevenueConfig {
    /// Price used when neither the event nor the catalog supplies one
    pub default_price: Money,
    /// Offset of the dashboard's local time (calendar day/month boundaries)
    pub utc_offset: FixedOffset,
    /// Product catalog for fallback pricing
    pub catalog: ProductCatalog,
}

impl RevenueConfig {
    /// Create a revenue config with a default price, UTC reporting and an empty catalog
    pub fn new(default_price: Money) -> Self {
        Self {
            default_price,
            utc_offset: Utc.fix(),
            catalog: ProductCatalog::new(),
        }
    }

    /// Set the local reporting offset
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Set the product catalog
    pub fn with_catalog(mut self, catalog: ProductCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}

/// Subscription core configuration
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Trial length applied by `reset_trial`
    pub trial_reset_days: i64,
    /// Threshold for the "expiring soon" filter
    pub expiring_soon_days: i64,
    /// Revenue aggregation settings
    pub revenue: RevenueConfig,
}

impl CoreConfig {
    /// Create a config with the standard trial and expiry thresholds
    pub fn new(revenue: RevenueConfig) -> Self {
        Self {
            trial_reset_days: DEFAULT_TRIAL_RESET_DAYS,
            expiring_soon_days: DEFAULT_EXPIRING_SOON_DAYS,
            revenue,
        }
    }

    /// Set trial reset length
    pub fn with_trial_reset_days(mut self, days: i64) -> Self {
        self.trial_reset_days = days;
        self
    }

    /// Set the expiring-soon threshold
    pub fn with_expiring_soon_days(mut self, days: i64) -> Self {
        self.expiring_soon_days = days;
        self
    }
}
