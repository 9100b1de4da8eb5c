//! Configuration for the Admin API service.

use std::time::Duration;

use chrono::FixedOffset;
use encore_core::{CoreConfig, ProductCatalog, RevenueConfig};
use encore_types::{Currency, Money};

/// Admin API configuration
#[derive(Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL; in-memory stores are used when absent
    pub database_url: Option<String>,
    /// Maximum pooled database connections
    pub database_max_connections: u32,
    /// Bearer token the dashboard must present
    pub admin_api_token: String,
    /// Shared secret for provider webhook signatures
    pub webhook_secret: String,
    /// Subscription core configuration
    pub core: CoreConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("DATABASE_MAX_CONNECTIONS"))?;

        let http_port = lookup("HTTP_PORT")
            .unwrap_or_else(|| "8083".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Credentials
        let admin_api_token = lookup("ADMIN_API_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::Missing("ADMIN_API_TOKEN"))?;

        let webhook_secret = lookup("WEBHOOK_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("WEBHOOK_SECRET"))?;

        // Revenue reporting
        let offset_minutes: i32 = lookup("REPORTING_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|| "0".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REPORTING_UTC_OFFSET_MINUTES"))?;
        let utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::Invalid("REPORTING_UTC_OFFSET_MINUTES"))?;

        let default_price_minor: i64 = lookup("DEFAULT_PRICE_MINOR")
            .unwrap_or_else(|| "9990".to_string())
            .parse()
            .ok()
            .filter(|price| *price > 0)
            .ok_or(ConfigError::Invalid("DEFAULT_PRICE_MINOR"))?;

        let default_currency = Currency::parse(
            &lookup("DEFAULT_CURRENCY").unwrap_or_else(|| "TRY".to_string()),
        )
        .map_err(|_| ConfigError::Invalid("DEFAULT_CURRENCY"))?;

        let catalog = match lookup("PRODUCT_CATALOG") {
            Some(json) => ProductCatalog::from_json(&json)
                .map_err(|_| ConfigError::Invalid("PRODUCT_CATALOG"))?,
            None => ProductCatalog::new(),
        };

        // Request timeout
        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Metrics
        let metrics_enabled = lookup("METRICS_ENABLED")
            .unwrap_or_else(|| "true".to_string())
            .parse()
            .unwrap_or(true);

        let revenue = RevenueConfig::new(Money::new(default_price_minor, default_currency))
            .with_utc_offset(utc_offset)
            .with_catalog(catalog);

        Ok(Self {
            http_port,
            database_url,
            database_max_connections,
            admin_api_token,
            webhook_secret,
            core: CoreConfig::new(revenue),
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("database", &self.database_url.as_ref().map(|_| "[redacted]"))
            .field("core", &self.core)
            .field("request_timeout", &self.request_timeout)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish_non_exhaustive()
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
