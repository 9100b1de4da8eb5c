//! Encore Core - Subscription lifecycle and revenue logic
//!
//! - [`remaining`]: time left until an absolute end instant
//! - [`status`]: status derivation from a stored subscription
//! - [`mutation`]: admin commands (grant, extend, revoke, trial resets)
//! - [`revenue`]: revenue aggregation over provider notifications
//! - [`query`]: admin user listing by derived status
//! - [`webhook`]: signed notification ingestion
//!
//! Every function that depends on the clock takes `now` as a parameter.
//!
//! # Example
//!
//! ```rust,ignore
//! use encore_core::{CoreConfig, SubscriptionMutationService};
//!
//! let service = SubscriptionMutationService::new(store, config);
//! let outcome = service
//!     .grant(&ctx, &user_id, SubscriptionType::Monthly, 30, None, Utc::now())
//!     .await?;
//! assert_eq!(outcome.status, SubscriptionStatus::Premium);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod mutation;
pub mod query;
pub mod remaining;
pub mod revenue;
pub mod status;
pub mod webhook;

pub use catalog::{CatalogEntry, CatalogLookup, ProductCatalog, ProductCode};
pub use config::{CoreConfig, RevenueConfig, DEFAULT_EXPIRING_SOON_DAYS, DEFAULT_TRIAL_RESET_DAYS};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use mutation::{AdminCommand, Mutation, MutationOutcome, SubscriptionMutationService};
pub use query::{AdminQueryService, StatusCounts, StatusFilter, UserStatusView};
pub use remaining::{remaining, TimeRemaining};
pub use revenue::{
    PriceSource, ReportWindow, RevenueAggregator, RevenueBucket, RevenueReport, MAX_REPORT_DAYS,
};
pub use status::{resolve_status, status_end_date, status_remaining};
pub use webhook::{IngestOutcome, NotificationIngestor, WebhookVerifier};
