//! Encore DB - Storage abstractions
//!
//! Store traits for subscriptions (with their append-only history) and for
//! ingested payment notifications, plus two implementations:
//! - [`memory`]: lock-sharded in-process stores for tests and local runs
//! - [`pg`]: SQLx/PostgreSQL stores
//!
//! Subscription writes are versioned. A `put` carries the version that was
//! read; if another writer got there first the store returns
//! [`DbError::Conflict`] and nothing is written.
//!
//! # Example
//!
//! ```rust,ignore
//! use encore_db::{create_pool, Repositories, SubscriptionStore};
//!
//! let pool = create_pool("postgres://localhost/encore", 10).await?;
//! let repos = Repositories::new(pool);
//!
//! let current = repos.subscriptions.get(&user_id).await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use memory::{MemoryNotificationStore, MemorySubscriptionStore};
pub use pg::Repositories;
pub use pool::{create_pool, run_migrations, DbPool};
pub use repo::*;
