//! PostgreSQL store implementations

mod notification;
mod subscription;

pub use notification::PgNotificationStore;
pub use subscription::PgSubscriptionStore;

use crate::DbPool;

/// All stores bundled together
#[derive(Clone)]
pub struct Repositories {
    pub subscriptions: PgSubscriptionStore,
    pub notifications: PgNotificationStore,
}

impl Repositories {
    /// Create all stores from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            subscriptions: PgSubscriptionStore::new(pool.clone()),
            notifications: PgNotificationStore::new(pool),
        }
    }
}
