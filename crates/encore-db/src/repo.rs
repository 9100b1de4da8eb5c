//! Store traits
//!
//! Async interfaces the core talks to. All I/O happens behind these.

use async_trait::async_trait;
use encore_types::{
    HistoryEntry, NotificationEvent, Subscription, TimeWindow, UserId, UserSubscription,
};

use crate::error::DbResult;

/// A stored subscription together with its optimistic-concurrency version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedSubscription {
    /// Current record
    pub subscription: Subscription,
    /// Version the record was read at
    pub version: i64,
}

/// Subscription store trait
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Current subscription of a user, if one was ever written
    async fn get(&self, user_id: &UserId) -> DbResult<Option<VersionedSubscription>>;

    /// Write a new subscription state and its history entry atomically.
    ///
    /// `expected_version` is the version returned by [`get`](Self::get), or
    /// `None` if no record existed. Returns the new version, or
    /// [`DbError::Conflict`](crate::DbError::Conflict) if the stored version
    /// differs; in that case neither the record nor the history changes.
    async fn put(
        &self,
        user_id: &UserId,
        expected_version: Option<i64>,
        subscription: &Subscription,
        entry: &HistoryEntry,
    ) -> DbResult<i64>;

    /// History of a user ordered by date (oldest first)
    async fn history(&self, user_id: &UserId) -> DbResult<Vec<HistoryEntry>>;

    /// All stored subscriptions
    async fn list(&self) -> DbResult<Vec<UserSubscription>>;

    /// Cheap connectivity probe
    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// Notification store trait (read side is immutable)
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Events created inside `window`, ordered by `created_at`
    async fn query(&self, window: &TimeWindow) -> DbResult<Vec<NotificationEvent>>;

    /// Persist an event. Returns `false` if its `notification_uuid` was
    /// already stored (the existing event is kept untouched).
    async fn insert(&self, event: &NotificationEvent) -> DbResult<bool>;
}
