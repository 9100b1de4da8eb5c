//! In-memory stores
//!
//! Backed by [`DashMap`]. A subscription `put` holds the shard lock for the
//! user across the version check, the record write and the history append,
//! so it is atomic with respect to every other writer of the same user.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use encore_types::{
    HistoryEntry, NotificationEvent, Subscription, TimeWindow, UserId, UserSubscription,
};

use crate::error::{DbError, DbResult};
use crate::repo::{NotificationStore, SubscriptionStore, VersionedSubscription};

#[derive(Debug, Clone)]
struct UserRecord {
    subscription: Subscription,
    version: i64,
    history: Vec<HistoryEntry>,
}

/// In-memory subscription store
#[derive(Debug, Default, Clone)]
pub struct MemorySubscriptionStore {
    records: Arc<DashMap<UserId, UserRecord>>,
}

impl MemorySubscriptionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn get(&self, user_id: &UserId) -> DbResult<Option<VersionedSubscription>> {
        Ok(self.records.get(user_id).map(|record| VersionedSubscription {
            subscription: record.subscription.clone(),
            version: record.version,
        }))
    }

    async fn put(
        &self,
        user_id: &UserId,
        expected_version: Option<i64>,
        subscription: &Subscription,
        entry: &HistoryEntry,
    ) -> DbResult<i64> {
        match (self.records.entry(*user_id), expected_version) {
            (Entry::Occupied(mut occupied), Some(expected))
                if occupied.get().version == expected =>
            {
                let record = occupied.get_mut();
                record.subscription = subscription.clone();
                record.version += 1;
                record.history.push(entry.clone());
                Ok(record.version)
            }
            (Entry::Vacant(vacant), None) => {
                vacant.insert(UserRecord {
                    subscription: subscription.clone(),
                    version: 1,
                    history: vec![entry.clone()],
                });
                Ok(1)
            }
            _ => {
                tracing::warn!(user_id = %user_id, ?expected_version, "Subscription version conflict");
                Err(DbError::Conflict)
            }
        }
    }

    async fn history(&self, user_id: &UserId) -> DbResult<Vec<HistoryEntry>> {
        let mut history = self
            .records
            .get(user_id)
            .map(|record| record.history.clone())
            .unwrap_or_default();
        // Entries are appended in commit order; a stable sort keeps ties in that order.
        history.sort_by_key(|entry| entry.date);
        Ok(history)
    }

    async fn list(&self) -> DbResult<Vec<UserSubscription>> {
        let mut users: Vec<UserSubscription> = self
            .records
            .iter()
            .map(|record| UserSubscription {
                user_id: *record.key(),
                subscription: record.subscription.clone(),
            })
            .collect();
        users.sort_by_key(|user| user.user_id);
        Ok(users)
    }
}

/// In-memory notification store
#[derive(Debug, Default, Clone)]
pub struct MemoryNotificationStore {
    events: Arc<DashMap<String, NotificationEvent>>,
}

impl MemoryNotificationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with events (duplicates are ignored)
    pub fn with_events(events: impl IntoIterator<Item = NotificationEvent>) -> Self {
        let store = Self::new();
        for event in events {
            store
                .events
                .entry(event.notification_uuid.clone())
                .or_insert(event);
        }
        store
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn query(&self, window: &TimeWindow) -> DbResult<Vec<NotificationEvent>> {
        let mut events: Vec<NotificationEvent> = self
            .events
            .iter()
            .filter(|event| window.contains(event.created_at))
            .map(|event| event.value().clone())
            .collect();
        events.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.notification_uuid.cmp(&b.notification_uuid))
        });
        Ok(events)
    }

    async fn insert(&self, event: &NotificationEvent) -> DbResult<bool> {
        match self.events.entry(event.notification_uuid.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(event.clone());
                Ok(true)
            }
        }
    }
}
