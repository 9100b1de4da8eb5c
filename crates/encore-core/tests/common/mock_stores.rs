//! Store doubles for failure and race scenarios

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use encore_db::{
    DbError, DbResult, MemorySubscriptionStore, SubscriptionStore, VersionedSubscription,
};
use encore_types::{HistoryEntry, Subscription, UserId, UserSubscription};

/// Wraps a memory store and, on the first `put`, slips in a competing write
/// between the caller's read and its write.
#[derive(Debug, Default)]
pub struct InterleavingStore {
    pub inner: MemorySubscriptionStore,
    fired: AtomicBool,
}

impl InterleavingStore {
    pub fn new(inner: MemorySubscriptionStore) -> Self {
        Self {
            inner,
            fired: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SubscriptionStore for InterleavingStore {
    async fn get(&self, user_id: &UserId) -> DbResult<Option<VersionedSubscription>> {
        self.inner.get(user_id).await
    }

    async fn put(
        &self,
        user_id: &UserId,
        expected_version: Option<i64>,
        subscription: &Subscription,
        entry: &HistoryEntry,
    ) -> DbResult<i64> {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.inner
                .put(user_id, expected_version, subscription, entry)
                .await?;
        }
        self.inner
            .put(user_id, expected_version, subscription, entry)
            .await
    }

    async fn history(&self, user_id: &UserId) -> DbResult<Vec<HistoryEntry>> {
        self.inner.history(user_id).await
    }

    async fn list(&self) -> DbResult<Vec<UserSubscription>> {
        self.inner.list().await
    }
}

/// Store whose every call fails as if the database were down
#[derive(Debug, Default)]
pub struct UnavailableStore;

#[async_trait]
impl SubscriptionStore for UnavailableStore {
    async fn get(&self, _: &UserId) -> DbResult<Option<VersionedSubscription>> {
        Err(unavailable())
    }

    async fn put(
        &self,
        _: &UserId,
        _: Option<i64>,
        _: &Subscription,
        _: &HistoryEntry,
    ) -> DbResult<i64> {
        Err(unavailable())
    }

    async fn history(&self, _: &UserId) -> DbResult<Vec<HistoryEntry>> {
        Err(unavailable())
    }

    async fn list(&self) -> DbResult<Vec<UserSubscription>> {
        Err(unavailable())
    }
}

fn unavailable() -> DbError {
    DbError::Corrupt("store unavailable".to_string())
}
