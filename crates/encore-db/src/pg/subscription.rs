//! PostgreSQL subscription store implementation

use async_trait::async_trait;
use sqlx::PgPool;

use encore_types::{HistoryEntry, Subscription, UserId, UserSubscription};

use crate::error::{DbError, DbResult};
use crate::models::{HistoryRow, SubscriptionRow};
use crate::repo::{SubscriptionStore, VersionedSubscription};

/// PostgreSQL subscription store
#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    /// Create a new subscription store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn get(&self, user_id: &UserId) -> DbResult<Option<VersionedSubscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT user_id, subscription_type, is_active, granted_by_admin, start_date,
                   end_date, trial_end_date, original_transaction_id, version
            FROM user_subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VersionedSubscription::try_from).transpose()
    }

    async fn put(
        &self,
        user_id: &UserId,
        expected_version: Option<i64>,
        subscription: &Subscription,
        entry: &HistoryEntry,
    ) -> DbResult<i64> {
        let mut tx = self.pool.begin().await?;

        let new_version: Option<i64> = match expected_version {
            Some(version) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    UPDATE user_subscriptions
                    SET subscription_type = $1, is_active = $2, granted_by_admin = $3,
                        start_date = $4, end_date = $5, trial_end_date = $6,
                        original_transaction_id = $7, version = version + 1, updated_at = NOW()
                    WHERE user_id = $8 AND version = $9
                    RETURNING version
                    "#,
                )
                .bind(subscription.subscription_type.as_str())
                .bind(subscription.is_active)
                .bind(subscription.granted_by_admin)
                .bind(subscription.start_date)
                .bind(subscription.end_date)
                .bind(subscription.trial_end_date)
                .bind(&subscription.original_transaction_id)
                .bind(user_id.0)
                .bind(version)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO user_subscriptions (user_id, subscription_type, is_active,
                                                    granted_by_admin, start_date, end_date,
                                                    trial_end_date, original_transaction_id,
                                                    version)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1)
                    ON CONFLICT (user_id) DO NOTHING
                    RETURNING version
                    "#,
                )
                .bind(user_id.0)
                .bind(subscription.subscription_type.as_str())
                .bind(subscription.is_active)
                .bind(subscription.granted_by_admin)
                .bind(subscription.start_date)
                .bind(subscription.end_date)
                .bind(subscription.trial_end_date)
                .bind(&subscription.original_transaction_id)
                .fetch_optional(&mut *tx)
                .await?
            }
        };

        let Some(new_version) = new_version else {
            tx.rollback().await?;
            tracing::warn!(user_id = %user_id, ?expected_version, "Subscription version conflict");
            return Err(DbError::Conflict);
        };

        sqlx::query(
            r#"
            INSERT INTO subscription_history (user_id, date, action, subscription_type,
                                              end_date, reason, performed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id.0)
        .bind(entry.date)
        .bind(entry.action.as_str())
        .bind(entry.subscription_type.as_str())
        .bind(entry.end_date)
        .bind(&entry.reason)
        .bind(&entry.performed_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(new_version)
    }

    async fn history(&self, user_id: &UserId) -> DbResult<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT user_id, date, action, subscription_type, end_date, reason, performed_by
            FROM subscription_history
            WHERE user_id = $1
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryEntry::try_from).collect()
    }

    async fn list(&self) -> DbResult<Vec<UserSubscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT user_id, subscription_type, is_active, granted_by_admin, start_date,
                   end_date, trial_end_date, original_transaction_id, version
            FROM user_subscriptions
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserSubscription::try_from).collect()
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
