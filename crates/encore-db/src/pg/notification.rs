//! PostgreSQL notification store implementation

use async_trait::async_trait;
use sqlx::PgPool;

use encore_types::{NotificationEvent, TimeWindow};

use crate::error::DbResult;
use crate::models::NotificationRow;
use crate::repo::NotificationStore;

/// PostgreSQL notification store
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    /// Create a new notification store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn query(&self, window: &TimeWindow) -> DbResult<Vec<NotificationEvent>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT notification_uuid, created_at, notification_type, product_id, price,
                   currency, original_transaction_id, username
            FROM notification_events
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
            ORDER BY created_at ASC, notification_uuid ASC
            "#,
        )
        .bind(window.from)
        .bind(window.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(NotificationEvent::from).collect())
    }

    async fn insert(&self, event: &NotificationEvent) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification_events (notification_uuid, created_at, notification_type,
                                             product_id, price, currency,
                                             original_transaction_id, username)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (notification_uuid) DO NOTHING
            "#,
        )
        .bind(&event.notification_uuid)
        .bind(event.created_at)
        .bind(event.notification_type.as_str())
        .bind(&event.product_id)
        .bind(event.price)
        .bind(&event.currency)
        .bind(&event.original_transaction_id)
        .bind(&event.username)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
