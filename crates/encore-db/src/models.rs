//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use encore_types::{
    HistoryEntry, NotificationEvent, NotificationType, Subscription, UserId, UserSubscription,
};

use crate::error::DbError;
use crate::repo::VersionedSubscription;

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub user_id: Uuid,
    pub subscription_type: String,
    pub is_active: bool,
    pub granted_by_admin: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub original_transaction_id: Option<String>,
    pub version: i64,
}

/// History row from the database
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub action: String,
    pub subscription_type: String,
    pub end_date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub performed_by: Option<String>,
}

/// Notification row from the database
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub notification_uuid: String,
    pub created_at: DateTime<Utc>,
    pub notification_type: String,
    pub product_id: String,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub original_transaction_id: Option<String>,
    pub username: Option<String>,
}

impl SubscriptionRow {
    fn subscription(&self) -> Result<Subscription, DbError> {
        Ok(Subscription {
            subscription_type: self
                .subscription_type
                .parse()
                .map_err(|e| DbError::Corrupt(format!("subscription {}: {e}", self.user_id)))?,
            is_active: self.is_active,
            granted_by_admin: self.granted_by_admin,
            start_date: self.start_date,
            end_date: self.end_date,
            trial_end_date: self.trial_end_date,
            original_transaction_id: self.original_transaction_id.clone(),
        })
    }
}

impl TryFrom<SubscriptionRow> for VersionedSubscription {
    type Error = DbError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            subscription: row.subscription()?,
            version: row.version,
        })
    }
}

impl TryFrom<SubscriptionRow> for UserSubscription {
    type Error = DbError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            subscription: row.subscription()?,
            user_id: UserId(row.user_id),
        })
    }
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = DbError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let user_id = row.user_id;
        let corrupt =
            |e: encore_types::ParseError| DbError::Corrupt(format!("history of {user_id}: {e}"));
        Ok(Self {
            date: row.date,
            action: row.action.parse().map_err(corrupt)?,
            subscription_type: row.subscription_type.parse().map_err(corrupt)?,
            end_date: row.end_date,
            reason: row.reason,
            performed_by: row.performed_by,
        })
    }
}

impl From<NotificationRow> for NotificationEvent {
    fn from(row: NotificationRow) -> Self {
        Self {
            notification_uuid: row.notification_uuid,
            created_at: row.created_at,
            notification_type: NotificationType::from(row.notification_type),
            product_id: row.product_id,
            price: row.price,
            currency: row.currency,
            original_transaction_id: row.original_transaction_id,
            username: row.username,
        }
    }
}
