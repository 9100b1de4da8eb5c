//! Payment-provider notification events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification types sent by the app-store payment provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    /// First purchase of a subscription
    Subscribed,
    /// Successful auto-renewal
    DidRenew,
    /// Subscription lapsed
    Expired,
    /// Provider refunded a transaction
    Refund,
    /// User toggled auto-renew
    DidChangeRenewalStatus,
    /// Renewal attempt failed
    DidFailToRenew,
    /// Anything else the provider sends
    Other(String),
}

impl NotificationType {
    /// Get the provider's wire name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Subscribed => "SUBSCRIBED",
            Self::DidRenew => "DID_RENEW",
            Self::Expired => "EXPIRED",
            Self::Refund => "REFUND",
            Self::DidChangeRenewalStatus => "DID_CHANGE_RENEWAL_STATUS",
            Self::DidFailToRenew => "DID_FAIL_TO_RENEW",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for NotificationType {
    fn from(s: &str) -> Self {
        match s {
            "SUBSCRIBED" => Self::Subscribed,
            "DID_RENEW" => Self::DidRenew,
            "EXPIRED" => Self::Expired,
            "REFUND" => Self::Refund,
            "DID_CHANGE_RENEWAL_STATUS" => Self::DidChangeRenewalStatus,
            "DID_FAIL_TO_RENEW" => Self::DidFailToRenew,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NotificationType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<NotificationType> for String {
    fn from(t: NotificationType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification as persisted by the webhook collaborator.
///
/// Immutable once ingested. `price` and `currency` come straight from the
/// provider payload and may be missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    /// Provider-assigned unique ID (idempotency key)
    pub notification_uuid: String,
    /// When the provider created the notification
    pub created_at: DateTime<Utc>,
    /// Notification type
    pub notification_type: NotificationType,
    /// Store product identifier
    pub product_id: String,
    /// Price in minor units; `None` when missing or not an integer
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<i64>,
    /// Currency code as sent by the provider; `None` when not a string
    #[serde(default, deserialize_with = "lenient")]
    pub currency: Option<String>,
    /// Original transaction the subscription chain started from
    #[serde(default)]
    pub original_transaction_id: Option<String>,
    /// Platform username the transaction belongs to
    #[serde(default)]
    pub username: Option<String>,
}

/// Either a well-typed value or anything else the provider sent
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Malformed(serde::de::IgnoredAny),
}

/// Deserialize a field that may arrive with the wrong JSON type.
///
/// Malformed values become `None` so the event is still accepted and the
/// aggregator prices it by fallback.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Valid(value) => Some(value),
        Lenient::Malformed(_) => None,
    })
}
