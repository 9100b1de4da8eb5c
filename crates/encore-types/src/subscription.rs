//! Subscription types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ParseError, UserId};

/// Subscription plan type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    /// Free, time-boxed trial
    Trial,
    /// Monthly paid plan
    Monthly,
    /// Yearly paid plan
    Yearly,
    /// Never-ending access
    Lifetime,
    /// No subscription on record
    None,
}

impl SubscriptionType {
    /// Get the wire name of this type
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Lifetime => "lifetime",
            Self::None => "none",
        }
    }

    /// Whether an admin may grant this type directly
    pub const fn is_grantable(&self) -> bool {
        matches!(self, Self::Monthly | Self::Yearly | Self::Lifetime)
    }
}

impl std::fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trial" => Ok(Self::Trial),
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" => Ok(Self::Yearly),
            "lifetime" => Ok(Self::Lifetime),
            "none" => Ok(Self::None),
            _ => Err(ParseError::SubscriptionType(s.to_string())),
        }
    }
}

/// Subscription record owned by a user.
///
/// `end_date` and `trial_end_date` are independent and may both be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Plan type
    #[serde(rename = "type")]
    pub subscription_type: SubscriptionType,
    /// Paid subscription is active
    pub is_active: bool,
    /// Access was granted by an admin rather than a payment
    pub granted_by_admin: bool,
    /// When the current plan started
    pub start_date: DateTime<Utc>,
    /// End of paid/granted access (`None` is unbounded for lifetime)
    pub end_date: Option<DateTime<Utc>>,
    /// End of trial access
    pub trial_end_date: Option<DateTime<Utc>>,
    /// Payment-provider transaction the subscription originated from
    pub original_transaction_id: Option<String>,
}

impl Subscription {
    /// Empty record for a user with no subscription history
    pub fn none(now: DateTime<Utc>) -> Self {
        Self {
            subscription_type: SubscriptionType::None,
            is_active: false,
            granted_by_admin: false,
            start_date: now,
            end_date: None,
            trial_end_date: None,
            original_transaction_id: None,
        }
    }
}

/// A user's subscription as listed for admin queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubscription {
    /// Owner of the subscription
    pub user_id: UserId,
    /// Current subscription record
    pub subscription: Subscription,
}

/// Derived access status. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Unexpired paid or admin-granted access
    Premium,
    /// Trial still running
    TrialActive,
    /// No current access
    Expired,
}

impl SubscriptionStatus {
    /// Get the wire name of this status
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::TrialActive => "trial_active",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action recorded in the subscription history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// Paid subscription started
    Started,
    /// Paid subscription renewed
    Renewed,
    /// Admin extended the end date
    Extended,
    /// Subscription cancelled
    Cancelled,
    /// Admin granted access
    AdminGranted,
    /// Admin revoked access
    AdminRevoked,
    /// Trial started (custom trial grant)
    TrialStarted,
    /// Trial reset to the standard length
    TrialReset,
}

impl HistoryAction {
    /// Get the wire name of this action
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Renewed => "renewed",
            Self::Extended => "extended",
            Self::Cancelled => "cancelled",
            Self::AdminGranted => "admin_granted",
            Self::AdminRevoked => "admin_revoked",
            Self::TrialStarted => "trial_started",
            Self::TrialReset => "trial_reset",
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HistoryAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "started" => Self::Started,
            "renewed" => Self::Renewed,
            "extended" => Self::Extended,
            "cancelled" => Self::Cancelled,
            "admin_granted" => Self::AdminGranted,
            "admin_revoked" => Self::AdminRevoked,
            "trial_started" => Self::TrialStarted,
            "trial_reset" => Self::TrialReset,
            other => return Err(ParseError::HistoryAction(other.to_string())),
        })
    }
}

/// Append-only audit entry, written exactly once per mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the mutation happened
    pub date: DateTime<Utc>,
    /// What happened
    pub action: HistoryAction,
    /// Plan type the entry refers to
    #[serde(rename = "type")]
    pub subscription_type: SubscriptionType,
    /// Resulting end date (paid end or trial end, depending on the action)
    pub end_date: Option<DateTime<Utc>>,
    /// Free-form reason supplied by the admin
    pub reason: Option<String>,
    /// Admin who performed the mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<String>,
}
