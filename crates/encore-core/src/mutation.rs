//! Admin subscription lifecycle commands
//!
//! Each command is planned as a pure function of the current record and
//! `now`, producing the new record and exactly one history entry. The
//! service then writes both through the store in one versioned `put`; a
//! failed validation, precondition or version check writes nothing.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use encore_db::SubscriptionStore;
use encore_types::{
    AdminContext, HistoryAction, HistoryEntry, Subscription, SubscriptionStatus, SubscriptionType,
    UserId,
};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::status::resolve_status;

/// An admin command against one user's subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Grant paid-tier access without a payment
    Grant {
        /// Monthly, yearly or lifetime
        subscription_type: SubscriptionType,
        /// Length of access; ignored for lifetime
        duration_days: i64,
        /// Admin-supplied reason
        reason: Option<String>,
    },
    /// Push the end date out.
    ///
    /// Only `end_date` moves. A trial user stays `trial_active` because
    /// `is_active` and `granted_by_admin` are untouched; use `Grant` to
    /// give premium access.
    Extend {
        /// Days to add
        days: i64,
        /// Admin-supplied reason
        reason: Option<String>,
    },
    /// End premium access now
    Revoke {
        /// Admin-supplied reason
        reason: Option<String>,
    },
    /// Restart the standard trial
    ResetTrial,
    /// Start a trial of arbitrary length
    GrantCustomTrial {
        /// Days of trial
        days: u32,
        /// Additional hours
        hours: u32,
        /// Additional minutes
        minutes: u32,
        /// Admin-supplied reason
        reason: Option<String>,
    },
}

impl AdminCommand {
    /// Short name used in logs and metrics
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Grant { .. } => "grant",
            Self::Extend { .. } => "extend",
            Self::Revoke { .. } => "revoke",
            Self::ResetTrial => "reset_trial",
            Self::GrantCustomTrial { .. } => "grant_custom_trial",
        }
    }

    /// Plan the command against `current`.
    ///
    /// Parameters are validated before the status precondition is checked.
    pub fn plan(
        &self,
        current: &Subscription,
        ctx: &AdminContext,
        config: &CoreConfig,
        now: DateTime<Utc>,
    ) -> CoreResult<Mutation> {
        match self {
            Self::Grant {
                subscription_type,
                duration_days,
                reason,
            } => plan_grant(current, *subscription_type, *duration_days, reason, ctx, now),
            Self::Extend { days, reason } => plan_extend(current, *days, reason, ctx, now),
            Self::Revoke { reason } => plan_revoke(current, reason, ctx, now),
            Self::ResetTrial => plan_reset_trial(current, config.trial_reset_days, ctx, now),
            Self::GrantCustomTrial {
                days,
                hours,
                minutes,
                reason,
            } => plan_custom_trial(current, *days, *hours, *minutes, reason, ctx, now),
        }
    }
}

/// New subscription state plus the entry that records it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Subscription after the command
    pub subscription: Subscription,
    /// History entry to append
    pub entry: HistoryEntry,
}

/// Result of a committed command
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    /// Subscription as written
    pub subscription: Subscription,
    /// Entry as written
    pub entry: HistoryEntry,
    /// Status re-derived from the written record
    pub status: SubscriptionStatus,
    /// Store version after the write
    pub version: i64,
}

fn add_duration(at: DateTime<Utc>, delta: Option<TimeDelta>) -> CoreResult<DateTime<Utc>> {
    delta
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or_else(|| CoreError::Validation("duration is out of range".to_string()))
}

fn entry(
    action: HistoryAction,
    subscription_type: SubscriptionType,
    end_date: Option<DateTime<Utc>>,
    reason: &Option<String>,
    ctx: &AdminContext,
    now: DateTime<Utc>,
) -> HistoryEntry {
    HistoryEntry {
        date: now,
        action,
        subscription_type,
        end_date,
        reason: reason.clone(),
        performed_by: Some(ctx.admin_id.clone()),
    }
}

fn plan_grant(
    current: &Subscription,
    subscription_type: SubscriptionType,
    duration_days: i64,
    reason: &Option<String>,
    ctx: &AdminContext,
    now: DateTime<Utc>,
) -> CoreResult<Mutation> {
    if !subscription_type.is_grantable() {
        return Err(CoreError::Validation(format!(
            "cannot grant a {subscription_type} subscription"
        )));
    }

    let end_date = if subscription_type == SubscriptionType::Lifetime {
        None
    } else {
        if duration_days <= 0 {
            return Err(CoreError::Validation(
                "duration_days must be positive".to_string(),
            ));
        }
        Some(add_duration(now, TimeDelta::try_days(duration_days))?)
    };

    let subscription = Subscription {
        subscription_type,
        is_active: true,
        granted_by_admin: true,
        start_date: now,
        end_date,
        ..current.clone()
    };
    let entry = entry(
        HistoryAction::AdminGranted,
        subscription_type,
        end_date,
        reason,
        ctx,
        now,
    );
    Ok(Mutation { subscription, entry })
}

fn plan_extend(
    current: &Subscription,
    days: i64,
    reason: &Option<String>,
    ctx: &AdminContext,
    now: DateTime<Utc>,
) -> CoreResult<Mutation> {
    if days <= 0 {
        return Err(CoreError::Validation("days must be positive".to_string()));
    }

    let status = resolve_status(current, now);
    if status == SubscriptionStatus::Expired {
        return Err(CoreError::PreconditionFailed(
            "cannot extend an expired subscription".to_string(),
        ));
    }
    if status == SubscriptionStatus::Premium
        && current.subscription_type == SubscriptionType::Lifetime
    {
        return Err(CoreError::PreconditionFailed(
            "lifetime subscriptions have no end date to extend".to_string(),
        ));
    }

    // Anchor at the later of now and the current end: a future end is never
    // shortened and a lapsed one does not bank the lapsed time.
    let anchor = current.end_date.map_or(now, |end| end.max(now));
    let end_date = add_duration(anchor, TimeDelta::try_days(days))?;

    let subscription = Subscription {
        end_date: Some(end_date),
        ..current.clone()
    };
    let entry = entry(
        HistoryAction::Extended,
        current.subscription_type,
        Some(end_date),
        reason,
        ctx,
        now,
    );
    Ok(Mutation { subscription, entry })
}

fn plan_revoke(
    current: &Subscription,
    reason: &Option<String>,
    ctx: &AdminContext,
    now: DateTime<Utc>,
) -> CoreResult<Mutation> {
    let status = resolve_status(current, now);
    if status != SubscriptionStatus::Premium {
        return Err(CoreError::PreconditionFailed(format!(
            "revoke requires a premium subscription, current status is {status}"
        )));
    }

    // granted_by_admin is cleared too, otherwise an admin-granted lifetime
    // record would still resolve to premium.
    let subscription = Subscription {
        is_active: false,
        granted_by_admin: false,
        end_date: Some(now),
        ..current.clone()
    };
    let entry = entry(
        HistoryAction::AdminRevoked,
        current.subscription_type,
        Some(now),
        reason,
        ctx,
        now,
    );
    Ok(Mutation { subscription, entry })
}

fn trial_type(current: &Subscription) -> SubscriptionType {
    match current.subscription_type {
        SubscriptionType::None => SubscriptionType::Trial,
        other => other,
    }
}

fn plan_reset_trial(
    current: &Subscription,
    trial_days: i64,
    ctx: &AdminContext,
    now: DateTime<Utc>,
) -> CoreResult<Mutation> {
    let trial_end = add_duration(now, TimeDelta::try_days(trial_days))?;

    let subscription = Subscription {
        subscription_type: trial_type(current),
        trial_end_date: Some(trial_end),
        ..current.clone()
    };
    let entry = entry(
        HistoryAction::TrialReset,
        SubscriptionType::Trial,
        Some(trial_end),
        &None,
        ctx,
        now,
    );
    Ok(Mutation { subscription, entry })
}

#[allow(clippy::too_many_arguments)]
fn plan_custom_trial(
    current: &Subscription,
    days: u32,
    hours: u32,
    minutes: u32,
    reason: &Option<String>,
    ctx: &AdminContext,
    now: DateTime<Utc>,
) -> CoreResult<Mutation> {
    let total_minutes =
        i64::from(days) * 1_440 + i64::from(hours) * 60 + i64::from(minutes);
    if total_minutes == 0 {
        return Err(CoreError::Validation(
            "custom trial needs a non-zero length".to_string(),
        ));
    }
    let trial_end = add_duration(now, TimeDelta::try_minutes(total_minutes))?;

    let subscription = Subscription {
        subscription_type: trial_type(current),
        trial_end_date: Some(trial_end),
        ..current.clone()
    };
    let entry = entry(
        HistoryAction::TrialStarted,
        SubscriptionType::Trial,
        Some(trial_end),
        reason,
        ctx,
        now,
    );
    Ok(Mutation { subscription, entry })
}

/// Runs admin commands against a subscription store
pub struct SubscriptionMutationService<S: ?Sized> {
    store: Arc<S>,
    config: CoreConfig,
}

impl<S: SubscriptionStore + ?Sized> SubscriptionMutationService<S> {
    /// Create a new mutation service
    pub fn new(store: Arc<S>, config: CoreConfig) -> Self {
        Self { store, config }
    }

    /// Read, plan and write one command.
    ///
    /// Returns [`CoreError::Conflict`] if another writer changed the record
    /// after it was read; the caller should re-read and decide again.
    #[instrument(
        skip(self, ctx, user_id, command),
        fields(admin_id = %ctx.admin_id, user_id = %user_id, command = command.name())
    )]
    pub async fn execute(
        &self,
        ctx: &AdminContext,
        user_id: &UserId,
        command: &AdminCommand,
        now: DateTime<Utc>,
    ) -> CoreResult<MutationOutcome> {
        let current = self.store.get(user_id).await?;
        let (subscription, expected_version) = match current {
            Some(versioned) => (versioned.subscription, Some(versioned.version)),
            None => (Subscription::none(now), None),
        };

        let mutation = command.plan(&subscription, ctx, &self.config, now)?;

        let version = self
            .store
            .put(user_id, expected_version, &mutation.subscription, &mutation.entry)
            .await
            .map_err(|e| {
                let err = CoreError::from(e);
                if err.is_retryable() {
                    warn!("Lost write race, command not applied");
                }
                err
            })?;

        let status = resolve_status(&mutation.subscription, now);
        info!(
            action = %mutation.entry.action,
            status = %status,
            version,
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            "Subscription updated"
        );

        Ok(MutationOutcome {
            subscription: mutation.subscription,
            entry: mutation.entry,
            status,
            version,
        })
    }

    /// Grant monthly, yearly or lifetime access
    pub async fn grant(
        &self,
        ctx: &AdminContext,
        user_id: &UserId,
        subscription_type: SubscriptionType,
        duration_days: i64,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<MutationOutcome> {
        let command = AdminCommand::Grant {
            subscription_type,
            duration_days,
            reason,
        };
        self.execute(ctx, user_id, &command, now).await
    }

    /// Extend a non-expired subscription by `days`
    pub async fn extend(
        &self,
        ctx: &AdminContext,
        user_id: &UserId,
        days: i64,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<MutationOutcome> {
        self.execute(ctx, user_id, &AdminCommand::Extend { days, reason }, now)
            .await
    }

    /// Revoke premium access
    pub async fn revoke(
        &self,
        ctx: &AdminContext,
        user_id: &UserId,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<MutationOutcome> {
        self.execute(ctx, user_id, &AdminCommand::Revoke { reason }, now)
            .await
    }

    /// Reset the trial to the standard length
    pub async fn reset_trial(
        &self,
        ctx: &AdminContext,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> CoreResult<MutationOutcome> {
        self.execute(ctx, user_id, &AdminCommand::ResetTrial, now)
            .await
    }

    /// Start a trial of `days`/`hours`/`minutes`
    #[allow(clippy::too_many_arguments)]
    pub async fn grant_custom_trial(
        &self,
        ctx: &AdminContext,
        user_id: &UserId,
        days: u32,
        hours: u32,
        minutes: u32,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<MutationOutcome> {
        let command = AdminCommand::GrantCustomTrial {
            days,
            hours,
            minutes,
            reason,
        };
        self.execute(ctx, user_id, &command, now).await
    }

    /// Config the service was built with
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }
}

impl<S: ?Sized> std::fmt::Debug for SubscriptionMutationService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionMutationService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
