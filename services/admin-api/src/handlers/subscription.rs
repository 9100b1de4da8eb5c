//! Subscription handlers

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use encore_core::{
    resolve_status, status_end_date, status_remaining, CoreResult, MutationOutcome,
    TimeRemaining,
};
use encore_types::{HistoryEntry, Subscription, SubscriptionStatus, SubscriptionType, UserId};

use super::shared::{
    normalize_reason, observed, parse_user_id, record_mutation, record_op_duration,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::AdminCredential;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    #[serde(rename = "type")]
    pub subscription_type: String,
    #[serde(default)]
    pub duration_days: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtendRequest {
    pub days: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomTrialRequest {
    #[serde(default)]
    pub days: u32,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub user_id: UserId,
    pub subscription: Subscription,
    pub status: SubscriptionStatus,
    pub status_end_date: Option<DateTime<Utc>>,
    pub remaining: TimeRemaining,
    pub version: Option<i64>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub user_id: UserId,
    pub subscription: Subscription,
    pub status: SubscriptionStatus,
    pub remaining: TimeRemaining,
    pub entry: HistoryEntry,
    pub version: i64,
}

fn respond(
    command: &'static str,
    user_id: UserId,
    start: Instant,
    now: DateTime<Utc>,
    result: CoreResult<MutationOutcome>,
) -> ApiResult<Json<MutationResponse>> {
    record_op_duration(command, start, result.is_ok());
    match result {
        Ok(outcome) => {
            record_mutation(command, "ok");
            Ok(Json(MutationResponse {
                user_id,
                remaining: status_remaining(&outcome.subscription, now),
                subscription: outcome.subscription,
                status: outcome.status,
                entry: outcome.entry,
                version: outcome.version,
            }))
        }
        Err(err) => {
            record_mutation(command, err.kind().as_str());
            Err(err.into())
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/admin/users/{id}/subscription
pub async fn get_user_subscription(
    State(state): State<AppState>,
    _admin: AdminCredential,
    Path(id): Path<String>,
) -> ApiResult<Json<SubscriptionView>> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let now = Utc::now();

    let loaded: CoreResult<_> = async {
        let stored = state.subscriptions.get(&user_id).await?;
        let history = state.subscriptions.history(&user_id).await?;
        Ok((stored, history))
    }
    .await;
    let (stored, history) = observed("get_subscription", start, loaded)?;

    let (subscription, version) = match stored {
        Some(v) => (v.subscription, Some(v.version)),
        None => (Subscription::none(now), None),
    };

    Ok(Json(SubscriptionView {
        user_id,
        status: resolve_status(&subscription, now),
        status_end_date: status_end_date(&subscription, now),
        remaining: status_remaining(&subscription, now),
        subscription,
        version,
        history,
    }))
}

/// POST /api/v1/admin/users/{id}/subscription/grant
pub async fn grant_subscription(
    State(state): State<AppState>,
    admin: AdminCredential,
    Path(id): Path<String>,
    Json(req): Json<GrantRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let subscription_type: SubscriptionType = req
        .subscription_type
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid type: {}", req.subscription_type)))?;
    let reason = normalize_reason(req.reason)?;
    let now = Utc::now();

    let result = state
        .mutations
        .grant(&admin, &user_id, subscription_type, req.duration_days, reason, now)
        .await;
    respond("grant", user_id, start, now, result)
}

/// POST /api/v1/admin/users/{id}/subscription/extend
pub async fn extend_subscription(
    State(state): State<AppState>,
    admin: AdminCredential,
    Path(id): Path<String>,
    Json(req): Json<ExtendRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let reason = normalize_reason(req.reason)?;
    let now = Utc::now();

    let result = state
        .mutations
        .extend(&admin, &user_id, req.days, reason, now)
        .await;
    respond("extend", user_id, start, now, result)
}

/// POST /api/v1/admin/users/{id}/subscription/revoke
pub async fn revoke_subscription(
    State(state): State<AppState>,
    admin: AdminCredential,
    Path(id): Path<String>,
    Json(req): Json<RevokeRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let reason = normalize_reason(req.reason)?;
    let now = Utc::now();

    let result = state.mutations.revoke(&admin, &user_id, reason, now).await;
    respond("revoke", user_id, start, now, result)
}

/// POST /api/v1/admin/users/{id}/trial/reset
pub async fn reset_trial(
    State(state): State<AppState>,
    admin: AdminCredential,
    Path(id): Path<String>,
) -> ApiResult<Json<MutationResponse>> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let now = Utc::now();

    let result = state.mutations.reset_trial(&admin, &user_id, now).await;
    respond("reset_trial", user_id, start, now, result)
}

/// POST /api/v1/admin/users/{id}/trial/custom
pub async fn grant_custom_trial(
    State(state): State<AppState>,
    admin: AdminCredential,
    Path(id): Path<String>,
    Json(req): Json<CustomTrialRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let reason = normalize_reason(req.reason)?;
    let now = Utc::now();

    let result = state
        .mutations
        .grant_custom_trial(&admin, &user_id, req.days, req.hours, req.minutes, reason, now)
        .await;
    respond("grant_custom_trial", user_id, start, now, result)
}
