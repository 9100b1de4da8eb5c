//! User listing handlers

use std::time::Instant;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use encore_core::{CoreError, StatusCounts, StatusFilter, UserStatusView};
use serde::{Deserialize, Serialize};

use super::shared::observed;
use crate::error::ApiResult;
use crate::extractors::AdminCredential;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserStatusView>,
    pub count: usize,
}

/// GET /api/v1/admin/users?status=premium|trial|expired|expiring
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminCredential,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<ListUsersResponse>> {
    let start = Instant::now();
    let filter = query
        .status
        .as_deref()
        .map(str::parse::<StatusFilter>)
        .transpose()?;

    let users = observed(
        "list_users",
        start,
        state.subscriptions.list().await.map_err(CoreError::from),
    )?;
    let views = state.queries.filter(&users, filter, Utc::now());

    Ok(Json(ListUsersResponse {
        count: views.len(),
        users: views,
    }))
}

/// GET /api/v1/admin/users/stats
pub async fn user_stats(
    State(state): State<AppState>,
    _admin: AdminCredential,
) -> ApiResult<Json<StatusCounts>> {
    let start = Instant::now();
    let users = observed(
        "user_stats",
        start,
        state.subscriptions.list().await.map_err(CoreError::from),
    )?;
    Ok(Json(state.queries.status_counts(&users, Utc::now())))
}
