//! Revenue reporting handler

use std::time::Instant;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use encore_core::{ReportWindow, RevenueReport};
use serde::Deserialize;

use super::shared::record_op_duration;
use crate::error::{ApiError, ApiResult};
use crate::extractors::AdminCredential;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RevenueQuery {
    pub days: Option<u32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl RevenueQuery {
    /// `days`, a `from`/`to` pair, or nothing for all time
    pub fn window(&self) -> Result<ReportWindow, ApiError> {
        match (self.days, self.from, self.to) {
            (None, None, None) => Ok(ReportWindow::All),
            (Some(days), None, None) => Ok(ReportWindow::LastDays(days)),
            (None, Some(from), Some(to)) => Ok(ReportWindow::Range { from, to }),
            (Some(_), _, _) => Err(ApiError::BadRequest(
                "use either days or from/to, not both".to_string(),
            )),
            _ => Err(ApiError::BadRequest(
                "from and to must be given together".to_string(),
            )),
        }
    }
}

/// GET /api/v1/admin/revenue?days=N | ?from=..&to=..
pub async fn get_revenue(
    State(state): State<AppState>,
    _admin: AdminCredential,
    Query(query): Query<RevenueQuery>,
) -> ApiResult<Json<RevenueReport>> {
    let start = Instant::now();
    let window = query.window()?;

    let result = state
        .revenue
        .report(state.notifications.as_ref(), &window, Utc::now())
        .await;
    record_op_duration("revenue_report", start, result.is_ok());

    let report = result?;
    if report.fallback_priced_events > 0 {
        tracing::warn!(
            fallback_priced_events = report.fallback_priced_events,
            "Revenue report includes fallback-priced events"
        );
    }
    Ok(Json(report))
}
