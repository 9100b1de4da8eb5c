//! Provider notification webhook

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;

use super::shared::record_op_duration;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying `t=<unix>,v1=<hex>`
pub const SIGNATURE_HEADER: &str = "x-notification-signature";

/// POST /webhooks/notifications
///
/// Verify, parse and store a provider notification. Redeliveries are
/// acknowledged without being stored twice.
pub async fn notification_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let start = Instant::now();

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("Missing or unreadable notification signature header");
        metrics::counter!("webhook_notifications_total", "outcome" => "rejected").increment(1);
        return Err(ApiError::BadRequest("missing signature".to_string()));
    };

    match state.ingestor.ingest(&body, signature, Utc::now()).await {
        Ok((_, outcome)) => {
            metrics::counter!("webhook_notifications_total", "outcome" => outcome.as_str())
                .increment(1);
            record_op_duration("ingest_notification", start, true);
            Ok(StatusCode::OK)
        }
        Err(e) => {
            tracing::warn!(error = %e, kind = %e.kind(), "Notification rejected");
            metrics::counter!("webhook_notifications_total", "outcome" => e.kind().as_str())
                .increment(1);
            record_op_duration("ingest_notification", start, false);
            Err(e.into())
        }
    }
}
