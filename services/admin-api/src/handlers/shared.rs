//! Shared handler utilities
//!
//! Input validation and metrics helpers used across handlers.

use std::time::Instant;

use encore_core::CoreResult;
use encore_types::UserId;

use crate::error::ApiError;

// ============================================================================
// Input Validation
// ============================================================================

/// Maximum length for admin-supplied reasons
const MAX_REASON_LEN: usize = 500;

/// Parse a user ID path segment
pub fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::parse(raw).map_err(|_| ApiError::BadRequest(format!("Invalid user id: {raw}")))
}

/// Normalise an optional reason: trimmed, blank dropped, length-capped.
pub fn normalize_reason(reason: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(reason) = reason else {
        return Ok(None);
    };
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_REASON_LEN {
        return Err(ApiError::BadRequest(format!(
            "reason too long (max {MAX_REASON_LEN} chars)"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

// ============================================================================
// Metrics Helpers
// ============================================================================

/// Record operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "admin_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the duration of a store-backed operation and pass its result on
pub fn observed<T>(
    operation: &'static str,
    start: Instant,
    result: CoreResult<T>,
) -> CoreResult<T> {
    record_op_duration(operation, start, result.is_ok());
    result
}

/// Count an admin command by outcome (`ok` or an error code)
#[inline]
pub fn record_mutation(command: &'static str, outcome: &'static str) {
    metrics::counter!(
        "admin_mutations_total",
        "command" => command,
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        assert!(parse_user_id("2f1c7a3e-8b1d-4c55-9a0e-3f6d2b7c9e10").is_ok());
        assert!(parse_user_id("not-a-uuid").is_err());
    }

    #[test]
    fn test_failed_operation_is_recorded_as_err() {
        use encore_core::CoreError;
        use encore_db::DbError;
        use metrics_exporter_prometheus::PrometheusBuilder;

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let result = metrics::with_local_recorder(&recorder, || {
            observed::<()>(
                "list_users",
                Instant::now(),
                Err(CoreError::Store(DbError::Corrupt("down".into()))),
            )
        });

        assert!(result.is_err());
        let rendered = handle.render();
        assert!(rendered.contains("admin_operation_duration_seconds"));
        assert!(rendered.contains(r#"operation="list_users""#));
        assert!(rendered.contains(r#"result="err""#));
    }

    #[test]
    fn test_normalize_reason() {
        assert_eq!(normalize_reason(None).unwrap(), None);
        assert_eq!(normalize_reason(Some("   ".into())).unwrap(), None);
        assert_eq!(
            normalize_reason(Some("  refund dispute ".into())).unwrap().as_deref(),
            Some("refund dispute")
        );
        assert!(normalize_reason(Some("x".repeat(MAX_REASON_LEN + 1))).is_err());
    }
}
