//! Request-scoped admin credential

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use encore_types::AdminContext;
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

/// Header naming the acting admin
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_ADMIN_ID_LEN: usize = 128;

/// Authenticated admin for the current request.
///
/// Requires `Authorization: Bearer <ADMIN_API_TOKEN>` and an `X-Admin-Id`
/// header. The request ID set by the middleware is carried along for logs.
#[derive(Debug, Clone)]
pub struct AdminCredential(pub AdminContext);

impl Deref for AdminCredential {
    type Target = AdminContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn header<'a>(parts: &'a Parts, name: impl axum::http::header::AsHeaderName) -> Option<&'a str> {
    parts.headers.get(name).and_then(|value| value.to_str().ok())
}

fn valid_admin_id(admin_id: &str) -> bool {
    !admin_id.is_empty()
        && admin_id.len() <= MAX_ADMIN_ID_LEN
        && admin_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
}

impl FromRequestParts<AppState> for AdminCredential {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = header(parts, AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized("missing bearer token"))?;

        let expected = state.config.admin_api_token.as_bytes();
        if !bool::from(token.trim().as_bytes().ct_eq(expected)) {
            tracing::warn!("Rejected admin request with invalid token");
            return Err(ApiError::Unauthorized("invalid bearer token"));
        }

        let admin_id = header(parts, ADMIN_ID_HEADER)
            .map(str::trim)
            .filter(|id| valid_admin_id(id))
            .ok_or(ApiError::Unauthorized("missing or invalid X-Admin-Id"))?;

        let mut ctx = AdminContext::new(admin_id);
        if let Some(request_id) = header(parts, REQUEST_ID_HEADER) {
            ctx = ctx.with_request_id(request_id);
        }
        Ok(Self(ctx))
    }
}
