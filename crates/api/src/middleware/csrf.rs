//! CSRF protection for state-changing teacher endpoints.
//!
//! The token lives on the session row. Clients fetch it from
//! `GET /api/v1/auth/csrf` and echo it in the `x-csrf-token` header.

use attendft_core::credentials::tokens_match;
use attendft_core::error::CoreError;
use attendft_core::roles::Role;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::auth::AuthSession;
use super::rbac::require_role;
use crate::auth::session::CSRF_HEADER;
use crate::error::AppError;
use crate::state::AppState;

/// Check the request's CSRF header against the session's token in constant
/// time. A session that was never issued a token rejects every request.
pub fn verify_csrf(session: &AuthSession, headers: &HeaderMap) -> Result<(), AppError> {
    let provided = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());
    match (session.csrf_token.as_deref(), provided) {
        (Some(expected), Some(provided)) if tokens_match(expected, provided) => Ok(()),
        _ => {
            tracing::warn!(user_id = session.user_id, "CSRF token missing or invalid");
            Err(AppError::Core(CoreError::Forbidden(
                "Invalid CSRF token".into(),
            )))
        }
    }
}

/// Requires the `teacher` role and a valid CSRF token.
pub struct TeacherMutation(pub AuthSession);

impl FromRequestParts<AppState> for TeacherMutation {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        let session = require_role(session, Role::Teacher)?;
        verify_csrf(&session, &parts.headers)?;
        Ok(TeacherMutation(session))
    }
}
