//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthSession`] and rejects requests whose role does
//! not match. Use these in route handlers to enforce authorization at the
//! type level.

use attendft_core::error::CoreError;
use attendft_core::roles::Role;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthSession;
use crate::error::AppError;
use crate::state::AppState;

/// Check that a session carries `role`, rejecting with 403 otherwise.
pub fn require_role(session: AuthSession, role: Role) -> Result<AuthSession, AppError> {
    if session.role != role {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "{} role required",
            capitalize(role.as_str())
        ))));
    }
    Ok(session)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Requires the `teacher` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn teacher_only(RequireTeacher(session): RequireTeacher) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireTeacher(pub AuthSession);

impl FromRequestParts<AppState> for RequireTeacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        require_role(session, Role::Teacher).map(RequireTeacher)
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthSession`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthSession);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        Ok(RequireAuth(session))
    }
}
