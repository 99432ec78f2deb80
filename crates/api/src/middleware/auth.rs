//! Session-cookie authentication extractor for Axum handlers.

use attendft_core::credentials::hash_token;
use attendft_core::error::CoreError;
use attendft_core::roles::Role;
use attendft_core::types::{DbId, Timestamp};
use attendft_db::repositories::SessionRepo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::auth::session::read_session_cookie;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated identity of a request, resolved once from the session
/// cookie and handed to handlers explicitly.
///
/// ```ignore
/// async fn my_handler(session: AuthSession) -> AppResult<Json<()>> {
///     tracing::info!(user_id = session.user_id, role = %session.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    /// Linked student profile, always set for students.
    pub student_id: Option<String>,
    /// CSRF token of this session, once one has been issued.
    pub csrf_token: Option<String>,
    pub expires_at: Timestamp,
}

/// Public view of an [`AuthSession`].
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub user_id: DbId,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub expires_at: Timestamp,
}

impl From<&AuthSession> for IdentityResponse {
    fn from(session: &AuthSession) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username.clone(),
            full_name: session.full_name.clone(),
            role: session.role,
            student_id: session.student_id.clone(),
            expires_at: session.expires_at,
        }
    }
}

fn unauthenticated() -> AppError {
    AppError::Core(CoreError::Unauthorized("Authentication required".into()))
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = read_session_cookie(&jar).ok_or_else(unauthenticated)?;

        let token_hash = hash_token(state.config.session.secret_key.as_bytes(), &cookie.token);
        let identity = SessionRepo::find_identity(&state.pool, cookie.user_id, &token_hash)
            .await?
            .ok_or_else(unauthenticated)?;

        let role: Role = identity.role.parse().map_err(|_| {
            tracing::error!(user_id = identity.user_id, role = %identity.role, "Unknown role on session");
            unauthenticated()
        })?;

        Ok(AuthSession {
            session_id: identity.session_id,
            user_id: identity.user_id,
            username: identity.username,
            full_name: identity.full_name,
            role,
            student_id: identity.student_id,
            csrf_token: identity.csrf_token,
            expires_at: identity.expires_at,
        })
    }
}
