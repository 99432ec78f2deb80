//! Handlers for the `/auth` resource (register, login, logout, me, csrf).

use attendft_core::credentials::{generate_token, hash_token, SessionCookieValue};
use attendft_core::error::CoreError;
use attendft_core::identity::{classify_identifier, LoginIdentifier, NewAccount};
use attendft_core::roles::Role;
use attendft_db::models::session::CreateSession;
use attendft_db::models::user::{CreateUser, RegisterOutcome, User, UserResponse};
use attendft_db::repositories::{SessionRepo, UserRepo};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, verify_login};
use crate::auth::session::{clear_session_cookie, read_session_cookie, session_cookie};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthSession, IdentityResponse};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest `User-Agent` value stored on a session.
const MAX_USER_AGENT_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
    pub full_name: String,
    pub student_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    /// Teacher accounts must be activated by an existing teacher first.
    pub requires_activation: bool,
}

/// Request body for `POST /auth/login`.
///
/// `identifier` is a username or an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CsrfResponse {
    pub csrf_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. Student accounts must name an existing student profile
/// and are active immediately; teacher accounts start inactive.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RegisterResponse>>)> {
    let role = NewAccount {
        username: &input.username,
        email: &input.email,
        password: &input.password,
        confirm_password: &input.confirm_password,
        role: &input.role,
        full_name: &input.full_name,
        student_id: input.student_id.as_deref(),
    }
    .validate(state.config.min_password_length)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_string(),
        password_hash,
        role,
        full_name: input.full_name.trim().to_string(),
        student_id: match role {
            Role::Student => input.student_id.as_deref().map(|s| s.trim().to_string()),
            Role::Teacher => None,
        },
        is_active: role == Role::Student,
    };

    let user = match UserRepo::register(&state.pool, &create).await? {
        RegisterOutcome::Created(user) => user,
        RegisterOutcome::StudentNotFound => {
            return Err(AppError::Core(CoreError::Validation(
                "Student ID not found. Please contact your teacher.".into(),
            )));
        }
    };

    tracing::info!(user_id = user.id, role = %role, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisterResponse {
                requires_activation: !user.is_active,
                user: UserResponse::from(&user),
            },
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username or email plus password. On success any previous
/// session of the user is replaced and the session cookie is set.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<IdentityResponse>>)> {
    if input.identifier.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Please fill in all fields".into(),
        )));
    }

    // 1. Find the active user by the field the identifier's shape selects.
    let user = match classify_identifier(&input.identifier) {
        LoginIdentifier::Email(email) => UserRepo::find_active_by_email(&state.pool, email).await?,
        LoginIdentifier::Username(name) => {
            UserRepo::find_active_by_username(&state.pool, name).await?
        }
    };

    // 2. Verify the password; unknown users take the same path.
    let password_valid = verify_login(&input.password, user.as_ref().map(|u| u.password_hash.as_str()))
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    let user = match user {
        Some(user) if password_valid => user,
        _ => {
            tracing::info!("Failed login attempt");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid credentials".into(),
            )));
        }
    };

    // 3. Issue the session.
    let (session, cookie_value) = start_session(&state, &user, &headers).await?;
    tracing::info!(user_id = user.id, session_id = session.session_id, "User logged in");

    let jar = jar.add(session_cookie(&cookie_value, &state.config.session));
    Ok((
        jar,
        Json(DataResponse {
            data: IdentityResponse::from(&session),
        }),
    ))
}

/// POST /api/v1/auth/logout
///
/// Delete the current session, if any, and clear the cookie. Always 204.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    if let Some(cookie) = read_session_cookie(&jar) {
        let token_hash = hash_token(state.config.session.secret_key.as_bytes(), &cookie.token);
        let deleted = SessionRepo::delete_by_token_hash(&state.pool, &token_hash).await?;
        if deleted > 0 {
            tracing::info!(user_id = cookie.user_id, "User logged out");
        }
    }
    Ok((clear_session_cookie(jar), StatusCode::NO_CONTENT))
}

/// GET /api/v1/auth/me
pub async fn me(RequireAuth(session): RequireAuth) -> Json<DataResponse<IdentityResponse>> {
    Json(DataResponse {
        data: IdentityResponse::from(&session),
    })
}

/// GET /api/v1/auth/csrf
///
/// Return the session's CSRF token, issuing one on first request.
pub async fn csrf(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> AppResult<Json<DataResponse<CsrfResponse>>> {
    let csrf_token = match session.csrf_token {
        Some(token) => token,
        None => SessionRepo::ensure_csrf_token(&state.pool, session.session_id, &generate_token())
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Authentication required".into()))
            })?,
    };
    Ok(Json(DataResponse {
        data: CsrfResponse { csrf_token },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mint a token, persist its hash as the user's only session and return the
/// resulting identity plus the cookie value to hand out.
async fn start_session(
    state: &AppState,
    user: &User,
    headers: &HeaderMap,
) -> AppResult<(AuthSession, SessionCookieValue)> {
    let role = user.role()?;
    let token = generate_token();
    let config = &state.config.session;

    let input = CreateSession {
        user_id: user.id,
        token_hash: hash_token(config.secret_key.as_bytes(), &token),
        expires_at: Utc::now() + chrono::Duration::hours(config.lifetime_hours),
        ip_address: client_ip(headers),
        user_agent: headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect()),
    };
    let session = SessionRepo::create_replacing(&state.pool, &input).await?;

    let identity = AuthSession {
        session_id: session.id,
        user_id: user.id,
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        role,
        student_id: user.student_id.clone(),
        csrf_token: session.csrf_token,
        expires_at: session.expires_at,
    };
    Ok((identity, SessionCookieValue::new(user.id, token)))
}

/// Client address as reported by a fronting proxy, if any.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}
