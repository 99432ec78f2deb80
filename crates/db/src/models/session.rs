//! User session model and DTOs.

use attendft_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub csrf_token: Option<String>,
    pub expires_at: Timestamp,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A live session joined with its (active) owning user.
///
/// This is what request authentication resolves a session cookie to.
#[derive(Debug, Clone, FromRow)]
pub struct SessionIdentity {
    pub session_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub student_id: Option<String>,
    pub csrf_token: Option<String>,
    pub expires_at: Timestamp,
}
