//! Repository for the `user_sessions` table.

use attendft_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{CreateSession, SessionIdentity, UserSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, csrf_token, expires_at, ip_address, \
                        user_agent, created_at, updated_at";

/// Provides session lifecycle operations.
pub struct SessionRepo;

impl SessionRepo {
    /// Start a session for a freshly authenticated user.
    ///
    /// In one transaction: deletes every previous session of the user (one
    /// live session per user), inserts the new one and stamps
    /// `users.last_login_at`.
    pub async fn create_replacing(
        pool: &PgPool,
        input: &CreateSession,
    ) -> Result<UserSession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO user_sessions (user_id, token_hash, expires_at, ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .bind(&input.ip_address)
            .bind(&input.user_agent)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(input.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session)
    }

    /// Resolve a session cookie to an identity.
    ///
    /// Matches only when both the user id and the token hash agree, the
    /// session has not expired and the owning account is still active.
    pub async fn find_identity(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<Option<SessionIdentity>, sqlx::Error> {
        sqlx::query_as::<_, SessionIdentity>(
            "SELECT s.id AS session_id, u.id AS user_id, u.username, u.full_name, u.role,
                    u.student_id, s.csrf_token, s.expires_at
             FROM user_sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.user_id = $1
               AND s.token_hash = $2
               AND s.expires_at > NOW()
               AND u.is_active = true",
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Store a CSRF token on a session unless one is already set.
    ///
    /// Returns the token now on the session, which is the existing one if
    /// another request got there first. `None` means the session is gone.
    pub async fn ensure_csrf_token(
        pool: &PgPool,
        session_id: DbId,
        candidate: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "UPDATE user_sessions SET csrf_token = COALESCE(csrf_token, $2)
             WHERE id = $1
             RETURNING csrf_token",
        )
        .bind(session_id)
        .bind(candidate)
        .fetch_optional(pool)
        .await?;
        Ok(row.and_then(|(token,)| token))
    }

    /// Delete the session with this token hash. Returns the count deleted.
    pub async fn delete_by_token_hash(pool: &PgPool, token_hash: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count live (unexpired) sessions of a user.
    pub async fn count_live_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1 AND expires_at > NOW()",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Delete expired sessions. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
