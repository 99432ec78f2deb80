//! Repository for the `users` table.

use attendft_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, RegisterOutcome, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, role, full_name, student_id, \
                        is_active, last_login_at, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user on the caller's connection, returning the created row.
    pub async fn insert(conn: &mut PgConnection, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role, full_name, student_id, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .bind(&input.full_name)
            .bind(&input.student_id)
            .bind(input.is_active)
            .fetch_one(conn)
            .await
    }

    /// Register a new account.
    ///
    /// When `student_id` is set the student profile is locked, the account is
    /// inserted and the profile's back-reference is filled in, all in one
    /// transaction. A missing profile yields [`RegisterOutcome::StudentNotFound`]
    /// and nothing is written. A profile that already has an account trips
    /// `uq_users_student_id`.
    pub async fn register(pool: &PgPool, input: &CreateUser) -> Result<RegisterOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(student_id) = &input.student_id {
            let exists: Option<(DbId,)> =
                sqlx::query_as("SELECT id FROM students WHERE student_id = $1 FOR UPDATE")
                    .bind(student_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                tx.rollback().await?;
                return Ok(RegisterOutcome::StudentNotFound);
            }
        }

        let user = Self::insert(&mut *tx, input).await?;

        if let Some(student_id) = &user.student_id {
            sqlx::query("UPDATE students SET user_id = $1 WHERE student_id = $2")
                .bind(user.id)
                .bind(student_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(RegisterOutcome::Created(user))
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active user by username (case-sensitive).
    pub async fn find_active_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1 AND is_active = true");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find an active user by email (case-sensitive).
    pub async fn find_active_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND is_active = true");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all users, inactive accounts first, then by most recently created.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users ORDER BY is_active ASC, created_at DESC, id DESC"
        );
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Activate or deactivate an account.
    ///
    /// Deactivation also deletes the user's sessions so it takes effect on the
    /// next request. Returns `None` if no row with the given `id` exists.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("UPDATE users SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(&mut *tx)
            .await?;

        if user.is_some() && !is_active {
            sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(user)
    }
}
