//! Repository for the `students` table.

use sqlx::PgPool;

use crate::models::student::{CreateStudent, Student};
use crate::models::user::{CreateUser, User};
use crate::repositories::user_repo::UserRepo;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, student_id, full_name, card_id, user_id, created_at, updated_at";

/// Provides CRUD operations for student profiles.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a bare student profile with no linked account.
    pub async fn create(pool: &PgPool, input: &CreateStudent) -> Result<Student, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (student_id, full_name, card_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(&input.student_id)
            .bind(&input.full_name)
            .bind(&input.card_id)
            .fetch_one(pool)
            .await
    }

    /// Create a student profile together with its student-role account.
    ///
    /// Both rows and the back-reference are written in one transaction; a
    /// duplicate student id, card id, username or email leaves nothing behind.
    pub async fn create_with_account(
        pool: &PgPool,
        student: &CreateStudent,
        account: &CreateUser,
    ) -> Result<(Student, User), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO students (student_id, full_name, card_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Student>(&query)
            .bind(&student.student_id)
            .bind(&student.full_name)
            .bind(&student.card_id)
            .fetch_one(&mut *tx)
            .await?;

        let user = UserRepo::insert(&mut *tx, account).await?;

        let query = format!(
            "UPDATE students SET user_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let linked = sqlx::query_as::<_, Student>(&query)
            .bind(created.id)
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((linked, user))
    }

    /// Find a student by school-issued identifier.
    pub async fn find_by_student_id(
        pool: &PgPool,
        student_id: &str,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE student_id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the student holding a card.
    pub async fn find_by_card_id(
        pool: &PgPool,
        card_id: &str,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE card_id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(card_id)
            .fetch_optional(pool)
            .await
    }

    /// List students ordered by name, optionally filtered by an escaped
    /// `ILIKE` pattern over name, student id and card id.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Student>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM students
             WHERE $1::text IS NULL
                OR full_name ILIKE $1
                OR student_id ILIKE $1
                OR card_id ILIKE $1
             ORDER BY full_name ASC, student_id ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(search)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Hard-delete a student together with its linked account.
    ///
    /// Attendance history goes with the profile via `ON DELETE CASCADE`.
    /// Returns `true` if a student row was deleted.
    pub async fn delete(pool: &PgPool, student_id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM users WHERE student_id = $1")
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM students WHERE student_id = $1")
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
