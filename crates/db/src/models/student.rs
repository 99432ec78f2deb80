//! Student profile model and DTOs.

use attendft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A student row from the `students` table.
///
/// `student_id` is the school-issued identifier; `id` is internal only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub student_id: String,
    pub full_name: String,
    pub card_id: String,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a student profile.
#[derive(Debug, Clone)]
pub struct CreateStudent {
    pub student_id: String,
    pub full_name: String,
    pub card_id: String,
}
