//! Attendance edit audit model.

use attendft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An immutable audit row written whenever a teacher edits an attendance record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceEditLog {
    pub id: DbId,
    pub attendance_id: DbId,
    pub edited_by: DbId,
    pub editor_username: Option<String>,
    pub old_entry_time: Timestamp,
    pub new_entry_time: Timestamp,
    pub old_exit_time: Option<Timestamp>,
    pub new_exit_time: Option<Timestamp>,
    pub edit_reason: String,
    pub created_at: Timestamp,
}
