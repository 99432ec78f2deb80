//! Repository for the immutable `attendance_edit_logs` table.

use attendft_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::edit_log::AttendanceEditLog;

/// Columns of an edit log row aliased as `l`, plus the editor's username.
const SELECT_JOINED: &str = "l.id, l.attendance_id, l.edited_by, u.username AS editor_username, \
                             l.old_entry_time, l.new_entry_time, l.old_exit_time, l.new_exit_time, \
                             l.edit_reason, l.created_at";

/// Before/after values of one edit.
#[derive(Debug, Clone)]
pub struct NewEditLog<'a> {
    pub attendance_id: DbId,
    pub edited_by: DbId,
    pub old_entry_time: Timestamp,
    pub new_entry_time: Timestamp,
    pub old_exit_time: Option<Timestamp>,
    pub new_exit_time: Option<Timestamp>,
    pub edit_reason: &'a str,
}

pub struct EditLogRepo;

impl EditLogRepo {
    /// Write an audit row on the caller's connection (inside the edit's
    /// transaction).
    pub async fn insert(
        conn: &mut PgConnection,
        input: &NewEditLog<'_>,
    ) -> Result<AttendanceEditLog, sqlx::Error> {
        let query = format!(
            "WITH l AS (
                INSERT INTO attendance_edit_logs
                    (attendance_id, edited_by, old_entry_time, new_entry_time,
                     old_exit_time, new_exit_time, edit_reason)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
             )
             SELECT {SELECT_JOINED}
             FROM l LEFT JOIN users u ON u.id = l.edited_by"
        );
        sqlx::query_as::<_, AttendanceEditLog>(&query)
            .bind(input.attendance_id)
            .bind(input.edited_by)
            .bind(input.old_entry_time)
            .bind(input.new_entry_time)
            .bind(input.old_exit_time)
            .bind(input.new_exit_time)
            .bind(input.edit_reason)
            .fetch_one(conn)
            .await
    }

    /// Audit trail of one attendance record, newest first.
    pub async fn list_for_attendance(
        pool: &PgPool,
        attendance_id: DbId,
    ) -> Result<Vec<AttendanceEditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {SELECT_JOINED}
             FROM attendance_edit_logs l
             LEFT JOIN users u ON u.id = l.edited_by
             WHERE l.attendance_id = $1
             ORDER BY l.created_at DESC, l.id DESC"
        );
        sqlx::query_as::<_, AttendanceEditLog>(&query)
            .bind(attendance_id)
            .fetch_all(pool)
            .await
    }
}
