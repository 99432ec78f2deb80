//! Attendance ledger models and scan outcomes.

use attendft_core::attendance::OpenRecord;
use attendft_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::edit_log::AttendanceEditLog;
use crate::models::student::Student;

/// One visit interval from the `attendance_records` table.
///
/// A null `exit_time` means the student is currently inside.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub student_id: String,
    pub card_id: String,
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }
}

impl OpenRecord for AttendanceRecord {
    fn entry_time(&self) -> Timestamp {
        self.entry_time
    }
}

/// An attendance record joined with the owning student's name, as listed on
/// dashboards and written to exports.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceView {
    pub id: DbId,
    pub student_id: String,
    pub full_name: String,
    pub card_id: String,
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Filter for attendance listings.
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    /// Restrict to one student (used for student self-view).
    pub student_id: Option<String>,
    /// Escaped `ILIKE` pattern matched against name, student id and card id.
    pub search: Option<String>,
    /// `None` returns every matching row.
    pub limit: Option<i64>,
}

/// Teacher edit of a record's timestamps.
#[derive(Debug, Clone)]
pub struct UpdateAttendanceTimes {
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
    pub edit_reason: String,
    pub edited_by: DbId,
}

/// Result of applying one card scan to the ledger.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// The student was outside; a new open record was created.
    CheckedIn {
        student: Student,
        record: AttendanceRecord,
    },
    /// The student was inside; their open record was closed.
    CheckedOut {
        student: Student,
        record: AttendanceRecord,
    },
    /// No student holds this card. Nothing was persisted.
    CardNotRegistered,
}

/// Result of a teacher "mark exit" action.
#[derive(Debug, Clone)]
pub enum MarkExitOutcome {
    Closed(AttendanceRecord),
    AlreadyClosed,
    NotFound,
}

/// Result of a teacher edit.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    Updated {
        record: AttendanceRecord,
        log: AttendanceEditLog,
    },
    NotFound,
}
