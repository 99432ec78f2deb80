//! Repository for the `attendance_records` table.
//!
//! Hosts the card scan toggle. Every scan runs in a single transaction that
//! locks the scanned card's student row, so concurrent scans of one card
//! serialise while scans of different cards never contend. The open record
//! is locked too, so a scan and a teacher's mark-exit or edit of that record
//! take turns. The partial unique
//! index `uq_attendance_records_open_per_student` backs the one-open-record
//! invariant at the storage level.

use attendft_core::attendance::{self, Transition};
use attendft_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::attendance::{
    AttendanceFilter, AttendanceRecord, AttendanceView, EditOutcome, MarkExitOutcome,
    ScanOutcome, UpdateAttendanceTimes,
};
use crate::models::student::Student;
use crate::repositories::edit_log_repo::{EditLogRepo, NewEditLog};
use crate::repositories::scan_log_repo::ScanLogRepo;
use crate::repositories::student_repo::COLUMNS as STUDENT_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, student_id, card_id, entry_time, exit_time, created_at, updated_at";

/// Joined columns for [`AttendanceView`]; `a` is the record, `s` the student.
const VIEW_COLUMNS: &str = "a.id, a.student_id, s.full_name, a.card_id, a.entry_time, \
                            a.exit_time, a.created_at";

pub struct AttendanceRepo;

impl AttendanceRepo {
    // -----------------------------------------------------------------------
    // Scan toggle
    // -----------------------------------------------------------------------

    /// Apply one card scan at `now`.
    ///
    /// Logs the raw scan, resolves the card to a student and either opens a
    /// new record or closes the open one. An unknown card rolls everything
    /// back, scan log row included. Any error drops the transaction, which
    /// rolls it back.
    pub async fn record_scan(
        pool: &PgPool,
        card_id: &str,
        now: Timestamp,
    ) -> Result<ScanOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        ScanLogRepo::insert(&mut *tx, card_id, now).await?;

        let query = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE card_id = $1 FOR UPDATE");
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(card_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(student) = student else {
            tracing::debug!(card_id = %card_id, "Scan of unregistered card rolled back");
            tx.rollback().await?;
            return Ok(ScanOutcome::CardNotRegistered);
        };

        let open = Self::find_open(&mut *tx, &student.student_id).await?;

        let outcome = match attendance::next_transition(open, now) {
            Transition::Open { entry_time } => {
                let query = format!(
                    "INSERT INTO attendance_records (student_id, card_id, entry_time)
                     VALUES ($1, $2, $3)
                     RETURNING {COLUMNS}"
                );
                let record = sqlx::query_as::<_, AttendanceRecord>(&query)
                    .bind(&student.student_id)
                    .bind(card_id)
                    .bind(entry_time)
                    .fetch_one(&mut *tx)
                    .await?;
                ScanOutcome::CheckedIn { student, record }
            }
            Transition::Close { record, exit_time } => {
                let record = Self::close(&mut *tx, record.id, exit_time).await?;
                ScanOutcome::CheckedOut { student, record }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Lock the student's most recent open record, if any.
    ///
    /// Waits for a concurrent teacher mutation of that record; a record it
    /// closed in the meantime no longer qualifies and is skipped.
    async fn find_open(
        conn: &mut PgConnection,
        student_id: &str,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE student_id = $1 AND exit_time IS NULL
             ORDER BY entry_time DESC, id DESC
             LIMIT 1
             FOR UPDATE"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(student_id)
            .fetch_optional(conn)
            .await
    }

    /// Set the exit time of a record that is still open. Fails with
    /// `RowNotFound` if it was closed already.
    async fn close(
        conn: &mut PgConnection,
        id: DbId,
        exit_time: Timestamp,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let query = format!(
            "UPDATE attendance_records SET exit_time = $2
             WHERE id = $1 AND exit_time IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .bind(exit_time)
            .fetch_one(conn)
            .await
    }

    async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance_records WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    // -----------------------------------------------------------------------
    // Teacher mutations
    // -----------------------------------------------------------------------

    /// Close an open record at `now` on a teacher's behalf.
    ///
    /// An already-closed record is left untouched.
    pub async fn mark_exit(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<MarkExitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let outcome = match Self::lock_by_id(&mut *tx, id).await? {
            None => MarkExitOutcome::NotFound,
            Some(record) if !record.is_open() => MarkExitOutcome::AlreadyClosed,
            Some(record) => {
                let exit_time = attendance::checkout_time(record.entry_time, now);
                MarkExitOutcome::Closed(Self::close(&mut *tx, record.id, exit_time).await?)
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Overwrite a record's timestamps and write the audit row in the same
    /// transaction.
    ///
    /// Re-opening a record while the student has another open record trips
    /// `uq_attendance_records_open_per_student`.
    pub async fn update_times(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAttendanceTimes,
    ) -> Result<EditOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(before) = Self::lock_by_id(&mut *tx, id).await? else {
            tx.rollback().await?;
            return Ok(EditOutcome::NotFound);
        };

        let query = format!(
            "UPDATE attendance_records SET entry_time = $2, exit_time = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .bind(input.entry_time)
            .bind(input.exit_time)
            .fetch_one(&mut *tx)
            .await?;

        let log = EditLogRepo::insert(
            &mut *tx,
            &NewEditLog {
                attendance_id: id,
                edited_by: input.edited_by,
                old_entry_time: before.entry_time,
                new_entry_time: record.entry_time,
                old_exit_time: before.exit_time,
                new_exit_time: record.exit_time,
                edit_reason: &input.edit_reason,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(EditOutcome::Updated { record, log })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Find a record by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AttendanceRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance_records WHERE id = $1");
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All open records of a student. More than one would be a broken invariant.
    pub async fn list_open_for_student(
        pool: &PgPool,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_records
             WHERE student_id = $1 AND exit_time IS NULL
             ORDER BY entry_time DESC"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// List records joined with student names, newest entry first.
    pub async fn list(
        pool: &PgPool,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS}
             FROM attendance_records a
             JOIN students s ON s.student_id = a.student_id
             WHERE ($1::text IS NULL OR a.student_id = $1)
               AND ($2::text IS NULL
                    OR s.full_name ILIKE $2
                    OR a.student_id ILIKE $2
                    OR a.card_id ILIKE $2)
             ORDER BY a.entry_time DESC, a.id DESC
             LIMIT $3"
        );
        sqlx::query_as::<_, AttendanceView>(&query)
            .bind(&filter.student_id)
            .bind(&filter.search)
            .bind(filter.limit)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendance_records")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
