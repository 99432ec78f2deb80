//! Handlers for the `/attendance` resource.
//!
//! Teachers see and mutate every record; students see only their own.

use attendft_core::attendance::{self, duration_minutes, status_label};
use attendft_core::error::CoreError;
use attendft_core::roles::Role;
use attendft_core::search::{clamp_limit, like_pattern};
use attendft_core::types::{DbId, Timestamp};
use attendft_db::models::attendance::{
    AttendanceFilter, AttendanceRecord, AttendanceView, EditOutcome, MarkExitOutcome,
    UpdateAttendanceTimes,
};
use attendft_db::models::edit_log::AttendanceEditLog;
use attendft_db::repositories::{AttendanceRepo, EditLogRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSession;
use crate::middleware::csrf::TeacherMutation;
use crate::middleware::rbac::{RequireAuth, RequireTeacher};
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One attendance row as listed on a dashboard.
#[derive(Debug, Serialize)]
pub struct AttendanceEntry {
    pub id: DbId,
    pub student_id: String,
    pub full_name: String,
    pub card_id: String,
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
    pub status: &'static str,
    /// Minutes inside; open visits are measured up to the time of the request.
    pub duration_minutes: i64,
    pub created_at: Timestamp,
}

impl AttendanceEntry {
    fn new(row: AttendanceView, now: Timestamp) -> Self {
        Self {
            status: status_label(row.exit_time),
            duration_minutes: duration_minutes(row.entry_time, row.exit_time, now),
            id: row.id,
            student_id: row.student_id,
            full_name: row.full_name,
            card_id: row.card_id,
            entry_time: row.entry_time,
            exit_time: row.exit_time,
            created_at: row.created_at,
        }
    }
}

/// Request body for `PUT /attendance/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateAttendanceRequest {
    pub entry_time: Timestamp,
    pub exit_time: Option<Timestamp>,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateAttendanceResponse {
    pub record: AttendanceRecord,
    pub edit: AttendanceEditLog,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/attendance?search=&limit=
///
/// Newest entry first. The search term matches name, student id or card id
/// case-insensitively. Returns at most `limit` rows (default 100, max 500);
/// the export endpoint has no cap.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<AttendanceEntry>>>> {
    let filter = AttendanceFilter {
        student_id: visible_student(&session)?,
        search: like_pattern(params.search.as_deref()),
        limit: Some(clamp_limit(params.limit)),
    };
    let rows = AttendanceRepo::list(&state.pool, &filter).await?;

    let now = Utc::now();
    let data = rows
        .into_iter()
        .map(|row| AttendanceEntry::new(row, now))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/attendance/{id}/exit
///
/// Close an open record at the current time. Fails with 409 if the record
/// already has an exit time.
pub async fn mark_exit(
    State(state): State<AppState>,
    TeacherMutation(session): TeacherMutation,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AttendanceRecord>>> {
    match AttendanceRepo::mark_exit(&state.pool, id, Utc::now()).await? {
        MarkExitOutcome::Closed(record) => {
            tracing::info!(record_id = id, teacher_id = session.user_id, "Exit marked by teacher");
            Ok(Json(DataResponse { data: record }))
        }
        MarkExitOutcome::AlreadyClosed => Err(AppError::Core(CoreError::Conflict(
            "Attendance record already has an exit time".into(),
        ))),
        MarkExitOutcome::NotFound => Err(CoreError::not_found("Attendance record", id).into()),
    }
}

/// PUT /api/v1/attendance/{id}
///
/// Replace a record's entry and exit times. The reason and the before/after
/// values are written to the edit log in the same transaction.
pub async fn update(
    State(state): State<AppState>,
    TeacherMutation(session): TeacherMutation,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAttendanceRequest>,
) -> AppResult<Json<DataResponse<UpdateAttendanceResponse>>> {
    attendance::validate_edit(input.entry_time, input.exit_time, &input.reason)?;

    let update = UpdateAttendanceTimes {
        entry_time: input.entry_time,
        exit_time: input.exit_time,
        edit_reason: input.reason.trim().to_string(),
        edited_by: session.user_id,
    };

    match AttendanceRepo::update_times(&state.pool, id, &update).await? {
        EditOutcome::Updated { record, log } => {
            tracing::info!(record_id = id, teacher_id = session.user_id, edit_id = log.id, "Attendance edited");
            Ok(Json(DataResponse {
                data: UpdateAttendanceResponse { record, edit: log },
            }))
        }
        EditOutcome::NotFound => Err(CoreError::not_found("Attendance record", id).into()),
    }
}

/// GET /api/v1/attendance/{id}/edits
///
/// Audit trail of a record, newest first. Survives deletion of the record.
pub async fn list_edits(
    State(state): State<AppState>,
    RequireTeacher(_session): RequireTeacher,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AttendanceEditLog>>>> {
    let data = EditLogRepo::list_for_attendance(&state.pool, id).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Student filter implied by the caller's role: `None` (everything) for
/// teachers, the caller's own profile for students.
pub(crate) fn visible_student(session: &AuthSession) -> AppResult<Option<String>> {
    match session.role {
        Role::Teacher => Ok(None),
        Role::Student => session
            .student_id
            .clone()
            .map(Some)
            .ok_or_else(|| {
                AppError::Core(CoreError::Forbidden(
                    "Account is not linked to a student".into(),
                ))
            }),
    }
}
