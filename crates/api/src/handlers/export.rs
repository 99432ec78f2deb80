//! CSV export of attendance records.
//!
//! Output starts with a UTF-8 byte-order mark so spreadsheet applications
//! detect the encoding, followed by a header row and one row per record.

use attendft_core::attendance::status_label;
use attendft_core::roles::Role;
use attendft_core::search::like_pattern;
use attendft_core::types::Timestamp;
use attendft_db::models::attendance::{AttendanceFilter, AttendanceView};
use attendft_db::repositories::AttendanceRepo;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::handlers::attendance::visible_student;
use crate::middleware::rbac::RequireAuth;
use crate::query::SearchParams;
use crate::state::AppState;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Fixed column order of the export.
pub const CSV_HEADERS: [&str; 8] = [
    "ID",
    "Student Name",
    "Student Number",
    "Card ID",
    "Entry Time",
    "Exit Time",
    "Status",
    "Record Created",
];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_time(t: Timestamp) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// Render rows as CSV bytes.
pub fn render_csv(rows: &[AttendanceView]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new().from_writer(UTF8_BOM.to_vec());
    writer.write_record(CSV_HEADERS)?;

    for row in rows {
        let exit = row
            .exit_time
            .map(format_time)
            .unwrap_or_else(|| "Still inside".to_string());
        writer.write_record([
            row.id.to_string(),
            row.full_name.clone(),
            row.student_id.clone(),
            row.card_id.clone(),
            format_time(row.entry_time),
            exit,
            status_label(row.exit_time).to_string(),
            format_time(row.created_at),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// GET /api/v1/attendance/export?search=
///
/// Teachers export every matching record, students only their own.
pub async fn export(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
    Query(params): Query<SearchParams>,
) -> AppResult<Response> {
    let filter = AttendanceFilter {
        student_id: visible_student(&session)?,
        search: like_pattern(params.search.as_deref()),
        limit: None,
    };
    let rows = AttendanceRepo::list(&state.pool, &filter).await?;
    let body = render_csv(&rows).map_err(|e| AppError::InternalError(format!("CSV export error: {e}")))?;

    let prefix = match session.role {
        Role::Teacher => "attendance",
        Role::Student => "my_attendance",
    };
    let filename = format!("{prefix}_{}.csv", Utc::now().format("%Y-%m-%d"));
    tracing::info!(user_id = session.user_id, rows = rows.len(), "Attendance exported");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response())
}
