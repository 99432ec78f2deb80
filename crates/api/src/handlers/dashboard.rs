//! Handler for role-specific dashboard statistics.

use attendft_core::error::CoreError;
use attendft_core::roles::Role;
use attendft_core::types::Timestamp;
use attendft_db::models::dashboard::{StatsWindow, StudentStats, TeacherStats};
use attendft_db::repositories::DashboardRepo;
use axum::extract::State;
use axum::Json;
use chrono::{Duration, NaiveTime, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Statistics tagged with the role they were computed for.
#[derive(Debug, Serialize)]
#[serde(tag = "role", content = "stats", rename_all = "lowercase")]
pub enum DashboardStats {
    Teacher(TeacherStats),
    Student(StudentStats),
}

/// Windows ending at `now`: since UTC midnight, the last 7 days and the last 30 days.
pub fn stats_window(now: Timestamp) -> StatsWindow {
    StatsWindow {
        day_start: now.date_naive().and_time(NaiveTime::MIN).and_utc(),
        week_start: now - Duration::days(7),
        month_start: now - Duration::days(30),
    }
}

/// GET /api/v1/dashboard/stats
///
/// Teachers get school-wide counters; students get their own.
pub async fn stats(
    State(state): State<AppState>,
    RequireAuth(session): RequireAuth,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let window = stats_window(Utc::now());

    let stats = match session.role {
        Role::Teacher => DashboardStats::Teacher(DashboardRepo::teacher_stats(&state.pool, &window).await?),
        Role::Student => {
            let student_id = session.student_id.as_deref().ok_or_else(|| {
                AppError::Core(CoreError::Forbidden(
                    "Account is not linked to a student".into(),
                ))
            })?;
            DashboardStats::Student(
                DashboardRepo::student_stats(&state.pool, student_id, &window).await?,
            )
        }
    };

    Ok(Json(DataResponse { data: stats }))
}
