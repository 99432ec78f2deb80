//! Aggregate statistics shown on the dashboards.

use attendft_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// School-wide counters for the teacher dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeacherStats {
    pub total_students: i64,
    pub today_entries: i64,
    pub currently_inside: i64,
    pub completed_today: i64,
}

/// Per-student counters for the student dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentStats {
    pub total_visits: i64,
    pub today_visits: i64,
    pub currently_inside: i64,
    pub this_week_visits: i64,
    pub this_month_visits: i64,
    /// Mean length of completed visits, `None` when there are none.
    pub avg_duration_minutes: Option<f64>,
}

/// Lower bounds of the "today", "last 7 days" and "last 30 days" windows.
#[derive(Debug, Clone, Copy)]
pub struct StatsWindow {
    pub day_start: Timestamp,
    pub week_start: Timestamp,
    pub month_start: Timestamp,
}
