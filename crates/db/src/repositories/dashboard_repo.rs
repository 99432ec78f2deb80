//! Aggregate queries behind the dashboard statistics.

use sqlx::PgPool;

use crate::models::dashboard::{StatsWindow, StudentStats, TeacherStats};

pub struct DashboardRepo;

impl DashboardRepo {
    /// School-wide counters.
    pub async fn teacher_stats(
        pool: &PgPool,
        window: &StatsWindow,
    ) -> Result<TeacherStats, sqlx::Error> {
        sqlx::query_as::<_, TeacherStats>(
            "SELECT
                (SELECT COUNT(*) FROM students) AS total_students,
                (SELECT COUNT(*) FROM attendance_records
                  WHERE entry_time >= $1) AS today_entries,
                (SELECT COUNT(*) FROM attendance_records
                  WHERE exit_time IS NULL) AS currently_inside,
                (SELECT COUNT(*) FROM attendance_records
                  WHERE entry_time >= $1 AND exit_time IS NOT NULL) AS completed_today",
        )
        .bind(window.day_start)
        .fetch_one(pool)
        .await
    }

    /// Counters for a single student.
    pub async fn student_stats(
        pool: &PgPool,
        student_id: &str,
        window: &StatsWindow,
    ) -> Result<StudentStats, sqlx::Error> {
        sqlx::query_as::<_, StudentStats>(
            "SELECT
                COUNT(*) AS total_visits,
                COUNT(*) FILTER (WHERE entry_time >= $2) AS today_visits,
                COUNT(*) FILTER (WHERE exit_time IS NULL) AS currently_inside,
                COUNT(*) FILTER (WHERE entry_time >= $3) AS this_week_visits,
                COUNT(*) FILTER (WHERE entry_time >= $4) AS this_month_visits,
                (AVG(EXTRACT(EPOCH FROM (exit_time - entry_time)) / 60.0)
                    FILTER (WHERE exit_time IS NOT NULL))::float8 AS avg_duration_minutes
             FROM attendance_records
             WHERE student_id = $1",
        )
        .bind(student_id)
        .bind(window.day_start)
        .bind(window.week_start)
        .bind(window.month_start)
        .fetch_one(pool)
        .await
    }
}
