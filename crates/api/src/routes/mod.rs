pub mod attendance;
pub mod auth;
pub mod health;
pub mod scan;
pub mod students;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /scan                           card reader (public)
///
/// /auth/register                  register (public)
/// /auth/login                     login (public)
/// /auth/logout                    logout
/// /auth/me                        current identity
/// /auth/csrf                      CSRF token for mutations
///
/// /dashboard/stats                role-specific statistics
///
/// /attendance                     list (students: own rows)
/// /attendance/export              CSV export
/// /attendance/{id}                edit times (teacher)
/// /attendance/{id}/exit           mark exit now (teacher)
/// /attendance/{id}/edits          audit trail (teacher)
///
/// /students                       list, create (teacher)
/// /students/{student_id}          delete (teacher)
///
/// /users                          list (teacher)
/// /users/{id}/active              activate / deactivate (teacher)
///
/// /scan-logs                      raw scan log (teacher)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/scan", scan::router())
        .nest("/auth", auth::router())
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .nest("/attendance", attendance::router())
        .nest("/students", students::router())
        .nest("/users", users::router())
        .route("/scan-logs", get(handlers::scan_logs::list))
}
