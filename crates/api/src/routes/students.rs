//! Route definitions for the `/students` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::students;
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// DELETE /{student_id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(students::list).post(students::create))
        .route("/{student_id}", delete(students::delete))
}
