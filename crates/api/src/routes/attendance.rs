//! Route definitions for the `/attendance` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{attendance, export};
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// GET  /             -> list
/// GET  /export       -> export (CSV)
/// PUT  /{id}         -> update (teacher)
/// POST /{id}/exit    -> mark_exit (teacher)
/// GET  /{id}/edits   -> list_edits (teacher)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(attendance::list))
        .route("/export", get(export::export))
        .route("/{id}", put(attendance::update))
        .route("/{id}/exit", post(attendance::mark_exit))
        .route("/{id}/edits", get(attendance::list_edits))
}
