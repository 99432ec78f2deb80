//! Route definitions for the kiosk scan endpoint.

use axum::routing::post;
use axum::Router;

use crate::handlers::scan;
use crate::state::AppState;

/// Routes mounted at `/scan`.
///
/// ```text
/// POST /   -> scan (public, form-encoded)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(scan::scan))
}
