//! Handler for browsing the raw card scan log (teacher only).

use attendft_core::search::clamp_limit;
use attendft_db::models::scan_log::CardScanLog;
use attendft_db::repositories::ScanLogRepo;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireTeacher;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ScanLogParams {
    pub card_id: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/v1/scan-logs?card_id=&limit=
///
/// Badge reads that resolved to a student, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireTeacher(_session): RequireTeacher,
    Query(params): Query<ScanLogParams>,
) -> AppResult<Json<DataResponse<Vec<CardScanLog>>>> {
    let card_id = params
        .card_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let data = ScanLogRepo::list_recent(&state.pool, card_id, clamp_limit(params.limit)).await?;
    Ok(Json(DataResponse { data }))
}
