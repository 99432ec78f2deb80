//! Handlers for the `/users` resource (teacher only).

use attendft_core::error::CoreError;
use attendft_core::types::DbId;
use attendft_db::models::user::UserResponse;
use attendft_db::repositories::UserRepo;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::csrf::TeacherMutation;
use crate::middleware::rbac::RequireTeacher;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /users/{id}/active`.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// GET /api/v1/users
///
/// Inactive accounts (pending teacher registrations) come first.
pub async fn list(
    State(state): State<AppState>,
    RequireTeacher(_session): RequireTeacher,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    let data = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/users/{id}/active
///
/// Activate or deactivate an account. Deactivation ends the user's session.
pub async fn set_active(
    State(state): State<AppState>,
    TeacherMutation(session): TeacherMutation,
    Path(id): Path<DbId>,
    Json(input): Json<SetActiveRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == session.user_id && !input.is_active {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }

    let user = UserRepo::set_active(&state.pool, id, input.is_active)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;

    tracing::info!(
        user_id = id,
        is_active = input.is_active,
        teacher_id = session.user_id,
        "Account activation changed",
    );
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
