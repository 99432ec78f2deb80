//! Handlers for the `/students` resource (teacher only).

use attendft_core::attendance::normalize_card_id;
use attendft_core::error::CoreError;
use attendft_core::identity::NewAccount;
use attendft_core::roles::Role;
use attendft_core::search::{clamp_limit, like_pattern};
use attendft_db::models::student::{CreateStudent, Student};
use attendft_db::models::user::{CreateUser, UserResponse};
use attendft_db::repositories::StudentRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::csrf::TeacherMutation;
use crate::middleware::rbac::RequireTeacher;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /students`: the profile plus its login account.
#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub student_id: String,
    pub full_name: String,
    pub card_id: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CreateStudentResponse {
    pub student: Student,
    pub user: UserResponse,
}

/// GET /api/v1/students?search=&limit=
pub async fn list(
    State(state): State<AppState>,
    RequireTeacher(_session): RequireTeacher,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    let pattern = like_pattern(params.search.as_deref());
    let data = StudentRepo::list(&state.pool, pattern.as_deref(), clamp_limit(params.limit)).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/students
///
/// Create a student profile and an active student account in one step.
pub async fn create(
    State(state): State<AppState>,
    TeacherMutation(session): TeacherMutation,
    Json(input): Json<CreateStudentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreateStudentResponse>>)> {
    NewAccount {
        username: &input.username,
        email: &input.email,
        password: &input.password,
        confirm_password: &input.password,
        role: Role::Student.as_str(),
        full_name: &input.full_name,
        student_id: Some(input.student_id.as_str()),
    }
    .validate(state.config.min_password_length)?;
    let card_id = normalize_card_id(&input.card_id)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let student_id = input.student_id.trim().to_string();
    let full_name = input.full_name.trim().to_string();

    let profile = CreateStudent {
        student_id: student_id.clone(),
        full_name: full_name.clone(),
        card_id,
    };
    let account = CreateUser {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_string(),
        password_hash,
        role: Role::Student,
        full_name,
        student_id: Some(student_id),
        is_active: true,
    };

    let (student, user) = StudentRepo::create_with_account(&state.pool, &profile, &account).await?;
    tracing::info!(
        student_id = %student.student_id,
        user_id = user.id,
        teacher_id = session.user_id,
        "Student created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreateStudentResponse {
                student,
                user: UserResponse::from(&user),
            },
        }),
    ))
}

/// DELETE /api/v1/students/{student_id}
///
/// Removes the profile, its account and its attendance history.
pub async fn delete(
    State(state): State<AppState>,
    TeacherMutation(session): TeacherMutation,
    Path(student_id): Path<String>,
) -> AppResult<StatusCode> {
    if !StudentRepo::delete(&state.pool, &student_id).await? {
        return Err(CoreError::not_found("Student", &student_id).into());
    }
    tracing::info!(%student_id, teacher_id = session.user_id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}
