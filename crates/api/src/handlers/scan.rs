//! Handler for the kiosk card scan endpoint.
//!
//! Unauthenticated: the reader is trusted by physical proximity. Replies use
//! a flat `{status, action, message, ...}` object rather than the `data`
//! envelope so simple readers can display `message` directly.

use attendft_core::attendance::{self, ScanAction};
use attendft_core::error::CoreError;
use attendft_core::types::Timestamp;
use attendft_db::models::attendance::ScanOutcome;
use attendft_db::repositories::AttendanceRepo;
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Form body for `POST /scan`.
#[derive(Debug, Deserialize)]
pub struct ScanForm {
    #[serde(alias = "cardID")]
    pub card_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Success,
    Error,
}

/// Result of a scan as shown on the reader.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub status: ScanStatus,
    pub action: Option<ScanAction>,
    pub message: String,
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub entry_time: Option<Timestamp>,
    pub exit_time: Option<Timestamp>,
}

impl ScanResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            status: ScanStatus::Error,
            action: None,
            message: message.into(),
            student_id: None,
            student_name: None,
            entry_time: None,
            exit_time: None,
        }
    }
}

/// A failed scan, rendered as a [`ScanResponse`] with an error status.
#[derive(Debug)]
pub struct ScanRejection {
    status: StatusCode,
    message: String,
}

impl From<FormRejection> for ScanRejection {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!(error = %rejection, "Malformed scan request");
        Self {
            status: rejection.status(),
            message: "Invalid scan request.".into(),
        }
    }
}

impl IntoResponse for ScanRejection {
    fn into_response(self) -> Response {
        (self.status, Json(ScanResponse::error(self.message))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/scan
///
/// Toggle the card holder between inside and outside.
pub async fn scan(
    State(state): State<AppState>,
    WithRejection(Form(input), _): WithRejection<Form<ScanForm>, ScanRejection>,
) -> Result<Json<ScanResponse>, ScanRejection> {
    let card_id = attendance::normalize_card_id(input.card_id.as_deref().unwrap_or_default())
        .map_err(|e| ScanRejection {
            status: StatusCode::BAD_REQUEST,
            message: match e {
                CoreError::Validation(msg) => format!("{msg}."),
                other => other.to_string(),
            },
        })?;

    let outcome = AttendanceRepo::record_scan(&state.pool, &card_id, Utc::now())
        .await
        .map_err(|e| {
            tracing::error!(card_id = %card_id, error = %e, "Scan transaction failed");
            ScanRejection {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "Scan could not be recorded, please scan again.".into(),
            }
        })?;

    let response = match outcome {
        ScanOutcome::CardNotRegistered => {
            tracing::info!(card_id = %card_id, "Scan of unregistered card");
            return Err(ScanRejection {
                status: StatusCode::NOT_FOUND,
                message: "Card ID not registered to a student.".into(),
            });
        }
        ScanOutcome::CheckedIn { student, record } => {
            tracing::info!(student_id = %student.student_id, record_id = record.id, "Check-in");
            ScanResponse {
                status: ScanStatus::Success,
                action: Some(ScanAction::Checkin),
                message: "Entry time recorded!".into(),
                student_id: Some(student.student_id),
                student_name: Some(student.full_name),
                entry_time: Some(record.entry_time),
                exit_time: None,
            }
        }
        ScanOutcome::CheckedOut { student, record } => {
            tracing::info!(student_id = %student.student_id, record_id = record.id, "Check-out");
            ScanResponse {
                status: ScanStatus::Success,
                action: Some(ScanAction::Checkout),
                message: "Exit time recorded!".into(),
                student_id: Some(student.student_id),
                student_name: Some(student.full_name),
                entry_time: Some(record.entry_time),
                exit_time: record.exit_time,
            }
        }
    };

    Ok(Json(response))
}
