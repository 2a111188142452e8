//! HTTP error mapping.
//!
//! Business-rule rejections are not faults: a slot conflict maps to 409 and
//! the other scheduling rejections to 422, each carrying its stable enum
//! code so clients can branch without parsing messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::repository::RepositoryError;
use crate::scheduling::{RejectionReason, TransitionError};

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Handler-level error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Rejected(RejectionReason),
    Transition(TransitionError),
    PropertyDeleteBlocked { active_tours: usize },
    Repository(RepositoryError),
}

pub type ApiResult<T> = Result<T, AppError>;

impl From<RejectionReason> for AppError {
    fn from(reason: RejectionReason) -> Self {
        AppError::Rejected(reason)
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::Transition(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    code: "BAD_REQUEST".to_string(),
                    message: message.clone(),
                    details: None,
                },
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ApiError {
                    code: "NOT_FOUND".to_string(),
                    message: message.clone(),
                    details: None,
                },
            ),
            AppError::Rejected(reason) => {
                let status = match reason {
                    RejectionReason::SlotConflict => StatusCode::CONFLICT,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (
                    status,
                    ApiError {
                        code: reason.code().to_string(),
                        message: reason.message().to_string(),
                        details: None,
                    },
                )
            }
            AppError::Transition(err) => (
                StatusCode::CONFLICT,
                ApiError {
                    code: "INVALID_TRANSITION".to_string(),
                    message: err.to_string(),
                    details: None,
                },
            ),
            AppError::PropertyDeleteBlocked { active_tours } => (
                StatusCode::CONFLICT,
                ApiError {
                    code: "PROPERTY_HAS_SCHEDULED_TOURS".to_string(),
                    message: format!(
                        "Property has {} scheduled tour(s) and cannot be deleted",
                        active_tours
                    ),
                    details: None,
                },
            ),
            AppError::Repository(err) => match err {
                RepositoryError::NotFound { message, .. } => (
                    StatusCode::NOT_FOUND,
                    ApiError {
                        code: "NOT_FOUND".to_string(),
                        message: message.clone(),
                        details: None,
                    },
                ),
                RepositoryError::Validation { message, .. } => (
                    StatusCode::BAD_REQUEST,
                    ApiError {
                        code: "VALIDATION_ERROR".to_string(),
                        message: message.clone(),
                        details: None,
                    },
                ),
                RepositoryError::Conflict { message, .. } => (
                    StatusCode::CONFLICT,
                    ApiError {
                        code: "CONFLICT".to_string(),
                        message: message.clone(),
                        details: None,
                    },
                ),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "Internal server error".to_string(),
                        details: Some(other.to_string()),
                    },
                ),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(code = %body.code, "request failed: {:?}", self);
        }
        (status, Json(body)).into_response()
    }
}
