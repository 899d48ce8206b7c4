use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stempark_catalog::{ValidationIssue, VariantError};
use stempark_core::ServiceError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    InvalidTree(Vec<ValidationIssue>),
    NotFoundError(String),
    PayloadTooLarge(String),
    InternalServerError(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            ServiceError::Invalid(issues) => AppError::InvalidTree(issues),
            ServiceError::Edit { .. } | ServiceError::UploadOutOfRange { .. } => {
                AppError::ValidationError(err.to_string())
            }
            ServiceError::Storage(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<VariantError> for AppError {
    fn from(err: VariantError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, issues) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::InvalidTree(issues) => (
                StatusCode::BAD_REQUEST,
                format!("Variant tree has {} validation issue(s)", issues.len()),
                Some(issues),
            ),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
        };

        let body = match issues {
            Some(issues) => json!({ "error": error_message, "issues": issues }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}
