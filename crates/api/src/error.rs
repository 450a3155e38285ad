//! Rendering of domain errors as HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use gallery_core::quota::QuotaError;
use gallery_shared::AppError;

/// Wrapper so handlers can return `Result<_, ApiError>`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        Self(match err {
            QuotaError::InvalidLimit(msg) => AppError::Validation(msg),
            QuotaError::Lookup(_) | QuotaError::Update(_) => AppError::Database(err.to_string()),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}
