//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use trialcheck_shared::AppError;

/// Wrapper rendering `AppError` as `{"error": message, "code": CODE}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E: Into<AppError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let message = match &self.0 {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Parse(msg)
            | AppError::Storage(msg)
            | AppError::Internal(msg) => msg.clone(),
        };

        (
            status,
            Json(json!({
                "error": message,
                "code": self.0.error_code(),
            })),
        )
            .into_response()
    }
}
