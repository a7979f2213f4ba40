//! Pre-stream error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scout_core::AppError;

/// A failure detected before the event stream was opened.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            AppError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Query is required" }),
            ),
            AppError::MissingSearchCredential => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "error": self.0.to_string(),
                    "message": "Pass searchApiKey in the request or configure a server-side search key",
                }),
            ),
            AppError::MissingGenerationCredential => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({
                    "error": self.0.to_string(),
                    "message": "Pass generationApiKey in the request or configure a server-side generation key",
                }),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": "Search failed", "message": other.to_string() }),
            ),
        };

        tracing::warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        (status, Json(body)).into_response()
    }
}
