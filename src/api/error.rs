use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::SongbookError;

/// Errors a handler can return. Validation and lookup failures carry their
/// message to the client; anything else is logged and reported generically.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Songbook(#[from] SongbookError),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Songbook(SongbookError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Songbook(SongbookError::NotFound(message)) => {
                (StatusCode::NOT_FOUND, message)
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Songbook(err) => {
                error!(error = ?err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
