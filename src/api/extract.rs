//! Request extractors that report malformed input through [`ApiError`], so
//! every failure reaches the client as `{"error": msg}`.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::SongbookError;

use super::ApiError;

/// JSON body. A body that is not valid JSON, or has the wrong shape, is a
/// 400 validation error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let detail = rejection.body_text();
                debug!(error = %detail, "rejected request body");
                Err(SongbookError::validation(format!("Invalid request body: {detail}")).into())
            }
        }
    }
}

/// `:id` path segment of a song route. An id that is not an integer cannot
/// name a stored song, so it is a 404 like any other unknown id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for SongId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| SongbookError::not_found("Song not found"))?;

        raw.trim()
            .parse()
            .map(SongId)
            .map_err(|_| SongbookError::not_found("Song not found").into())
    }
}
