use axum::extract::State;
use axum::Json;

use crate::models::{ResolvedSelection, SelectionRequest};
use crate::selection;

use super::auth::RequireAdmin;
use super::extract::ApiJson;
use super::{ApiResult, AppState};

/// `GET /api/weekly-songs`
pub async fn get_weekly_songs(State(state): State<AppState>) -> ApiResult<Json<ResolvedSelection>> {
    let resolved = state
        .with_conn(|conn| selection::get_current_weekly_selection(conn))
        .await?;
    Ok(Json(resolved))
}

/// `POST /api/weekly-songs`
pub async fn upsert_weekly_songs(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ApiJson(request): ApiJson<SelectionRequest>,
) -> ApiResult<Json<ResolvedSelection>> {
    let admin_name = state.admin_name().to_string();
    let resolved = state
        .with_conn(move |conn| {
            selection::upsert_weekly_selection(conn, request, Some(&admin_name))
        })
        .await?;
    Ok(Json(resolved))
}
