use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db;
use crate::models::{NewSong, Song, SongPatch};

use super::auth::RequireAdmin;
use super::extract::{ApiJson, SongId};
use super::{ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct SongQuery {
    pub search: Option<String>,
}

/// `GET /api/songs?search=`
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<SongQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let songs = state
        .with_conn(move |conn| db::list_songs(conn, query.search.as_deref()))
        .await?;
    Ok(Json(songs))
}

/// `POST /api/songs`
pub async fn create_song(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ApiJson(new_song): ApiJson<NewSong>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let song = state
        .with_conn(move |conn| db::create_song(conn, new_song))
        .await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// `GET /api/songs/:id`
pub async fn get_song(
    State(state): State<AppState>,
    SongId(id): SongId,
) -> ApiResult<Json<Song>> {
    let song = state.with_conn(move |conn| db::get_song(conn, id)).await?;
    Ok(Json(song))
}

/// `PUT /api/songs/:id`
pub async fn update_song(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    SongId(id): SongId,
    ApiJson(patch): ApiJson<SongPatch>,
) -> ApiResult<Json<Song>> {
    let song = state
        .with_conn(move |conn| db::update_song(conn, id, patch))
        .await?;
    Ok(Json(song))
}

/// `DELETE /api/songs/:id`
pub async fn delete_song(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    SongId(id): SongId,
) -> ApiResult<Json<Value>> {
    state.with_conn(move |conn| db::delete_song(conn, id)).await?;
    Ok(Json(json!({ "message": "Song deleted successfully" })))
}
