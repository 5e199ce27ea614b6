//! JSON API over the songbook.
//!
//! Reads are public. Writes go through [`auth::RequireAdmin`], which checks a
//! bearer token when one is configured. Bodies and ids go through the
//! extractors in [`extract`] so bad input gets the same JSON error shape.
//! Every handler runs its store call on the blocking pool because `rusqlite`
//! is synchronous.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::SongbookError;

pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod songs;
pub mod weekly;

pub use error::{ApiError, ApiResult};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    /// Bearer token for write requests; `None` leaves writes open.
    admin_token: Option<String>,
    /// Recorded as the creator of new weekly selections.
    admin_name: String,
}

impl AppState {
    pub fn new(conn: Connection, admin_token: Option<String>, admin_name: impl Into<String>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            admin_token: admin_token.filter(|token| !token.trim().is_empty()),
            admin_name: admin_name.into(),
        }
    }

    pub fn admin_name(&self) -> &str {
        &self.admin_name
    }

    pub(crate) fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    /// Run `work` against the connection on the blocking pool.
    pub(crate) async fn with_conn<T, F>(&self, work: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> crate::error::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| SongbookError::Unavailable("database lock poisoned".into()))?;
            work(&mut conn)
        })
        .await
        .map_err(|err| SongbookError::Unavailable(format!("database task failed: {err}")))?;

        outcome.map_err(ApiError::from)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/songs", get(songs::list_songs).post(songs::create_song))
        .route(
            "/api/songs/:id",
            get(songs::get_song)
                .put(songs::update_song)
                .delete(songs::delete_song),
        )
        .route(
            "/api/weekly-songs",
            get(weekly::get_weekly_songs).post(weekly::upsert_weekly_songs),
        )
        .merge(health::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    if state.admin_token().is_none() {
        warn!("no admin token configured; write endpoints are open to everyone");
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("choir-songbook listening on http://{addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
