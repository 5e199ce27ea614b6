//! Core library surface for the choir songbook.
//!
//! The store (`db`) and the weekly selection service (`selection`) hold all
//! the rules; the JSON API (`api`) and the terminal UI (`ui`) are thin layers
//! over them so both front-ends always agree.
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod prefs;
pub mod selection;
pub mod ui;

/// Convenience re-exports for the persistence layer.
pub use db::{open_database, open_in_memory, seed_sample_data};

/// The primary domain types that other layers manipulate.
pub use models::{ResolvedSelection, SelectionRequest, Song};

pub use error::SongbookError;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
