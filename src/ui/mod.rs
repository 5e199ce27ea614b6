//! Ratatui front-end: the weekly panels, the searchable songbook and the
//! admin editing flows, all driven straight off the local store.
mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
