//! Persistence module split across logical submodules.

mod connection;
mod seed;
mod songs;
mod weekly;

pub use connection::{ensure_schema, open_database, open_in_memory};
pub use seed::seed_sample_data;
pub use songs::{count_songs, create_song, delete_song, find_song, get_song, list_songs, update_song};
pub use weekly::{
    count_selections, find_selection_for_week, insert_selection, latest_selection,
    update_selection,
};
