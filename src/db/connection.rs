use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

/// How long a writer waits on a lock held by another process (for example the
/// HTTP server and the TUI sharing one file) before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Ensure the database file exists, run lazy migrations, and return a live
/// connection.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    ensure_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

/// Fresh in-memory database with the full schema. Used by tests and by
/// anything that wants a throwaway songbook.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create every table idempotently. Weekly selections reference songs by id
/// without a foreign key: deleting a song leaves the reference dangling and
/// readers resolve it to nothing.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            alternate_titles TEXT NOT NULL DEFAULT '[]',
            lyrics TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create songs table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS weekly_selections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            week_start TEXT NOT NULL UNIQUE,
            starting_song_id INTEGER NOT NULL,
            music_song_id INTEGER NOT NULL,
            worship_song_id INTEGER NOT NULL,
            created_by TEXT
        )",
        [],
    )
    .context("failed to create weekly_selections table")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_database_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("songbook.sqlite");

        let conn = open_database(&path).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('songs', 'weekly_selections')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert!(path.exists());
        assert_eq!(tables, 2);
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
    }
}
