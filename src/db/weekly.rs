use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, StorageContext};
use crate::models::{SelectionRequest, WeeklySelection};

const SELECTION_COLUMNS: &str =
    "id, week_start, starting_song_id, music_song_id, worship_song_id, created_by";

fn selection_from_row(row: &Row<'_>) -> rusqlite::Result<WeeklySelection> {
    Ok(WeeklySelection {
        id: row.get(0)?,
        week_start: row.get(1)?,
        starting_song_id: row.get(2)?,
        music_song_id: row.get(3)?,
        worship_song_id: row.get(4)?,
        created_by: row.get(5)?,
    })
}

/// The row with the most recent `week_start`, whichever week that is.
pub fn latest_selection(conn: &Connection) -> Result<Option<WeeklySelection>> {
    conn.query_row(
        &format!(
            "SELECT {SELECTION_COLUMNS} FROM weekly_selections
             ORDER BY week_start DESC LIMIT 1"
        ),
        [],
        selection_from_row,
    )
    .optional()
    .context("failed to load latest weekly selection")
}

/// Exact lookup by week.
pub fn find_selection_for_week(
    conn: &Connection,
    week_start: NaiveDate,
) -> Result<Option<WeeklySelection>> {
    conn.query_row(
        &format!("SELECT {SELECTION_COLUMNS} FROM weekly_selections WHERE week_start = ?1"),
        params![week_start],
        selection_from_row,
    )
    .optional()
    .context("failed to load weekly selection")
}

pub fn count_selections(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM weekly_selections", [], |row| {
        row.get(0)
    })
    .context("failed to count weekly selections")
}

/// Insert the row for a week. The `UNIQUE(week_start)` constraint rejects a
/// second row for the same week.
pub fn insert_selection(
    conn: &Connection,
    week_start: NaiveDate,
    (starting, music, worship): (i64, i64, i64),
    created_by: Option<&str>,
) -> Result<WeeklySelection> {
    conn.execute(
        "INSERT INTO weekly_selections
            (week_start, starting_song_id, music_song_id, worship_song_id, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![week_start, starting, music, worship, created_by],
    )
    .context("failed to insert weekly selection")?;

    Ok(WeeklySelection {
        id: conn.last_insert_rowid(),
        week_start,
        starting_song_id: starting,
        music_song_id: music,
        worship_song_id: worship,
        created_by: created_by.map(str::to_string),
    })
}

/// Overwrite only the references present in `request`.
pub fn update_selection(
    conn: &Connection,
    existing: &WeeklySelection,
    request: &SelectionRequest,
) -> Result<WeeklySelection> {
    let updated = WeeklySelection {
        starting_song_id: request.starting_song.unwrap_or(existing.starting_song_id),
        music_song_id: request.music_song.unwrap_or(existing.music_song_id),
        worship_song_id: request.worship_song.unwrap_or(existing.worship_song_id),
        ..existing.clone()
    };

    conn.execute(
        "UPDATE weekly_selections
         SET starting_song_id = ?1, music_song_id = ?2, worship_song_id = ?3
         WHERE id = ?4",
        params![
            updated.starting_song_id,
            updated.music_song_id,
            updated.worship_song_id,
            updated.id
        ],
    )
    .context("failed to update weekly selection")?;

    Ok(updated)
}
