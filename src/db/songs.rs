use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::{Result, SongbookError, StorageContext};
use crate::models::{NewSong, Song, SongPatch};

/// Raw row as stored; alternate titles are still the serialized JSON text.
struct SongRow {
    id: i64,
    title: String,
    alternate_titles: String,
    lyrics: String,
}

impl SongRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            alternate_titles: row.get(2)?,
            lyrics: row.get(3)?,
        })
    }

    fn into_song(self) -> Result<Song> {
        Ok(Song {
            id: self.id,
            title: self.title,
            alternate_titles: decode_alternate_titles(&self.alternate_titles)?,
            lyrics: self.lyrics,
        })
    }
}

fn decode_alternate_titles(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

fn encode_alternate_titles(titles: &[String]) -> Result<String> {
    Ok(serde_json::to_string(titles)?)
}

/// Trim every alias and drop the blank ones.
fn normalize_alternate_titles(titles: Vec<String>) -> Vec<String> {
    titles
        .into_iter()
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}

fn required(value: Option<String>, message: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(SongbookError::validation(message)),
    }
}

/// Fetch the songbook ordered case-insensitively by title. A non-blank filter
/// keeps songs whose title or any alternate title contains it, ignoring case.
/// The match runs in Rust rather than SQL because SQLite's `LIKE` only folds
/// ASCII and most titles here are not.
pub fn list_songs(conn: &Connection, filter: Option<&str>) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, alternate_titles, lyrics
             FROM songs
             ORDER BY title COLLATE NOCASE, id",
        )
        .context("failed to prepare songs query")?;

    let rows = stmt
        .query_map([], SongRow::from_row)
        .context("failed to iterate songs")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect songs")?;

    let query = filter.map(str::trim).unwrap_or_default();
    let mut songs = Vec::with_capacity(rows.len());
    for row in rows {
        let song = row.into_song()?;
        if song.matches(query) {
            songs.push(song);
        }
    }

    Ok(songs)
}

/// Look up a song, returning `None` for unknown ids. Weekly selections use
/// this to resolve references that may dangle.
pub fn find_song(conn: &Connection, id: i64) -> Result<Option<Song>> {
    let row = conn
        .query_row(
            "SELECT id, title, alternate_titles, lyrics FROM songs WHERE id = ?1",
            params![id],
            SongRow::from_row,
        )
        .optional()
        .context("failed to load song")?;

    row.map(SongRow::into_song).transpose()
}

pub fn get_song(conn: &Connection, id: i64) -> Result<Song> {
    find_song(conn, id)?.ok_or_else(|| SongbookError::not_found("Song not found"))
}

pub fn count_songs(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))
        .context("failed to count songs")
}

/// Insert a brand new song and echo the hydrated struct so callers do not have
/// to re-query.
pub fn create_song(conn: &Connection, new_song: NewSong) -> Result<Song> {
    let title = required(new_song.title, "Title and lyrics are required")?;
    let lyrics = required(new_song.lyrics, "Title and lyrics are required")?;
    let alternate_titles = normalize_alternate_titles(new_song.alternate_titles);

    conn.execute(
        "INSERT INTO songs (title, alternate_titles, lyrics) VALUES (?1, ?2, ?3)",
        params![title, encode_alternate_titles(&alternate_titles)?, lyrics],
    )
    .context("failed to insert song")?;

    let song = Song {
        id: conn.last_insert_rowid(),
        title,
        alternate_titles,
        lyrics,
    };
    info!(song_id = song.id, title = %song.title, "song created");
    Ok(song)
}

/// Apply only the fields present in `patch`. Supplying a blank title or blank
/// lyrics is rejected so a song never loses either.
pub fn update_song(conn: &Connection, id: i64, patch: SongPatch) -> Result<Song> {
    let mut song = get_song(conn, id)?;
    if patch.is_empty() {
        return Ok(song);
    }

    if let Some(title) = patch.title {
        song.title = required(Some(title), "Title cannot be empty")?;
    }
    if let Some(lyrics) = patch.lyrics {
        song.lyrics = required(Some(lyrics), "Lyrics cannot be empty")?;
    }
    if let Some(alternate_titles) = patch.alternate_titles {
        song.alternate_titles = normalize_alternate_titles(alternate_titles);
    }

    let updated = conn
        .execute(
            "UPDATE songs SET title = ?1, alternate_titles = ?2, lyrics = ?3 WHERE id = ?4",
            params![
                song.title,
                encode_alternate_titles(&song.alternate_titles)?,
                song.lyrics,
                id
            ],
        )
        .context("failed to update song")?;

    if updated == 0 {
        return Err(SongbookError::not_found("Song not found"));
    }
    info!(song_id = id, "song updated");
    Ok(song)
}

/// Permanently delete a song. Weekly selections pointing at it are left alone
/// and will resolve the reference to nothing.
pub fn delete_song(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM songs WHERE id = ?1", params![id])
        .context("failed to delete song")?;

    if deleted == 0 {
        Err(SongbookError::not_found("Song not found"))
    } else {
        info!(song_id = id, "song deleted");
        Ok(())
    }
}
