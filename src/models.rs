//! Domain models that mirror the SQLite schema and get passed between the
//! store, the selection service, the HTTP handlers and the TUI. They stay
//! light-weight data holders so the other layers can focus on persistence and
//! presentation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A lyric sheet in the songbook.
pub struct Song {
    /// Primary key from the SQLite store.
    pub id: i64,
    /// Canonical title shown in lists and panels.
    pub title: String,
    /// Search aliases such as transliterations. Persisted as a JSON array in a
    /// single TEXT column but always handled as a real list in memory.
    pub alternate_titles: Vec<String>,
    /// Free-form lyrics; line breaks are significant.
    pub lyrics: String,
}

impl Song {
    /// Case-insensitive substring match over the title and every alternate
    /// title. A blank query matches everything. Both the store and the
    /// songbook screen filter with this so they never disagree.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self
                .alternate_titles
                .iter()
                .any(|alt| alt.to_lowercase().contains(&needle))
    }

    /// `Title (alt one, alt two)` or just the title when there are no aliases.
    pub fn display_title(&self) -> String {
        if self.alternate_titles.is_empty() {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.alternate_titles.join(", "))
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Input for creating a song. Title and lyrics are optional here so missing
/// values reach validation instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSong {
    pub title: Option<String>,
    /// `null` is accepted and treated as no alternate titles.
    #[serde(deserialize_with = "null_as_empty")]
    pub alternate_titles: Vec<String>,
    pub lyrics: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Partial update for a song. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SongPatch {
    pub title: Option<String>,
    pub alternate_titles: Option<Vec<String>>,
    pub lyrics: Option<String>,
}

impl SongPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.alternate_titles.is_none() && self.lyrics.is_none()
    }
}

/// The three slots of a weekly selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Starting,
    Music,
    Worship,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Starting, Slot::Music, Slot::Worship];

    pub fn label(self) -> &'static str {
        match self {
            Slot::Starting => "Starting Song",
            Slot::Music => "Music Song",
            Slot::Worship => "Worship Song",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A stored weekly selection row. Song references are plain ids; a deleted
/// song leaves its id behind and resolves to nothing at read time.
pub struct WeeklySelection {
    pub id: i64,
    /// Sunday of the week this row represents (midnight implied).
    pub week_start: NaiveDate,
    pub starting_song_id: i64,
    pub music_song_id: i64,
    pub worship_song_id: i64,
    /// Admin that first created the row, when known.
    pub created_by: Option<String>,
}

impl WeeklySelection {
    pub(crate) fn song_id(&self, slot: Slot) -> i64 {
        match slot {
            Slot::Starting => self.starting_song_id,
            Slot::Music => self.music_song_id,
            Slot::Worship => self.worship_song_id,
        }
    }
}

/// Requested changes to the current week. Every field is optional; which ones
/// are required depends on whether the week already has a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionRequest {
    pub starting_song: Option<i64>,
    pub music_song: Option<i64>,
    pub worship_song: Option<i64>,
}

impl SelectionRequest {
    pub fn is_empty(&self) -> bool {
        self.starting_song.is_none() && self.music_song.is_none() && self.worship_song.is_none()
    }

    pub fn get(&self, slot: Slot) -> Option<i64> {
        match slot {
            Slot::Starting => self.starting_song,
            Slot::Music => self.music_song,
            Slot::Worship => self.worship_song,
        }
    }

    pub fn set(&mut self, slot: Slot, song_id: Option<i64>) {
        match slot {
            Slot::Starting => self.starting_song = song_id,
            Slot::Music => self.music_song = song_id,
            Slot::Worship => self.worship_song = song_id,
        }
    }

    /// All three ids, or `None` if any is missing.
    pub fn complete(&self) -> Option<(i64, i64, i64)> {
        Some((self.starting_song?, self.music_song?, self.worship_song?))
    }
}

/// A weekly selection with its references resolved to full songs. This is
/// the shape both the API and the weekly screen consume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSelection {
    pub starting: Option<Song>,
    pub music: Option<Song>,
    pub worship: Option<Song>,
    pub week_start: Option<NaiveDate>,
}

impl ResolvedSelection {
    pub fn song(&self, slot: Slot) -> Option<&Song> {
        match slot {
            Slot::Starting => self.starting.as_ref(),
            Slot::Music => self.music.as_ref(),
            Slot::Worship => self.worship.as_ref(),
        }
    }
}
