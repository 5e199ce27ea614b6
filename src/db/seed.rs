use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

use crate::error::Result;
use crate::models::{NewSong, SelectionRequest};
use crate::selection::upsert_weekly_selection_on;

use super::{count_songs, create_song};

/// Sample songs loaded into an empty songbook: `(title, alternate titles,
/// lyrics)`.
const SAMPLE_SONGS: &[(&str, &[&str], &str)] = &[
    (
        "యూదా స్తుతి",
        &["yudha", "yooda", "yudha stuti"],
        "యూదా యూదా యూదా\nదేవుని స్తుతి\n\nప్రతి రోజు ప్రతి క్షణం\nదేవుని స్తుతించండి",
    ),
    (
        "ప్రభువైన దేవుడు",
        &["prabhuva", "lord god", "prabhu"],
        "ప్రభువైన దేవుడు నన్ను కాపాడుతాడు\nప్రతి సందర్భంలో నా వెంట ఉంటాడు",
    ),
    (
        "దేవుని ప్రేమ",
        &["devuni prema", "love of god"],
        "దేవుని ప్రేమ గొప్పది\nఆయన కృప నిత్యమైనది",
    ),
    (
        "కీర్తనలు పాడుదాం",
        &["keerthanalu", "let us sing"],
        "కీర్తనలు పాడుదాం\nప్రభువును ఘనపరచుదాం",
    ),
    (
        "Amazing Grace",
        &["grace"],
        "Amazing grace, how sweet the sound\nThat saved a wretch like me",
    ),
];

/// Load the sample songs and pick the first three as the selection for the
/// week containing `today`. Does nothing when the songbook already has songs.
/// Returns how many songs were added.
pub fn seed_sample_data(conn: &mut Connection, today: NaiveDate) -> Result<usize> {
    if count_songs(conn)? > 0 {
        info!("songbook already populated, skipping seed");
        return Ok(0);
    }

    let mut ids = Vec::with_capacity(SAMPLE_SONGS.len());
    for (title, alternate_titles, lyrics) in SAMPLE_SONGS {
        let song = create_song(
            conn,
            NewSong {
                title: Some((*title).to_string()),
                alternate_titles: alternate_titles.iter().map(|alt| alt.to_string()).collect(),
                lyrics: Some((*lyrics).to_string()),
            },
        )?;
        ids.push(song.id);
    }

    if let [starting, music, worship, ..] = ids.as_slice() {
        upsert_weekly_selection_on(
            conn,
            today,
            SelectionRequest {
                starting_song: Some(*starting),
                music_song: Some(*music),
                worship_song: Some(*worship),
            },
            Some("seed"),
        )?;
    }

    info!(songs = ids.len(), "seeded sample songbook");
    Ok(ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_selections, list_songs, open_in_memory};
    use crate::selection::get_current_weekly_selection;

    #[test]
    fn seeds_once() {
        let mut conn = open_in_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();

        let added = seed_sample_data(&mut conn, today).unwrap();
        assert_eq!(added, SAMPLE_SONGS.len());
        assert_eq!(seed_sample_data(&mut conn, today).unwrap(), 0);
        assert_eq!(count_selections(&conn).unwrap(), 1);

        let weekly = get_current_weekly_selection(&conn).unwrap();
        assert_eq!(
            weekly.week_start,
            NaiveDate::from_ymd_opt(2026, 10, 18)
        );
        assert!(weekly.starting.is_some() && weekly.music.is_some() && weekly.worship.is_some());
        assert_eq!(list_songs(&conn, Some("yudha stuti")).unwrap().len(), 1);
    }
}
