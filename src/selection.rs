//! Weekly selection service: decides which week a write targets and whether it
//! creates a new row or partially updates the existing one.
//!
//! Reads and writes deliberately use different lookups. The getter shows the
//! most recent row whatever week it belongs to, so last week's songs stay on
//! screen until an admin touches the new week. The writer matches the current
//! week exactly, so the first edit of a new week creates a fresh row.

use chrono::{Datelike, Days, Local, NaiveDate};
use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::db::{
    find_selection_for_week, find_song, insert_selection, latest_selection, update_selection,
};
use crate::error::{Result, SongbookError, StorageContext};
use crate::models::{ResolvedSelection, SelectionRequest, Slot, WeeklySelection};

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Week start for today in the server's local time zone.
pub fn current_week_start() -> NaiveDate {
    week_start(Local::now().date_naive())
}

/// Resolve every stored reference; missing songs become `None`.
pub fn resolve_selection(conn: &Connection, selection: &WeeklySelection) -> Result<ResolvedSelection> {
    let resolve = |slot: Slot| find_song(conn, selection.song_id(slot));
    Ok(ResolvedSelection {
        starting: resolve(Slot::Starting)?,
        music: resolve(Slot::Music)?,
        worship: resolve(Slot::Worship)?,
        week_start: Some(selection.week_start),
    })
}

/// The most recently selected week, resolved. All fields are empty when no
/// selection was ever made.
pub fn get_current_weekly_selection(conn: &Connection) -> Result<ResolvedSelection> {
    match latest_selection(conn)? {
        Some(selection) => resolve_selection(conn, &selection),
        None => Ok(ResolvedSelection::default()),
    }
}

/// Create or partially update the selection for the current week.
pub fn upsert_weekly_selection(
    conn: &mut Connection,
    request: SelectionRequest,
    created_by: Option<&str>,
) -> Result<ResolvedSelection> {
    upsert_weekly_selection_on(conn, Local::now().date_naive(), request, created_by)
}

/// Same as [`upsert_weekly_selection`] with `today` supplied by the caller.
///
/// The lookup and the write share one immediate transaction, so two writers
/// racing on a brand new week cannot both take the create branch; the
/// `UNIQUE(week_start)` constraint backs this up across processes.
pub fn upsert_weekly_selection_on(
    conn: &mut Connection,
    today: NaiveDate,
    request: SelectionRequest,
    created_by: Option<&str>,
) -> Result<ResolvedSelection> {
    if request.is_empty() {
        return Err(SongbookError::validation(
            "At least one song must be provided",
        ));
    }

    let week = week_start(today);
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("failed to begin weekly selection transaction")?;

    let selection = match find_selection_for_week(&tx, week)? {
        Some(existing) => {
            let updated = update_selection(&tx, &existing, &request)?;
            info!(week_start = %week, selection_id = updated.id, "weekly selection updated");
            updated
        }
        None => {
            let ids = request.complete().ok_or_else(|| {
                SongbookError::validation(
                    "All three songs are required when creating weekly selections for the first time",
                )
            })?;
            for id in [ids.0, ids.1, ids.2] {
                if find_song(&tx, id)?.is_none() {
                    return Err(SongbookError::not_found("One or more songs not found"));
                }
            }
            let created = insert_selection(&tx, week, ids, created_by)?;
            info!(week_start = %week, selection_id = created.id, "weekly selection created");
            created
        }
    };

    let resolved = resolve_selection(&tx, &selection)?;
    tx.commit()
        .context("failed to commit weekly selection")?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_selections, create_song, delete_song, open_in_memory};
    use crate::models::{NewSong, Song};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn add_song(conn: &Connection, title: &str) -> Song {
        create_song(
            conn,
            NewSong {
                title: Some(title.to_string()),
                alternate_titles: Vec::new(),
                lyrics: Some(format!("{title} lyrics")),
            },
        )
        .unwrap()
    }

    fn full_request(a: &Song, b: &Song, c: &Song) -> SelectionRequest {
        SelectionRequest {
            starting_song: Some(a.id),
            music_song: Some(b.id),
            worship_song: Some(c.id),
        }
    }

    #[test]
    fn week_start_is_previous_or_same_sunday() {
        // 2026-10-18 is a Sunday.
        assert_eq!(week_start(date(2026, 10, 18)), date(2026, 10, 18));
        assert_eq!(week_start(date(2026, 10, 21)), date(2026, 10, 18));
        assert_eq!(week_start(date(2026, 10, 24)), date(2026, 10, 18));
        assert_eq!(week_start(date(2026, 10, 25)), date(2026, 10, 25));
        assert_eq!(week_start(date(2027, 1, 1)), date(2026, 12, 27));
    }

    #[test]
    fn getter_without_rows_is_all_none() {
        let conn = open_in_memory().unwrap();
        assert_eq!(
            get_current_weekly_selection(&conn).unwrap(),
            ResolvedSelection::default()
        );
    }

    #[test]
    fn empty_request_is_rejected() {
        let mut conn = open_in_memory().unwrap();
        let result = upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 20),
            SelectionRequest::default(),
            None,
        );
        assert!(matches!(result, Err(SongbookError::Validation(_))));
    }

    #[test]
    fn first_creation_needs_all_three_songs() {
        let mut conn = open_in_memory().unwrap();
        let a = add_song(&conn, "A");

        let result = upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 20),
            SelectionRequest {
                starting_song: Some(a.id),
                ..SelectionRequest::default()
            },
            None,
        );

        assert!(matches!(result, Err(SongbookError::Validation(_))));
        assert_eq!(count_selections(&conn).unwrap(), 0);
    }

    #[test]
    fn first_creation_with_unknown_song_creates_nothing() {
        let mut conn = open_in_memory().unwrap();
        let a = add_song(&conn, "A");
        let b = add_song(&conn, "B");

        let result = upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 20),
            SelectionRequest {
                starting_song: Some(a.id),
                music_song: Some(b.id),
                worship_song: Some(9_999),
            },
            None,
        );

        assert!(matches!(result, Err(SongbookError::NotFound(_))));
        assert_eq!(count_selections(&conn).unwrap(), 0);
    }

    #[test]
    fn creation_resolves_songs_and_records_admin() {
        let mut conn = open_in_memory().unwrap();
        let (a, b, c) = (add_song(&conn, "A"), add_song(&conn, "B"), add_song(&conn, "C"));

        let resolved = upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 22),
            full_request(&a, &b, &c),
            Some("director"),
        )
        .unwrap();

        assert_eq!(resolved.starting, Some(a));
        assert_eq!(resolved.music, Some(b));
        assert_eq!(resolved.worship, Some(c));
        assert_eq!(resolved.week_start, Some(date(2026, 10, 18)));

        let stored = latest_selection(&conn).unwrap().unwrap();
        assert_eq!(stored.created_by.as_deref(), Some("director"));
    }

    #[test]
    fn partial_update_changes_only_supplied_slot() {
        let mut conn = open_in_memory().unwrap();
        let (a, b, c) = (add_song(&conn, "A"), add_song(&conn, "B"), add_song(&conn, "C"));
        let replacement = add_song(&conn, "B2");
        upsert_weekly_selection_on(&mut conn, date(2026, 10, 19), full_request(&a, &b, &c), None)
            .unwrap();

        let resolved = upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 23),
            SelectionRequest {
                music_song: Some(replacement.id),
                ..SelectionRequest::default()
            },
            None,
        )
        .unwrap();

        assert_eq!(resolved.starting, Some(a));
        assert_eq!(resolved.music, Some(replacement));
        assert_eq!(resolved.worship, Some(c));
        assert_eq!(count_selections(&conn).unwrap(), 1);
    }

    #[test]
    fn partial_update_skips_existence_check() {
        let mut conn = open_in_memory().unwrap();
        let (a, b, c) = (add_song(&conn, "A"), add_song(&conn, "B"), add_song(&conn, "C"));
        upsert_weekly_selection_on(&mut conn, date(2026, 10, 19), full_request(&a, &b, &c), None)
            .unwrap();

        let resolved = upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 19),
            SelectionRequest {
                worship_song: Some(4_242),
                ..SelectionRequest::default()
            },
            None,
        )
        .unwrap();

        assert_eq!(resolved.worship, None);
        assert_eq!(latest_selection(&conn).unwrap().unwrap().worship_song_id, 4_242);
    }

    #[test]
    fn second_full_write_in_same_week_overrides_first() {
        let mut conn = open_in_memory().unwrap();
        let songs: Vec<Song> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|title| add_song(&conn, title))
            .collect();

        upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 18),
            full_request(&songs[0], &songs[1], &songs[2]),
            None,
        )
        .unwrap();
        let second = upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 24),
            full_request(&songs[3], &songs[4], &songs[5]),
            None,
        )
        .unwrap();

        assert_eq!(count_selections(&conn).unwrap(), 1);
        assert_eq!(second.starting.as_ref(), Some(&songs[3]));
        assert_eq!(get_current_weekly_selection(&conn).unwrap(), second);
    }

    #[test]
    fn new_week_creates_new_row_and_getter_follows_recency() {
        let mut conn = open_in_memory().unwrap();
        let (a, b, c) = (add_song(&conn, "A"), add_song(&conn, "B"), add_song(&conn, "C"));
        upsert_weekly_selection_on(&mut conn, date(2026, 10, 12), full_request(&a, &b, &c), None)
            .unwrap();

        // A stale week is still what the getter shows.
        let stale = get_current_weekly_selection(&conn).unwrap();
        assert_eq!(stale.week_start, Some(date(2026, 10, 11)));

        // A partial write in a new week cannot create the row.
        let partial = upsert_weekly_selection_on(
            &mut conn,
            date(2026, 10, 19),
            SelectionRequest {
                music_song: Some(b.id),
                ..SelectionRequest::default()
            },
            None,
        );
        assert!(matches!(partial, Err(SongbookError::Validation(_))));

        upsert_weekly_selection_on(&mut conn, date(2026, 10, 19), full_request(&c, &b, &a), None)
            .unwrap();
        assert_eq!(count_selections(&conn).unwrap(), 2);
        let current = get_current_weekly_selection(&conn).unwrap();
        assert_eq!(current.week_start, Some(date(2026, 10, 18)));
        assert_eq!(current.starting, Some(c));
    }

    #[test]
    fn deleted_song_resolves_to_none() {
        let mut conn = open_in_memory().unwrap();
        let (a, b, c) = (add_song(&conn, "A"), add_song(&conn, "B"), add_song(&conn, "C"));
        upsert_weekly_selection_on(&mut conn, date(2026, 10, 18), full_request(&a, &b, &c), None)
            .unwrap();

        delete_song(&conn, b.id).unwrap();

        let resolved = get_current_weekly_selection(&conn).unwrap();
        assert_eq!(resolved.starting, Some(a));
        assert_eq!(resolved.music, None);
        assert_eq!(resolved.worship, Some(c));
    }
}
