use chrono::{DateTime, Local};

use crate::models::{ResolvedSelection, Slot, Song};

/// State behind the "This Week's Songs" panels.
pub(crate) struct WeeklyScreen {
    pub(crate) selection: ResolvedSelection,
    pub(crate) last_updated: Option<DateTime<Local>>,
    pub(crate) focused: Slot,
    expanded: [bool; 3],
    scroll: [u16; 3],
}

fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::Starting => 0,
        Slot::Music => 1,
        Slot::Worship => 2,
    }
}

impl WeeklyScreen {
    pub(crate) fn new(selection: ResolvedSelection) -> Self {
        Self {
            selection,
            last_updated: Some(Local::now()),
            focused: Slot::Starting,
            expanded: [false; 3],
            scroll: [0; 3],
        }
    }

    /// Replace the selection after a poll. Scroll offsets reset only for
    /// panels whose song changed.
    pub(crate) fn set_selection(&mut self, selection: ResolvedSelection) {
        for slot in Slot::ALL {
            let before = self.selection.song(slot).map(|song| song.id);
            let after = selection.song(slot).map(|song| song.id);
            if before != after {
                self.scroll[slot_index(slot)] = 0;
            }
        }
        self.selection = selection;
        self.last_updated = Some(Local::now());
    }

    pub(crate) fn is_expanded(&self, slot: Slot) -> bool {
        self.expanded[slot_index(slot)]
    }

    pub(crate) fn toggle(&mut self, slot: Slot) -> bool {
        let idx = slot_index(slot);
        self.expanded[idx] = !self.expanded[idx];
        self.focused = slot;
        self.expanded[idx]
    }

    /// Expand every panel, or collapse them all if they are already open.
    pub(crate) fn toggle_all(&mut self) {
        let open = !self.expanded.iter().all(|expanded| *expanded);
        self.expanded = [open; 3];
    }

    pub(crate) fn move_focus(&mut self, offset: isize) {
        let len = Slot::ALL.len() as isize;
        let idx = (slot_index(self.focused) as isize + offset).clamp(0, len - 1);
        self.focused = Slot::ALL[idx as usize];
    }

    pub(crate) fn scroll(&self, slot: Slot) -> u16 {
        self.scroll[slot_index(slot)]
    }

    pub(crate) fn scroll_focused(&mut self, delta: i32) {
        if !self.is_expanded(self.focused) {
            return;
        }
        let idx = slot_index(self.focused);
        let next = (i32::from(self.scroll[idx]) + delta).clamp(0, i32::from(u16::MAX));
        self.scroll[idx] = next as u16;
    }
}

/// The searchable song list.
pub(crate) struct SongbookScreen {
    pub(crate) songs: Vec<Song>,
    pub(crate) filtered_songs: Vec<Song>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl SongbookScreen {
    pub(crate) fn new(songs: Vec<Song>) -> Self {
        let mut screen = Self {
            filtered_songs: Vec::new(),
            songs,
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    /// Filter locally with the same rules the store uses for `?search=`.
    pub(crate) fn apply_filter(&mut self) {
        let query = self.filter.as_deref().unwrap_or_default();
        self.filtered_songs = self
            .songs
            .iter()
            .filter(|song| song.matches(query))
            .cloned()
            .collect();
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    pub(crate) fn has_search(&self) -> bool {
        self.filter
            .as_ref()
            .map(|query| !query.trim().is_empty())
            .unwrap_or(false)
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.filtered_songs.get(self.selected)
    }

    pub(crate) fn song_by_id(&self, id: i64) -> Option<&Song> {
        self.songs.iter().find(|song| song.id == id)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered_songs.is_empty() {
            return;
        }
        let len = self.filtered_songs.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.filtered_songs.len().saturating_sub(1);
    }

    /// Select the song with `id` if it is visible.
    pub(crate) fn focus(&mut self, id: i64) {
        if let Some(idx) = self.filtered_songs.iter().position(|song| song.id == id) {
            self.selected = idx;
        }
    }

    pub(crate) fn set_songs(&mut self, songs: Vec<Song>) {
        self.songs = songs;
        self.apply_filter();
    }

    fn ensure_in_bounds(&mut self) {
        if self.filtered_songs.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered_songs.len() {
            self.selected = self.filtered_songs.len() - 1;
        }
    }
}

/// Full-screen lyrics for one song.
pub(crate) struct LyricsView {
    pub(crate) song: Song,
    pub(crate) scroll: u16,
}

impl LyricsView {
    pub(crate) fn new(song: Song) -> Self {
        Self { song, scroll: 0 }
    }

    pub(crate) fn scroll_by(&mut self, delta: i32) {
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    }
}
