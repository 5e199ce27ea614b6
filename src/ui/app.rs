use std::cmp::min;
use std::mem;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::warn;

use crate::db::{create_song, delete_song, list_songs, update_song};
use crate::error::SongbookError;
use crate::models::{SelectionRequest, Slot, Song};
use crate::prefs::PreferenceStore;
use crate::selection::{get_current_weekly_selection, upsert_weekly_selection};

use super::forms::{ConfirmSongDelete, SongField, SongForm};
use super::helpers::{
    alternate_titles_line, centered_rect, format_week, lyric_lines, surface_error,
};
use super::screens::{LyricsView, SongbookScreen, WeeklyScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Week heading plus the "last updated" line.
const HEADER_HEIGHT: u16 = 4;
/// A collapsed weekly panel shows the title and alternate titles only.
const COLLAPSED_PANEL_HEIGHT: u16 = 4;
const SONG_CARD_HEIGHT: u16 = 4;
/// How often the weekly screen re-reads the current selection.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Weekly,
    Songbook,
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    Searching(SearchState),
    ViewingLyrics(LyricsView),
    CreatingSong(SongForm),
    EditingSong { original: Song, form: SongForm },
    ConfirmSongDelete(ConfirmSongDelete),
}

/// State for an active inline search on the songbook.
struct SearchState {
    query: String,
}

/// What a key press did to an open song form.
enum FormAction {
    Continue,
    Cancel,
    Submit,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    prefs: PreferenceStore,
    /// Name recorded on new weekly rows; `None` means read-only.
    admin: Option<String>,
    screen: Screen,
    weekly: WeeklyScreen,
    songbook: SongbookScreen,
    mode: Mode,
    status: Option<StatusMessage>,
    /// Slots staged from the songbook, published with `w`.
    draft: SelectionRequest,
    saved_search: Option<SearchState>,
    last_poll: Instant,
}

impl App {
    pub fn new(
        conn: Connection,
        prefs: PreferenceStore,
        admin: bool,
        admin_name: String,
    ) -> Result<Self> {
        let selection =
            get_current_weekly_selection(&conn).context("failed to load weekly songs")?;
        let songs = list_songs(&conn, None).context("failed to load songs")?;

        Ok(Self {
            conn,
            prefs,
            admin: admin.then_some(admin_name),
            screen: Screen::Weekly,
            weekly: WeeklyScreen::new(selection),
            songbook: SongbookScreen::new(songs),
            mode: Mode::Normal,
            status: None,
            draft: SelectionRequest::default(),
            saved_search: None,
            last_poll: Instant::now(),
        })
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::ViewingLyrics(view) => self.handle_lyrics(code, view),
            Mode::CreatingSong(form) => self.handle_create_song(code, form)?,
            Mode::EditingSong { original, form } => self.handle_edit_song(code, original, form)?,
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm)?,
        };

        Ok(exit)
    }

    /// Re-read the weekly selection once the poll interval has passed.
    pub(crate) fn on_tick(&mut self) {
        if self.last_poll.elapsed() < POLL_INTERVAL {
            return;
        }
        if let Err(err) = self.refresh_weekly() {
            warn!(error = %err, "weekly poll failed");
            self.set_status(
                format!("Could not refresh weekly songs: {}", surface_error(&err)),
                StatusKind::Error,
            );
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Char('[') => {
                self.change_font_size(false);
                return Ok(Mode::Normal);
            }
            KeyCode::Char(']') => {
                self.change_font_size(true);
                return Ok(Mode::Normal);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                match self.refresh_weekly().and_then(|_| self.reload_songs(None)) {
                    Ok(()) => self.set_status("Refreshed.", StatusKind::Info),
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => {
                self.screen = match self.screen {
                    Screen::Weekly => Screen::Songbook,
                    Screen::Songbook => Screen::Weekly,
                };
                self.clear_status();
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.screen {
            Screen::Weekly => {
                self.handle_weekly_key(code, exit);
                Ok(Mode::Normal)
            }
            Screen::Songbook => self.handle_songbook_key(code),
        }
    }

    fn handle_weekly_key(&mut self, code: KeyCode, exit: &mut bool) {
        match code {
            KeyCode::Esc => *exit = true,
            KeyCode::Char('1') => {
                self.weekly.toggle(Slot::Starting);
            }
            KeyCode::Char('2') => {
                self.weekly.toggle(Slot::Music);
            }
            KeyCode::Char('3') => {
                self.weekly.toggle(Slot::Worship);
            }
            KeyCode::Char('a') | KeyCode::Char('A') => self.weekly.toggle_all(),
            KeyCode::Enter => {
                self.weekly.toggle(self.weekly.focused);
            }
            KeyCode::Up => self.weekly.move_focus(-1),
            KeyCode::Down => self.weekly.move_focus(1),
            KeyCode::PageUp => self.weekly.scroll_focused(-5),
            KeyCode::PageDown => self.weekly.scroll_focused(5),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.screen = Screen::Songbook;
                self.clear_status();
            }
            _ => {}
        }
    }

    fn handle_songbook_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                if self.songbook.has_search() {
                    self.songbook.set_filter(None);
                    self.set_status("Search cleared.", StatusKind::Info);
                } else {
                    self.screen = Screen::Weekly;
                    self.clear_status();
                }
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                let query = self.songbook.filter.clone().unwrap_or_default();
                return Ok(Mode::Searching(SearchState { query }));
            }
            KeyCode::Up => self.songbook.move_selection(-1),
            KeyCode::Down => self.songbook.move_selection(1),
            KeyCode::PageUp => self.songbook.move_selection(-5),
            KeyCode::PageDown => self.songbook.move_selection(5),
            KeyCode::Home => self.songbook.select_first(),
            KeyCode::End => self.songbook.select_last(),
            KeyCode::Enter => {
                if let Some(song) = self.songbook.current_song().cloned() {
                    return Ok(Mode::ViewingLyrics(LyricsView::new(song)));
                }
                self.set_status("No song selected.", StatusKind::Error);
            }
            KeyCode::Char('+') => {
                if self.require_admin() {
                    return Ok(Mode::CreatingSong(SongForm::default()));
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if self.require_admin() {
                    if let Some(song) = self.songbook.current_song().cloned() {
                        return Ok(Mode::EditingSong {
                            form: SongForm::from_song(&song),
                            original: song,
                        });
                    }
                    self.set_status("No song selected to edit.", StatusKind::Error);
                }
            }
            KeyCode::Char('-') => {
                if self.require_admin() {
                    if let Some(song) = self.songbook.current_song().cloned() {
                        let featured_in = Slot::ALL
                            .into_iter()
                            .filter(|slot| {
                                self.weekly.selection.song(*slot).map(|s| s.id) == Some(song.id)
                            })
                            .map(Slot::label)
                            .collect();
                        return Ok(Mode::ConfirmSongDelete(ConfirmSongDelete {
                            song,
                            featured_in,
                        }));
                    }
                    self.set_status("No song selected to delete.", StatusKind::Error);
                }
            }
            KeyCode::Char('1') => self.stage_slot(Slot::Starting),
            KeyCode::Char('2') => self.stage_slot(Slot::Music),
            KeyCode::Char('3') => self.stage_slot(Slot::Worship),
            KeyCode::Char('w') | KeyCode::Char('W') => {
                if self.require_admin() {
                    self.publish_draft();
                }
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                if self.require_admin() {
                    self.draft = SelectionRequest::default();
                    self.set_status("Draft cleared.", StatusKind::Info);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.songbook.set_filter(None);
                return Ok(Mode::Normal);
            }
            KeyCode::Up => self.songbook.move_selection(-1),
            KeyCode::Down => self.songbook.move_selection(1),
            KeyCode::PageUp => self.songbook.move_selection(-5),
            KeyCode::PageDown => self.songbook.move_selection(5),
            KeyCode::Home => self.songbook.select_first(),
            KeyCode::End => self.songbook.select_last(),
            KeyCode::Enter => {
                if let Some(song) = self.songbook.current_song().cloned() {
                    self.saved_search = Some(state);
                    return Ok(Mode::ViewingLyrics(LyricsView::new(song)));
                }
                self.set_status("No song matches the search.", StatusKind::Error);
            }
            KeyCode::Backspace => {
                state.query.pop();
                self.apply_search(&state.query);
            }
            KeyCode::Char(ch) => {
                state.query.push(ch);
                self.apply_search(&state.query);
            }
            _ => {}
        }
        Ok(Mode::Searching(state))
    }

    fn apply_search(&mut self, query: &str) {
        let filter = if query.trim().is_empty() {
            None
        } else {
            Some(query.to_string())
        };
        self.songbook.set_filter(filter);
        self.songbook.select_first();
    }

    fn handle_lyrics(&mut self, code: KeyCode, mut view: LyricsView) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                return self.resume_mode();
            }
            KeyCode::Up => view.scroll_by(-1),
            KeyCode::Down => view.scroll_by(1),
            KeyCode::PageUp => view.scroll_by(-10),
            KeyCode::PageDown => view.scroll_by(10),
            KeyCode::Home => view.scroll = 0,
            KeyCode::Char('[') => self.change_font_size(false),
            KeyCode::Char(']') => self.change_font_size(true),
            _ => {}
        }
        Mode::ViewingLyrics(view)
    }

    fn handle_create_song(&mut self, code: KeyCode, mut form: SongForm) -> Result<Mode> {
        match edit_form(&mut form, code) {
            FormAction::Continue => Ok(Mode::CreatingSong(form)),
            FormAction::Cancel => {
                self.set_status("Song creation cancelled.", StatusKind::Info);
                Ok(self.resume_mode())
            }
            FormAction::Submit => self.submit_new_song(form),
        }
    }

    fn handle_edit_song(
        &mut self,
        code: KeyCode,
        original: Song,
        mut form: SongForm,
    ) -> Result<Mode> {
        match edit_form(&mut form, code) {
            FormAction::Continue => Ok(Mode::EditingSong { original, form }),
            FormAction::Cancel => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                Ok(self.resume_mode())
            }
            FormAction::Submit => self.submit_song_edit(original, form),
        }
    }

    fn handle_confirm_song_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let id = confirm.song.id;
                match delete_song(&self.conn, id) {
                    Ok(()) => {
                        for slot in Slot::ALL {
                            if self.draft.get(slot) == Some(id) {
                                self.draft.set(slot, None);
                            }
                        }
                        self.reload_songs(None)?;
                        self.refresh_weekly()?;
                        self.set_status("Song deleted.", StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.report_store_error(err);
                        Ok(Mode::ConfirmSongDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmSongDelete(confirm)),
        }
    }

    /// Ctrl+E edits the highlighted song while searching or reading lyrics.
    pub(crate) fn handle_ctrl_e(&mut self) -> Result<()> {
        if !matches!(self.mode, Mode::Searching(_) | Mode::ViewingLyrics(_)) {
            return Ok(());
        }
        if !self.require_admin() {
            return Ok(());
        }

        let song = match mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Searching(state) => {
                let song = self.songbook.current_song().cloned();
                self.saved_search = Some(state);
                song
            }
            Mode::ViewingLyrics(view) => Some(view.song),
            other => {
                self.mode = other;
                return Ok(());
            }
        };

        match song {
            Some(song) => {
                self.mode = Mode::EditingSong {
                    form: SongForm::from_song(&song),
                    original: song,
                };
            }
            None => {
                self.mode = self.resume_mode();
                self.set_status("No song selected to edit.", StatusKind::Error);
            }
        }
        Ok(())
    }

    /// Ctrl+S saves an open song form from any field, including lyrics where
    /// Enter inserts a line break.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        self.mode = match mem::replace(&mut self.mode, Mode::Normal) {
            Mode::CreatingSong(form) => self.submit_new_song(form)?,
            Mode::EditingSong { original, form } => self.submit_song_edit(original, form)?,
            other => other,
        };
        Ok(())
    }

    fn submit_new_song(&mut self, mut form: SongForm) -> Result<Mode> {
        let created = form
            .to_new_song()
            .and_then(|new_song| Ok(create_song(&self.conn, new_song)?));

        match created {
            Ok(song) => {
                self.reload_songs(Some(song.id))?;
                self.set_status(format!("Created '{}'.", song.title), StatusKind::Info);
                Ok(self.resume_mode())
            }
            Err(err) => {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Ok(Mode::CreatingSong(form))
            }
        }
    }

    fn submit_song_edit(&mut self, original: Song, mut form: SongForm) -> Result<Mode> {
        let updated = form.to_patch(&original).and_then(|patch| {
            if patch.is_empty() {
                return Ok(None);
            }
            Ok(Some(update_song(&self.conn, original.id, patch)?))
        });

        match updated {
            Ok(None) => {
                self.set_status("No changes to save.", StatusKind::Info);
                Ok(self.resume_mode())
            }
            Ok(Some(song)) => {
                self.reload_songs(Some(song.id))?;
                self.refresh_weekly()?;
                self.set_status("Song updated.", StatusKind::Info);
                Ok(self.resume_mode())
            }
            Err(err) => {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Ok(Mode::EditingSong { original, form })
            }
        }
    }

    fn stage_slot(&mut self, slot: Slot) {
        if !self.require_admin() {
            return;
        }
        let Some(song) = self.songbook.current_song() else {
            self.set_status("No song selected.", StatusKind::Error);
            return;
        };
        let (id, title) = (song.id, song.title.clone());
        self.draft.set(slot, Some(id));
        self.set_status(
            format!(
                "Staged '{title}' as the {}. Press w to publish.",
                slot.label().to_lowercase()
            ),
            StatusKind::Info,
        );
    }

    fn publish_draft(&mut self) {
        if self.draft.is_empty() {
            self.set_status(
                "Nothing staged. Press 1, 2 or 3 on a song first.",
                StatusKind::Error,
            );
            return;
        }

        let created_by = self.admin.clone();
        match upsert_weekly_selection(&mut self.conn, self.draft, created_by.as_deref()) {
            Ok(selection) => {
                self.weekly.set_selection(selection);
                self.last_poll = Instant::now();
                self.draft = SelectionRequest::default();
                self.set_status("This week's songs were updated.", StatusKind::Info);
            }
            Err(err) => self.report_store_error(err),
        }
    }

    fn change_font_size(&mut self, larger: bool) {
        let current = self.prefs.font_size();
        let next = if larger {
            current.larger()
        } else {
            current.smaller()
        };
        if next == current {
            self.set_status(
                format!("Font size is already {}.", current.label()),
                StatusKind::Info,
            );
            return;
        }

        match self.prefs.set_font_size(next) {
            Ok(()) => self.set_status(format!("Font size: {}.", next.label()), StatusKind::Info),
            Err(err) => {
                warn!(error = %err, "failed to save preferences");
                self.set_status(
                    format!("Font size: {} (not saved: {})", next.label(), surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    fn refresh_weekly(&mut self) -> Result<()> {
        self.last_poll = Instant::now();
        let selection =
            get_current_weekly_selection(&self.conn).context("failed to load weekly songs")?;
        self.weekly.set_selection(selection);
        Ok(())
    }

    fn reload_songs(&mut self, focus_id: Option<i64>) -> Result<()> {
        let songs = list_songs(&self.conn, None).context("failed to load songs")?;
        self.songbook.set_songs(songs);
        if let Some(id) = focus_id {
            self.songbook.focus(id);
        }
        Ok(())
    }

    fn require_admin(&mut self) -> bool {
        if self.admin.is_some() {
            return true;
        }
        self.set_status(
            "Read-only. Restart with --admin to make changes.",
            StatusKind::Error,
        );
        false
    }

    fn report_store_error(&mut self, err: SongbookError) {
        if !err.is_user_facing() {
            warn!(error = ?err, "songbook operation failed");
        }
        let err = anyhow::Error::from(err);
        self.set_status(surface_error(&err), StatusKind::Error);
    }

    /// Mode to return to after a form or the lyrics view closes.
    fn resume_mode(&mut self) -> Mode {
        match self.saved_search.take() {
            Some(state) => Mode::Searching(state),
            None => Mode::Normal,
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match self.screen {
            Screen::Weekly => self.draw_weekly(frame, content_area),
            Screen::Songbook => self.draw_songbook(frame, content_area),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, content_area, state),
            Mode::ViewingLyrics(view) => self.draw_lyrics(frame, content_area, view),
            Mode::CreatingSong(form) => self.draw_song_form(frame, area, "Create Song", form),
            Mode::EditingSong { form, .. } => self.draw_song_form(frame, area, "Edit Song", form),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm_song_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_weekly(&self, frame: &mut Frame, area: Rect) {
        let mut constraints = vec![Constraint::Length(HEADER_HEIGHT)];
        let mut any_expanded = false;
        for slot in Slot::ALL {
            if self.weekly.is_expanded(slot) {
                any_expanded = true;
                constraints.push(Constraint::Min(COLLAPSED_PANEL_HEIGHT + 2));
            } else {
                constraints.push(Constraint::Length(COLLAPSED_PANEL_HEIGHT));
            }
        }
        if !any_expanded {
            constraints.push(Constraint::Min(0));
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let updated = self
            .weekly
            .last_updated
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                format_week(self.weekly.selection.week_start),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "Last updated {updated} • refreshes every {}s • font {}",
                    POLL_INTERVAL.as_secs(),
                    self.prefs.font_size().label()
                ),
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("This Week's Songs"),
        );
        frame.render_widget(header, chunks[0]);

        for (idx, slot) in Slot::ALL.into_iter().enumerate() {
            self.draw_weekly_panel(frame, chunks[idx + 1], slot, idx + 1);
        }
    }

    fn draw_weekly_panel(&self, frame: &mut Frame, area: Rect, slot: Slot, key: usize) {
        if area.height == 0 {
            return;
        }

        let expanded = self.weekly.is_expanded(slot);
        let marker = if expanded { "▼" } else { "▶" };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{marker} [{key}] {}", slot.label()));
        if self.weekly.focused == slot {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }

        let Some(song) = self.weekly.selection.song(slot) else {
            let empty = Paragraph::new(Span::styled(
                "No song selected",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(empty, area);
            return;
        };

        let mut lines = vec![Line::from(Span::styled(
            song.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if let Some(line) = alternate_titles_line(song) {
            lines.push(line);
        }

        let scroll = if expanded {
            lines.push(Line::from(""));
            lines.extend(lyric_lines(song, self.prefs.font_size()));
            self.weekly.scroll(slot)
        } else {
            0
        };

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_songbook(&self, frame: &mut Frame, area: Rect) {
        let mut list_area = area;

        if self.admin.is_some() && !self.draft.is_empty() {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(1)])
                .split(area);
            let draft = Paragraph::new(self.draft_line())
                .block(Block::default().borders(Borders::ALL).title("Draft"))
                .wrap(Wrap { trim: true });
            frame.render_widget(draft, chunks[0]);
            list_area = chunks[1];
        }

        if list_area.height == 0 {
            return;
        }

        if self.songbook.songs.is_empty() {
            let text = if self.admin.is_some() {
                "No songs yet. Press '+' to add one."
            } else {
                "No songs yet."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Songbook"));
            frame.render_widget(message, list_area);
            return;
        }

        if self.songbook.filtered_songs.is_empty() {
            let text = if self.songbook.has_search() {
                "No songs match the current search."
            } else {
                "No songs to display."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Songbook"));
            frame.render_widget(message, list_area);
            return;
        }

        self.render_song_cards(
            frame,
            list_area,
            &self.songbook.filtered_songs,
            self.songbook.selected,
        );
    }

    fn draft_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for slot in Slot::ALL {
            if !spans.is_empty() {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled(
                format!("{}: ", slot.label()),
                Style::default().fg(Color::Gray),
            ));
            let value = match self.draft.get(slot) {
                Some(id) => self
                    .songbook
                    .song_by_id(id)
                    .map(|song| song.title.clone())
                    .unwrap_or_else(|| format!("#{id}")),
                None => "unchanged".to_string(),
            };
            spans.push(Span::styled(value, Style::default().fg(Color::Magenta)));
        }
        Line::from(spans)
    }

    fn render_song_cards(&self, frame: &mut Frame, area: Rect, songs: &[Song], selected: usize) {
        if songs.is_empty() || area.height == 0 {
            return;
        }

        let card_height = SONG_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = songs.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(SONG_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            let song_index = start + idx;
            if chunk.height == 0 || song_index >= len {
                continue;
            }

            let song = &songs[song_index];
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if song_index == selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let title = if song_index == selected {
                format!("▶ {}", song.title)
            } else {
                song.title.clone()
            };
            let mut title_spans = vec![Span::styled(
                title,
                Style::default().add_modifier(Modifier::BOLD),
            )];
            for slot in Slot::ALL {
                if self.draft.get(slot) == Some(song.id) {
                    title_spans.push(Span::styled(
                        format!("  [{}]", slot.label()),
                        Style::default().fg(Color::Magenta),
                    ));
                }
            }

            let mut lines = vec![Line::from(title_spans)];
            lines.push(alternate_titles_line(song).unwrap_or_else(|| {
                Line::from(Span::styled(
                    "No alternate titles",
                    Style::default().fg(Color::DarkGray),
                ))
            }));

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left)
                .style(paragraph_style);

            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_lyrics(&self, frame: &mut Frame, area: Rect, view: &LyricsView) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(view.song.display_title());
        let paragraph = Paragraph::new(lyric_lines(&view.song, self.prefs.font_size()))
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((view.scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let admin = self.admin.is_some();
        match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => {
                let mut keys = vec![("[↑↓]", "Navigate"), ("[Enter]", "Lyrics")];
                if admin {
                    keys.push(("[Ctrl+E]", "Edit"));
                }
                keys.push(("[Esc]", "Clear search"));
                key_hints(&keys)
            }
            (_, Mode::ViewingLyrics(_)) => key_hints(&[
                ("[↑↓]", "Scroll"),
                ("[PgUp/PgDn]", "Page"),
                ("[ [ ] ]", "Font size"),
                ("[Esc]", "Back"),
            ]),
            (_, Mode::CreatingSong(_)) | (_, Mode::EditingSong { .. }) => key_hints(&[
                ("[Tab]", "Next field"),
                ("[Enter]", "Save / new lyric line"),
                ("[Ctrl+S]", "Save"),
                ("[Esc]", "Cancel"),
            ]),
            (_, Mode::ConfirmSongDelete(_)) => key_hints(&[("[Y]", "Delete"), ("[N]", "Cancel")]),
            (Screen::Weekly, Mode::Normal) => key_hints(&[
                ("[1/2/3]", "Expand"),
                ("[a]", "All"),
                ("[↑↓]", "Focus"),
                ("[PgUp/PgDn]", "Scroll"),
                ("[r]", "Refresh"),
                ("[ [ ] ]", "Font size"),
                ("[Tab]", "Songbook"),
                ("[q]", "Quit"),
            ]),
            (Screen::Songbook, Mode::Normal) => {
                let mut keys = vec![("[↑↓]", "Navigate"), ("[Enter]", "Lyrics"), ("[f]", "Search")];
                if admin {
                    keys.extend([
                        ("[+]", "New"),
                        ("[e]", "Edit"),
                        ("[-]", "Delete"),
                        ("[1/2/3]", "Stage"),
                        ("[w]", "Publish"),
                        ("[x]", "Clear draft"),
                    ]);
                }
                keys.extend([("[Tab]", "Weekly"), ("[q]", "Quit")]);
                key_hints(&keys)
            }
        }
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SongForm) {
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(SongField::Title),
            form.build_line(SongField::AlternateTitles),
            Line::from(format!("{}:", SongField::Lyrics.label())),
        ];
        let lyrics_style = form.value_style(SongField::Lyrics, form.lyrics.is_empty());
        if form.lyrics.is_empty() {
            lines.push(Line::from(Span::styled("<required>", lyrics_style)));
        } else {
            lines.extend(
                form.lyrics
                    .split('\n')
                    .map(|line| Line::from(Span::styled(line.to_string(), lyrics_style))),
            );
        }
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Enter adds a line in lyrics • Ctrl+S to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let (cursor_col, cursor_row) = match form.active {
            SongField::Title | SongField::AlternateTitles => {
                let row = if form.active == SongField::Title { 0 } else { 1 };
                let prefix = format!("{}: ", form.active.label()).len();
                (prefix + form.value_len(form.active), row)
            }
            SongField::Lyrics => (
                form.value_len(SongField::Lyrics),
                3 + form.lyric_line_count() - 1,
            ),
        };

        // Keep the cursor row visible, leaving room for the hint line.
        let visible_rows = (inner.height as usize).saturating_sub(2).max(1);
        let offset = (cursor_row + 1).saturating_sub(visible_rows);

        let paragraph = Paragraph::new(lines).scroll((offset as u16, 0));
        frame.render_widget(paragraph, inner);

        frame.set_cursor_position((
            inner.x + cursor_col as u16,
            inner.y + (cursor_row - offset) as u16,
        ));
    }

    fn draw_confirm_song_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let warning = if confirm.featured_in.is_empty() {
            "This cannot be undone.".to_string()
        } else {
            format!(
                "It is this week's {}; that panel will show as empty.",
                confirm.featured_in.join(" and ").to_lowercase()
            )
        };

        let lines = vec![
            Line::from(format!(
                "Delete '{}' permanently?",
                confirm.song.display_title()
            )),
            Line::from(warning),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

/// Apply a key to an open song form.
fn edit_form(form: &mut SongForm, code: KeyCode) -> FormAction {
    match code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Tab => form.next_field(),
        KeyCode::BackTab => form.previous_field(),
        KeyCode::Backspace => {
            form.backspace();
            form.error = None;
        }
        KeyCode::Enter => {
            if !form.push_newline() {
                return FormAction::Submit;
            }
        }
        KeyCode::Char(ch) => {
            if form.push_char(ch) {
                form.error = None;
            }
        }
        _ => {}
    }
    FormAction::Continue
}

fn key_hints(keys: &[(&'static str, &'static str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(keys.len() * 2);
    for (idx, (key, action)) in keys.iter().enumerate() {
        spans.push(Span::styled(*key, key_style));
        let gap = if idx + 1 == keys.len() { "" } else { "   " };
        spans.push(Span::raw(format!(" {action}{gap}")));
    }
    Line::from(spans)
}
