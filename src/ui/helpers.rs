use anyhow::Error;
use chrono::NaiveDate;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Song;
use crate::prefs::FontSize;

/// Lyrics laid out for the chosen font size.
pub(crate) fn lyric_lines(song: &Song, font_size: FontSize) -> Vec<Line<'static>> {
    let style = font_size.text_style();
    font_size
        .layout_lyrics(&song.lyrics)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, style)))
        .collect()
}

/// Dimmed "also known as" line, or nothing when the song has no aliases.
pub(crate) fn alternate_titles_line(song: &Song) -> Option<Line<'static>> {
    if song.alternate_titles.is_empty() {
        return None;
    }
    Some(Line::from(Span::styled(
        format!("Also: {}", song.alternate_titles.join(", ")),
        Style::default().fg(Color::DarkGray),
    )))
}

pub(crate) fn format_week(week_start: Option<NaiveDate>) -> String {
    match week_start {
        Some(date) => format!("Week of {}", date.format("%A, %B %-d, %Y")),
        None => "No weekly selection yet".to_string(),
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
