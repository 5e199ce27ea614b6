use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{NewSong, Song, SongPatch};

/// Form state for song creation/editing.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    /// Comma separated, split on save.
    pub(crate) alternate_titles: String,
    pub(crate) lyrics: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the song form to drive focus management.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub(crate) enum SongField {
    #[default]
    Title,
    AlternateTitles,
    Lyrics,
}

impl SongField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            SongField::Title => "Title",
            SongField::AlternateTitles => "Alternate titles",
            SongField::Lyrics => "Lyrics",
        }
    }
}

fn split_alternate_titles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect()
}

impl SongForm {
    /// Populate the form from an existing song when entering edit mode.
    pub(crate) fn from_song(song: &Song) -> Self {
        Self {
            title: song.title.clone(),
            alternate_titles: song.alternate_titles.join(", "),
            lyrics: song.lyrics.clone(),
            active: SongField::Title,
            error: None,
        }
    }

    /// Cycle focus forward across the three fields.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            SongField::Title => SongField::AlternateTitles,
            SongField::AlternateTitles => SongField::Lyrics,
            SongField::Lyrics => SongField::Title,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            SongField::Title => SongField::Lyrics,
            SongField::AlternateTitles => SongField::Title,
            SongField::Lyrics => SongField::AlternateTitles,
        };
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.field_mut(self.active).push(ch);
        true
    }

    /// Line break; only the lyrics field is multi-line.
    pub(crate) fn push_newline(&mut self) -> bool {
        if self.active == SongField::Lyrics {
            self.lyrics.push('\n');
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.field_mut(self.active).pop();
    }

    fn field_mut(&mut self, field: SongField) -> &mut String {
        match field {
            SongField::Title => &mut self.title,
            SongField::AlternateTitles => &mut self.alternate_titles,
            SongField::Lyrics => &mut self.lyrics,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(anyhow!("Song title is required."));
        }
        if self.lyrics.trim().is_empty() {
            return Err(anyhow!("Lyrics are required."));
        }
        Ok(())
    }

    /// Validate the inputs and build a creation request.
    pub(crate) fn to_new_song(&self) -> Result<NewSong> {
        self.validate()?;
        Ok(NewSong {
            title: Some(self.title.trim().to_string()),
            alternate_titles: split_alternate_titles(&self.alternate_titles),
            lyrics: Some(self.lyrics.trim_end().to_string()),
        })
    }

    /// Validate and keep only the fields that differ from `original`, so an
    /// edit never rewrites values the user did not touch.
    pub(crate) fn to_patch(&self, original: &Song) -> Result<SongPatch> {
        self.validate()?;
        let title = self.title.trim();
        let lyrics = self.lyrics.trim_end();
        let alternate_titles = split_alternate_titles(&self.alternate_titles);

        Ok(SongPatch {
            title: (title != original.title).then(|| title.to_string()),
            alternate_titles: (alternate_titles != original.alternate_titles)
                .then_some(alternate_titles),
            lyrics: (lyrics != original.lyrics).then(|| lyrics.to_string()),
        })
    }

    /// Render a single-line field.
    pub(crate) fn build_line(&self, field: SongField) -> Line<'static> {
        let value = match field {
            SongField::Title => &self.title,
            SongField::AlternateTitles => &self.alternate_titles,
            SongField::Lyrics => &self.lyrics,
        };
        let placeholder = match field {
            SongField::Title | SongField::Lyrics => "<required>",
            SongField::AlternateTitles => "<optional, comma separated>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, self.value_style(field, value.is_empty())),
        ])
    }

    pub(crate) fn value_style(&self, field: SongField, empty: bool) -> Style {
        if self.active == field {
            Style::default().fg(Color::Yellow)
        } else if empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        }
    }

    /// Character length of a single-line field, for cursor placement.
    pub(crate) fn value_len(&self, field: SongField) -> usize {
        match field {
            SongField::Title => self.title.chars().count(),
            SongField::AlternateTitles => self.alternate_titles.chars().count(),
            SongField::Lyrics => self
                .lyrics
                .rsplit('\n')
                .next()
                .map(|line| line.chars().count())
                .unwrap_or(0),
        }
    }

    /// Number of lines the lyrics occupy; an empty field still takes one.
    pub(crate) fn lyric_line_count(&self) -> usize {
        self.lyrics.split('\n').count()
    }
}

/// State for confirming permanent song deletion.
pub(crate) struct ConfirmSongDelete {
    pub(crate) song: Song,
    /// Slots of the displayed weekly selection that point at this song.
    pub(crate) featured_in: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> Song {
        Song {
            id: 7,
            title: "Hymn".into(),
            alternate_titles: vec!["one".into(), "two".into()],
            lyrics: "line one\nline two".into(),
        }
    }

    #[test]
    fn new_song_requires_title_and_lyrics() {
        let mut form = SongForm::default();
        assert!(form.to_new_song().is_err());
        form.title = "Hymn".into();
        assert!(form.to_new_song().is_err());
        form.lyrics = "words\n".into();
        form.alternate_titles = " a , ,b ".into();

        let new_song = form.to_new_song().unwrap();
        assert_eq!(new_song.title.as_deref(), Some("Hymn"));
        assert_eq!(new_song.alternate_titles, vec!["a", "b"]);
        assert_eq!(new_song.lyrics.as_deref(), Some("words"));
    }

    #[test]
    fn patch_contains_only_changed_fields() {
        let original = song();
        let mut form = SongForm::from_song(&original);
        assert_eq!(form.to_patch(&original).unwrap(), SongPatch::default());

        form.title = "Hymn 2".into();
        let patch = form.to_patch(&original).unwrap();
        assert_eq!(patch.title.as_deref(), Some("Hymn 2"));
        assert!(patch.alternate_titles.is_none());
        assert!(patch.lyrics.is_none());
    }

    #[test]
    fn only_lyrics_accept_newlines() {
        let mut form = SongForm::default();
        assert!(!form.push_newline());
        form.next_field();
        form.next_field();
        assert_eq!(form.active, SongField::Lyrics);
        form.push_char('a');
        assert!(form.push_newline());
        form.push_char('b');
        assert_eq!(form.lyrics, "a\nb");
        assert_eq!(form.lyric_line_count(), 2);
        assert_eq!(form.value_len(SongField::Lyrics), 1);
        form.previous_field();
        assert_eq!(form.active, SongField::AlternateTitles);
    }
}
