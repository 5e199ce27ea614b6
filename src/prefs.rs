//! Local display preferences. These never reach the songbook database: each
//! terminal keeps its own `preferences.toml`, much like a browser keeps a
//! value in local storage.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ratatui::style::{Modifier, Style};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Lyric text size. A terminal cannot change its font, so each step trades
/// density for readability through spacing, padding and weight instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
}

impl FontSize {
    const ORDER: [FontSize; 4] = [
        FontSize::Small,
        FontSize::Medium,
        FontSize::Large,
        FontSize::XLarge,
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|size| *size == self)
            .unwrap_or(1)
    }

    /// One step larger, saturating at X-Large.
    pub fn larger(self) -> Self {
        Self::ORDER[(self.position() + 1).min(Self::ORDER.len() - 1)]
    }

    /// One step smaller, saturating at Small.
    pub fn smaller(self) -> Self {
        Self::ORDER[self.position().saturating_sub(1)]
    }

    pub fn label(self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
            FontSize::XLarge => "x-large",
        }
    }

    /// Blank lines inserted after every lyric line.
    pub fn line_spacing(self) -> usize {
        match self {
            FontSize::Small | FontSize::Medium => 0,
            FontSize::Large | FontSize::XLarge => 1,
        }
    }

    /// Left margin in columns.
    pub fn padding(self) -> u16 {
        match self {
            FontSize::Small => 0,
            FontSize::Medium => 1,
            FontSize::Large => 2,
            FontSize::XLarge => 4,
        }
    }

    pub fn text_style(self) -> Style {
        match self {
            FontSize::Small => Style::default().add_modifier(Modifier::DIM),
            FontSize::Medium | FontSize::Large => Style::default(),
            FontSize::XLarge => Style::default().add_modifier(Modifier::BOLD),
        }
    }

    /// Break `lyrics` into display lines with the spacing this size asks for.
    /// Small also drops the blank lines between stanzas.
    pub fn layout_lyrics(self, lyrics: &str) -> Vec<String> {
        let padding = " ".repeat(self.padding() as usize);
        let mut lines = Vec::new();
        for line in lyrics.lines() {
            if self == FontSize::Small && line.trim().is_empty() {
                continue;
            }
            lines.push(format!("{padding}{line}"));
            for _ in 0..self.line_spacing() {
                lines.push(String::new());
            }
        }
        lines
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub font_size: FontSize,
}

/// Preferences bound to the file they were read from.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    pub preferences: Preferences,
}

impl PreferenceStore {
    /// Read preferences from `path`. A missing or unreadable file falls back
    /// to the defaults; it will be rewritten on the next save.
    pub fn load(path: &Path) -> Self {
        let preferences = match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "ignoring unreadable preferences");
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        };
        Self {
            path: Some(path.to_path_buf()),
            preferences,
        }
    }

    /// Preferences that live only for this session.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            preferences: Preferences::default(),
        }
    }

    pub fn font_size(&self) -> FontSize {
        self.preferences.font_size
    }

    /// Change the font size and write it through.
    pub fn set_font_size(&mut self, font_size: FontSize) -> Result<()> {
        self.preferences.font_size = font_size;
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create preferences directory")?;
        }
        let raw = toml::to_string(&self.preferences).context("failed to encode preferences")?;
        fs::write(path, raw).context("failed to write preferences")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_steps_saturate() {
        assert_eq!(FontSize::Small.smaller(), FontSize::Small);
        assert_eq!(FontSize::Small.larger(), FontSize::Medium);
        assert_eq!(FontSize::Large.larger(), FontSize::XLarge);
        assert_eq!(FontSize::XLarge.larger(), FontSize::XLarge);
    }

    #[test]
    fn layout_spacing_grows_with_size() {
        let lyrics = "one\n\ntwo";
        assert_eq!(FontSize::Small.layout_lyrics(lyrics), vec!["one", "two"]);
        assert_eq!(FontSize::Medium.layout_lyrics(lyrics), vec![" one", " ", " two"]);
        assert_eq!(
            FontSize::Large.layout_lyrics("one\ntwo"),
            vec!["  one", "", "  two", ""]
        );
    }

    #[test]
    fn preferences_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.toml");

        let mut store = PreferenceStore::load(&path);
        assert_eq!(store.font_size(), FontSize::Medium);
        store.set_font_size(FontSize::XLarge).unwrap();

        let reloaded = PreferenceStore::load(&path);
        assert_eq!(reloaded.font_size(), FontSize::XLarge);
        assert!(fs::read_to_string(&path).unwrap().contains("x-large"));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "font_size = 12").unwrap();

        assert_eq!(PreferenceStore::load(&path).preferences, Preferences::default());
    }
}
