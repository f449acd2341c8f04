//! Beatmap metadata structures

use serde::{Deserialize, Serialize};

/// Metadata for a beatmap difficulty
///
/// Every difficulty owns its own record, but difficulties of the same set
/// usually point at the same audio and background files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatmapMetadata {
    /// Romanized song title
    pub title: String,
    /// Unicode song title
    #[serde(default)]
    pub title_unicode: Option<String>,
    /// Romanized artist name
    pub artist: String,
    /// Unicode artist name
    #[serde(default)]
    pub artist_unicode: Option<String>,
    /// Beatmap creator username
    #[serde(default)]
    pub creator: String,
    /// Space separated search tags
    #[serde(default)]
    pub tags: String,
    /// Audio filename, relative to the set
    pub audio_file: String,
    /// Background image filename, relative to the set
    #[serde(default)]
    pub background_file: Option<String>,
}

impl BeatmapMetadata {
    /// Get display title (unicode if available, otherwise romanized)
    pub fn display_title(&self) -> &str {
        non_empty(&self.title_unicode).unwrap_or(&self.title)
    }

    /// Get display artist (unicode if available, otherwise romanized)
    pub fn display_artist(&self) -> &str {
        non_empty(&self.artist_unicode).unwrap_or(&self.artist)
    }

    /// Background filename, ignoring empty references
    pub fn background(&self) -> Option<&str> {
        non_empty(&self.background_file)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
