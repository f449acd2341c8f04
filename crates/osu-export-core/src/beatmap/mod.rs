//! Beatmap data structures and types

mod metadata;

pub use metadata::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::sanitize_filename;

/// Represents a game mode in osu!
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Osu = 0,
    Taiko = 1,
    Catch = 2,
    Mania = 3,
}

impl Default for GameMode {
    fn default() -> Self {
        Self::Osu
    }
}

impl From<u8> for GameMode {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Osu,
            1 => Self::Taiko,
            2 => Self::Catch,
            3 => Self::Mania,
            _ => Self::Osu,
        }
    }
}

/// Ranked status of a beatmap (matches osu! API values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RankedStatus {
    Graveyard = -2,
    Wip = -1,
    #[default]
    Pending = 0,
    Ranked = 1,
    Approved = 2,
    Qualified = 3,
    Loved = 4,
}

impl fmt::Display for RankedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankedStatus::Graveyard => write!(f, "Graveyard"),
            RankedStatus::Wip => write!(f, "WIP"),
            RankedStatus::Pending => write!(f, "Pending"),
            RankedStatus::Ranked => write!(f, "Ranked"),
            RankedStatus::Approved => write!(f, "Approved"),
            RankedStatus::Qualified => write!(f, "Qualified"),
            RankedStatus::Loved => write!(f, "Loved"),
        }
    }
}

/// A file belonging to a beatmap set, addressed by content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFile {
    /// Original filename, relative to the set
    pub filename: String,
    /// SHA-256 hash (content address)
    pub hash: String,
}

impl NamedFile {
    pub fn new(filename: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            hash: hash.into(),
        }
    }
}

/// A score set on a difficulty, possibly with a replay attached
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreInfo {
    /// Unique score ID
    pub id: String,
    /// Player name
    #[serde(default)]
    pub player_name: String,
    /// When the play happened
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Files attached to the score (the replay, if one was saved)
    #[serde(default)]
    pub files: Vec<NamedFile>,
}

impl ScoreInfo {
    /// The replay file for this score, if one was saved
    pub fn replay_file(&self) -> Option<&NamedFile> {
        self.files.first()
    }
}

/// Information about a single beatmap difficulty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeatmapInfo {
    /// Unique ID (GUID in lazer)
    pub id: String,
    /// MD5 hash of the .osu file, used by collections
    pub md5_hash: String,
    /// SHA-256 hash of the .osu file, matching its entry in the set's files
    pub hash: String,
    pub metadata: BeatmapMetadata,
    /// Difficulty name/version
    #[serde(default)]
    pub version: String,
    /// Game mode
    #[serde(default)]
    pub mode: GameMode,
    /// Star rating for this difficulty
    #[serde(default)]
    pub star_rating: Option<f32>,
    /// Drain length in milliseconds
    #[serde(default)]
    pub length_ms: u64,
    /// Main BPM
    #[serde(default)]
    pub bpm: f64,
    /// Ranked status of this beatmap
    #[serde(default)]
    pub ranked_status: Option<RankedStatus>,
    /// Scores set on this difficulty
    #[serde(default)]
    pub scores: Vec<ScoreInfo>,
}

/// A beatmap set containing multiple difficulties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeatmapSet {
    /// Online beatmap set ID (if available). Not unique across a library.
    #[serde(default)]
    pub online_id: Option<i32>,
    /// All difficulties in this set
    pub beatmaps: Vec<BeatmapInfo>,
    /// All files (audio, backgrounds, videos, storyboards, .osu files)
    #[serde(default)]
    pub files: Vec<NamedFile>,
}

impl BeatmapSet {
    /// Create a new empty beatmap set
    pub fn new(online_id: Option<i32>) -> Self {
        Self {
            online_id,
            beatmaps: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Online ID used in derived filenames (`0` for unsubmitted sets)
    pub fn id_or_zero(&self) -> i32 {
        self.online_id.unwrap_or(0)
    }

    /// Get the primary metadata (from the first beatmap)
    pub fn metadata(&self) -> Option<&BeatmapMetadata> {
        self.beatmaps.first().map(|b| &b.metadata)
    }

    /// Find a file reference by name. osu! treats filenames case-insensitively.
    pub fn find_file(&self, filename: &str) -> Option<&NamedFile> {
        let wanted = normalize_name(filename);
        self.files
            .iter()
            .find(|f| normalize_name(&f.filename) == wanted)
    }

    /// Generate a display name in osu!stable format: "{SetID} {Artist} - {Title}"
    pub fn generate_folder_name(&self) -> String {
        if let Some(meta) = self.metadata() {
            sanitize_filename(&format!("{} {} - {}", self.id_or_zero(), meta.artist, meta.title))
        } else {
            format!("{} Unknown Beatmap", self.id_or_zero())
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.replace('\\', "/").to_lowercase()
}
