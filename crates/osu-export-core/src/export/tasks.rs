//! Export task generation
//!
//! Generators look only at the selected difficulties of a set and yield
//! tasks lazily. Calling a generator again after re-selection yields tasks
//! for the new selection.

use std::collections::HashSet;

use crate::beatmap::{BeatmapInfo, BeatmapMetadata, BeatmapSet, ScoreInfo};
use crate::select::SelectedSet;
use crate::utils::{extension_of, sanitize_filename};

/// Export one distinct audio track of a set
#[derive(Debug, Clone)]
pub struct AudioTask<'a> {
    pub set: &'a BeatmapSet,
    pub metadata: &'a BeatmapMetadata,
    /// Source format to transcode from, `None` when the track already is mp3
    pub transcode_from: Option<String>,
    pub output_filename: String,
}

impl<'a> AudioTask<'a> {
    fn new(set: &'a BeatmapSet, metadata: &'a BeatmapMetadata, index: usize) -> Self {
        let transcode_from = match extension_of(&metadata.audio_file) {
            Some(ext) if ext == "mp3" => None,
            ext => Some(ext.unwrap_or_default()),
        };
        let output_filename = format!("{}.mp3", display_stem(set, metadata, index));

        Self {
            set,
            metadata,
            transcode_from,
            output_filename,
        }
    }

    pub fn needs_transcode(&self) -> bool {
        self.transcode_from.is_some()
    }
}

/// Export one distinct background image of a set
#[derive(Debug, Clone)]
pub struct BackgroundTask<'a> {
    pub set: &'a BeatmapSet,
    pub metadata: &'a BeatmapMetadata,
    pub output_filename: String,
}

impl<'a> BackgroundTask<'a> {
    fn new(set: &'a BeatmapSet, metadata: &'a BeatmapMetadata, index: usize) -> Self {
        let ext = metadata
            .background()
            .and_then(extension_of)
            .unwrap_or_else(|| "jpg".to_string());
        let output_filename = format!("{}.{}", display_stem(set, metadata, index), ext);

        Self {
            set,
            metadata,
            output_filename,
        }
    }

    /// Background filename within the set
    pub fn filename(&self) -> &str {
        self.metadata.background().unwrap_or_default()
    }
}

/// Export the replay of one score
#[derive(Debug, Clone)]
pub struct ReplayTask<'a> {
    pub set: &'a BeatmapSet,
    pub beatmap: &'a BeatmapInfo,
    pub score: &'a ScoreInfo,
    pub output_filename: String,
}

impl<'a> ReplayTask<'a> {
    fn new(set: &'a BeatmapSet, beatmap: &'a BeatmapInfo, score: &'a ScoreInfo) -> Self {
        let player = if score.player_name.is_empty() {
            "Unknown"
        } else {
            score.player_name.as_str()
        };
        let output_filename = sanitize_filename(&format!(
            "{} - {} - {} [{}] ({}).osr",
            player, beatmap.metadata.artist, beatmap.metadata.title, beatmap.version, score.id
        ));

        Self {
            set,
            beatmap,
            score,
            output_filename,
        }
    }
}

/// `{Artist} - {Title} ({SetID})`, with ` (n)` appended for the n-th extra
/// track of the same set
fn display_stem(set: &BeatmapSet, metadata: &BeatmapMetadata, index: usize) -> String {
    let suffix = if index == 0 {
        String::new()
    } else {
        format!(" ({})", index)
    };
    sanitize_filename(&format!(
        "{} - {} ({}){}",
        metadata.artist,
        metadata.title,
        set.id_or_zero(),
        suffix
    ))
}

/// One task per distinct audio file among the selected difficulties, in
/// first-seen order
pub fn audio_tasks<'a>(selected: &SelectedSet<'a>) -> impl Iterator<Item = AudioTask<'a>> + 'a {
    let set = selected.set;
    let mut seen = HashSet::new();

    selected
        .beatmaps
        .clone()
        .into_iter()
        .map(|beatmap| &beatmap.metadata)
        .filter(move |metadata| {
            !metadata.audio_file.trim().is_empty()
                && seen.insert(metadata.audio_file.to_lowercase())
        })
        .enumerate()
        .map(move |(index, metadata)| AudioTask::new(set, metadata, index))
}

/// One task per distinct background file among the selected difficulties, in
/// first-seen order
pub fn background_tasks<'a>(
    selected: &SelectedSet<'a>,
) -> impl Iterator<Item = BackgroundTask<'a>> + 'a {
    let set = selected.set;
    let mut seen = HashSet::new();

    selected
        .beatmaps
        .clone()
        .into_iter()
        .map(|beatmap| &beatmap.metadata)
        .filter(move |metadata| {
            metadata
                .background()
                .map_or(false, |bg| seen.insert(bg.to_lowercase()))
        })
        .enumerate()
        .map(move |(index, metadata)| BackgroundTask::new(set, metadata, index))
}

/// One task per score of a selected difficulty
pub fn replay_tasks<'a>(selected: &SelectedSet<'a>) -> impl Iterator<Item = ReplayTask<'a>> + 'a {
    let set = selected.set;

    selected
        .beatmaps
        .clone()
        .into_iter()
        .flat_map(move |beatmap| {
            beatmap
                .scores
                .iter()
                .map(move |score| ReplayTask::new(set, beatmap, score))
        })
}
