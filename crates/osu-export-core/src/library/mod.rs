//! The loaded beatmap library
//!
//! A [`Library`] is read once at start-up from a [`LibrarySource`] and stays
//! read-only for the rest of the run.

mod json;

pub use json::JsonLibrarySource;

use crate::beatmap::BeatmapSet;
use crate::collection::Collection;
use crate::error::Result;

/// Anything that can produce the beatmap sets and collections of a library
pub trait LibrarySource {
    fn load(&self) -> Result<Library>;
}

/// All beatmap sets and collections of one installation
#[derive(Debug, Clone, Default)]
pub struct Library {
    sets: Vec<BeatmapSet>,
    collections: Vec<Collection>,
}

impl Library {
    /// Build a library, putting the sets in discovery order (online ID
    /// ascending, sets without an ID first, ties kept in source order)
    pub fn new(mut sets: Vec<BeatmapSet>, collections: Vec<Collection>) -> Self {
        sets.sort_by_key(|s| s.online_id);
        Self { sets, collections }
    }

    /// Sets in discovery order
    pub fn sets(&self) -> &[BeatmapSet] {
        &self.sets
    }

    /// Collections in discovery order
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// First set with the given online ID
    pub fn find_set(&self, online_id: i32) -> Option<&BeatmapSet> {
        self.sets.iter().find(|s| s.online_id == Some(online_id))
    }

    /// Total number of difficulties
    pub fn beatmap_count(&self) -> usize {
        self.sets.iter().map(|s| s.beatmaps.len()).sum()
    }
}
