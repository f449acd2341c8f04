//! Data models for beatmap collections

use serde::{Deserialize, Serialize};

/// A beatmap collection containing a name and list of beatmap MD5 hashes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Name of the collection
    pub name: String,
    /// MD5 hashes of beatmaps in this collection
    #[serde(default)]
    pub beatmap_hashes: Vec<String>,
}

impl Collection {
    /// Create a new empty collection with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            beatmap_hashes: Vec::new(),
        }
    }

    /// Create a new collection with the given name and hashes
    pub fn with_hashes(name: impl Into<String>, hashes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            beatmap_hashes: hashes,
        }
    }

    /// Number of beatmaps in this collection
    pub fn len(&self) -> usize {
        self.beatmap_hashes.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.beatmap_hashes.is_empty()
    }
}
