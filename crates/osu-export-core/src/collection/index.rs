//! Numbered, pre-resolved view of the library's collections

use std::collections::{HashMap, HashSet};

use super::Collection;
use crate::beatmap::BeatmapSet;

/// One collection as seen by the selector
#[derive(Debug, Clone)]
pub struct CollectionEntry {
    /// 1-based ID, assigned in discovery order
    pub id: u32,
    pub name: String,
    /// IDs of the library beatmaps whose MD5 hash is in this collection
    pub beatmap_ids: HashSet<String>,
}

impl CollectionEntry {
    /// Whether a beatmap belongs to this collection
    pub fn contains(&self, beatmap_id: &str) -> bool {
        self.beatmap_ids.contains(beatmap_id)
    }
}

/// Maps collection names and IDs to their resolved members
///
/// IDs are dense and fixed at construction. When two collections share a
/// name, lookups by name find the first one; both keep their own ID.
#[derive(Debug, Clone, Default)]
pub struct CollectionIndex {
    entries: Vec<CollectionEntry>,
    by_name: HashMap<String, usize>,
}

impl CollectionIndex {
    /// Number the collections and resolve their hashes against `sets`
    pub fn new(collections: &[Collection], sets: &[BeatmapSet]) -> Self {
        let mut ids_by_hash: HashMap<&str, Vec<&str>> = HashMap::new();
        for beatmap in sets.iter().flat_map(|s| &s.beatmaps) {
            ids_by_hash
                .entry(beatmap.md5_hash.as_str())
                .or_default()
                .push(beatmap.id.as_str());
        }

        let mut entries = Vec::with_capacity(collections.len());
        let mut by_name = HashMap::new();

        for (idx, collection) in collections.iter().enumerate() {
            let beatmap_ids: HashSet<String> = collection
                .beatmap_hashes
                .iter()
                .filter_map(|hash| ids_by_hash.get(hash.as_str()))
                .flatten()
                .map(|id| id.to_string())
                .collect();

            tracing::debug!(
                "Collection #{} '{}': {} of {} beatmaps present",
                idx + 1,
                collection.name,
                beatmap_ids.len(),
                collection.len()
            );

            by_name.entry(collection.name.clone()).or_insert(idx);
            entries.push(CollectionEntry {
                id: idx as u32 + 1,
                name: collection.name.clone(),
                beatmap_ids,
            });
        }

        Self { entries, by_name }
    }

    /// All collections in ID order
    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a collection by its 1-based ID
    pub fn get(&self, id: u32) -> Option<&CollectionEntry> {
        id.checked_sub(1)
            .and_then(|idx| self.entries.get(idx as usize))
    }

    /// Name of the collection with the given ID
    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.get(id).map(|e| e.name.as_str())
    }

    /// Look up a collection by exact name
    pub fn by_name(&self, name: &str) -> Option<&CollectionEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// ID of the collection with the given name
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.by_name(name).map(|e| e.id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Whether a beatmap belongs to any collection at all
    pub fn in_any(&self, beatmap_id: &str) -> bool {
        self.entries.iter().any(|e| e.contains(beatmap_id))
    }
}
