//! Selection result

use std::collections::HashSet;

use crate::beatmap::{BeatmapInfo, BeatmapSet};
use crate::library::Library;

/// Which difficulties of each set are selected
///
/// Indices refer to the sets of the [`Library`] the selection was computed
/// from, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected beatmap indices, one entry per library set
    selected: Vec<Vec<usize>>,
    /// Library indices of sets with at least one selected beatmap
    selected_sets: Vec<usize>,
    beatmap_count: usize,
}

impl Selection {
    pub(crate) fn new(selected: Vec<Vec<usize>>) -> Self {
        let selected_sets = selected
            .iter()
            .enumerate()
            .filter(|(_, beatmaps)| !beatmaps.is_empty())
            .map(|(idx, _)| idx)
            .collect();
        let beatmap_count = selected.iter().map(Vec::len).sum();

        Self {
            selected,
            selected_sets,
            beatmap_count,
        }
    }

    /// Number of sets with at least one selected beatmap
    pub fn set_count(&self) -> usize {
        self.selected_sets.len()
    }

    /// Number of selected beatmaps across all sets
    pub fn beatmap_count(&self) -> usize {
        self.beatmap_count
    }

    pub fn is_empty(&self) -> bool {
        self.selected_sets.is_empty()
    }

    /// Library indices of the selected sets, in discovery order
    pub fn set_indices(&self) -> &[usize] {
        &self.selected_sets
    }

    /// Selected beatmap indices within the set at `set_index`
    pub fn beatmap_indices(&self, set_index: usize) -> &[usize] {
        self.selected
            .get(set_index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate the selected sets together with their selected beatmaps
    pub fn sets<'a>(&'a self, library: &'a Library) -> impl Iterator<Item = SelectedSet<'a>> + 'a {
        self.selected_sets.iter().filter_map(move |&set_index| {
            let set = library.sets().get(set_index)?;
            Some(SelectedSet::new(set, self.beatmap_indices(set_index)))
        })
    }
}

/// A beatmap set together with the subset of its difficulties that is selected
#[derive(Debug, Clone)]
pub struct SelectedSet<'a> {
    pub set: &'a BeatmapSet,
    pub beatmaps: Vec<&'a BeatmapInfo>,
}

impl<'a> SelectedSet<'a> {
    /// View `set` with only the beatmaps at `indices` selected
    pub fn new(set: &'a BeatmapSet, indices: &[usize]) -> Self {
        let beatmaps = indices
            .iter()
            .filter_map(|&idx| set.beatmaps.get(idx))
            .collect();
        Self { set, beatmaps }
    }

    /// View `set` with every beatmap selected
    pub fn all(set: &'a BeatmapSet) -> Self {
        Self {
            set,
            beatmaps: set.beatmaps.iter().collect(),
        }
    }

    /// Whether the beatmap with this ID is selected
    pub fn is_selected(&self, beatmap_id: &str) -> bool {
        self.beatmaps.iter().any(|b| b.id == beatmap_id)
    }

    /// .osu file hashes used only by difficulties that are not selected
    pub fn excluded_hashes(&self) -> HashSet<&'a str> {
        let kept: HashSet<&str> = self.beatmaps.iter().map(|b| b.hash.as_str()).collect();
        self.set
            .beatmaps
            .iter()
            .filter(|b| !self.is_selected(&b.id))
            .map(|b| b.hash.as_str())
            .filter(|hash| !kept.contains(hash))
            .collect()
    }
}
