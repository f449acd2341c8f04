//! Filter resolution and selection

use std::collections::HashSet;
use std::sync::Arc;

use super::Selection;
use crate::beatmap::BeatmapInfo;
use crate::collection::CollectionIndex;
use crate::error::Error;
use crate::filter::{Filter, FilterKind, FilterTemplate};
use crate::library::Library;

/// Collection reference matching every beatmap that is in any collection
pub const ALL_COLLECTIONS: &str = "-all";

/// Computes selections over a library
pub struct Selector<'a> {
    library: &'a Library,
    collections: &'a CollectionIndex,
}

impl<'a> Selector<'a> {
    pub fn new(library: &'a Library, collections: &'a CollectionIndex) -> Self {
        Self {
            library,
            collections,
        }
    }

    /// Resolve collection filters, then select.
    pub fn refresh(
        &self,
        filters: &mut Vec<Filter>,
        on_collection_failure: impl FnMut(Error),
    ) -> Selection {
        self.resolve_collection_filters(filters, on_collection_failure);
        self.select(filters)
    }

    /// Replace every raw collection filter with a single synthesized filter.
    ///
    /// References are `#N` (collection ID), the literal [`ALL_COLLECTIONS`],
    /// or a collection name. References that resolve to nothing are passed to
    /// `on_failure` and dropped. The synthesized filter takes the negation
    /// flag of the last raw collection filter; negations of earlier ones are
    /// not combined.
    ///
    /// Does nothing when no raw collection filters are present, so running it
    /// again is harmless. If a synthesized filter already exists, its names
    /// are folded into the new one so there is never more than one.
    pub fn resolve_collection_filters(
        &self,
        filters: &mut Vec<Filter>,
        mut on_failure: impl FnMut(Error),
    ) {
        if !filters.iter().any(Filter::is_collection_reference) {
            return;
        }

        let mut names: Vec<String> = Vec::new();
        let mut negated = false;
        let mut kept = Vec::with_capacity(filters.len());

        for filter in filters.drain(..) {
            match filter.kind {
                FilterKind::ResolvedCollections {
                    names: previous, ..
                } => {
                    names.extend(previous);
                }
                FilterKind::Collections(references) => {
                    negated = filter.negated;
                    for reference in references {
                        match self.resolve_reference(&reference) {
                            Some(name) => names.push(name),
                            None => {
                                tracing::warn!("Dropping unknown collection reference '{}'", reference);
                                on_failure(Error::CollectionResolution(reference));
                            }
                        }
                    }
                }
                FilterKind::Predicate(_) => kept.push(filter),
            }
        }

        let mut seen = HashSet::new();
        names.retain(|name| seen.insert(name.clone()));

        tracing::debug!(
            "Resolved collection filter: {}{:?}",
            if negated { "NOT " } else { "" },
            names
        );

        kept.push(self.synthesize(names, negated));
        *filters = kept;
    }

    /// Select every beatmap that passes all filters.
    ///
    /// Raw collection filters that have not been resolved place no constraint.
    pub fn select(&self, filters: &[Filter]) -> Selection {
        let selected: Vec<Vec<usize>> = self
            .library
            .sets()
            .iter()
            .map(|set| {
                set.beatmaps
                    .iter()
                    .enumerate()
                    .filter(|(_, beatmap)| filters.iter().all(|f| f.includes(beatmap)))
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect();

        let selection = Selection::new(selected);
        tracing::info!(
            "Selected {} beatmaps in {} of {} sets",
            selection.beatmap_count(),
            selection.set_count(),
            self.library.sets().len()
        );
        selection
    }

    /// Resolve one reference to a collection name
    fn resolve_reference(&self, reference: &str) -> Option<String> {
        if reference == ALL_COLLECTIONS {
            return Some(ALL_COLLECTIONS.to_string());
        }

        if let Some(digits) = reference.strip_prefix('#') {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                let id: u32 = digits.parse().ok()?;
                return self.collections.name_of(id).map(String::from);
            }
        }

        self.collections
            .contains_name(reference)
            .then(|| reference.to_string())
    }

    fn synthesize(&self, names: Vec<String>, negated: bool) -> Filter {
        let members: HashSet<String> = if names.iter().any(|n| n == ALL_COLLECTIONS) {
            self.collections
                .entries()
                .iter()
                .flat_map(|e| e.beatmap_ids.iter().cloned())
                .collect()
        } else {
            names
                .iter()
                .filter_map(|name| self.collections.by_name(name))
                .flat_map(|e| e.beatmap_ids.iter().cloned())
                .collect()
        };
        let members = Arc::new(members);

        Filter {
            description: format!("collection {}", names.join(", ")),
            negated,
            template: FilterTemplate::Collection,
            kind: FilterKind::ResolvedCollections {
                names,
                predicate: Arc::new(move |beatmap: &BeatmapInfo| members.contains(&beatmap.id)),
            },
        }
    }
}
