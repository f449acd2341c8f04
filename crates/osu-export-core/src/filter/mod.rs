//! Beatmap filtering module
//!
//! A [`Filter`] is a named, optionally negated predicate over a single
//! difficulty. Filters are declared as text rules (see [`Filter::parse`]);
//! `collection` rules start out as raw references and are replaced by one
//! synthesized filter when the selector resolves them.

mod parse;
mod range;

pub use range::NumericRange;

use std::fmt;
use std::sync::Arc;

use crate::beatmap::BeatmapInfo;

/// Predicate over a single difficulty
pub type BeatmapPredicate = Arc<dyn Fn(&BeatmapInfo) -> bool + Send + Sync>;

/// Category a filter was built from, used for grouping and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterTemplate {
    StarRating,
    Length,
    Bpm,
    Mode,
    Status,
    Artist,
    Title,
    Mapper,
    Tag,
    Difficulty,
    Played,
    Collection,
    Custom,
}

impl fmt::Display for FilterTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilterTemplate::StarRating => "Star rating",
            FilterTemplate::Length => "Length",
            FilterTemplate::Bpm => "BPM",
            FilterTemplate::Mode => "Game mode",
            FilterTemplate::Status => "Ranked status",
            FilterTemplate::Artist => "Artist",
            FilterTemplate::Title => "Title",
            FilterTemplate::Mapper => "Mapper",
            FilterTemplate::Tag => "Tag",
            FilterTemplate::Difficulty => "Difficulty name",
            FilterTemplate::Played => "Played",
            FilterTemplate::Collection => "Collection",
            FilterTemplate::Custom => "Custom",
        };
        write!(f, "{}", label)
    }
}

/// What a filter evaluates
#[derive(Clone)]
pub enum FilterKind {
    /// A plain predicate
    Predicate(BeatmapPredicate),
    /// Raw collection references (`#3`, `-all`, or a name), not yet resolved
    Collections(Vec<String>),
    /// The single filter synthesized from every collection reference
    ResolvedCollections {
        names: Vec<String>,
        predicate: BeatmapPredicate,
    },
}

/// A named predicate over a difficulty
#[derive(Clone)]
pub struct Filter {
    /// Human readable description, usually the rule text
    pub description: String,
    /// Inverts this filter's verdict
    pub negated: bool,
    pub template: FilterTemplate,
    pub kind: FilterKind,
}

impl Filter {
    /// Create a predicate filter
    pub fn new(
        description: impl Into<String>,
        template: FilterTemplate,
        predicate: impl Fn(&BeatmapInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            negated: false,
            template,
            kind: FilterKind::Predicate(Arc::new(predicate)),
        }
    }

    /// Create an unresolved collection filter
    pub fn collections(description: impl Into<String>, references: Vec<String>) -> Self {
        Self {
            description: description.into(),
            negated: false,
            template: FilterTemplate::Collection,
            kind: FilterKind::Collections(references),
        }
    }

    /// Set the negation flag
    pub fn negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    /// Whether this filter still holds raw collection references
    pub fn is_collection_reference(&self) -> bool {
        matches!(self.kind, FilterKind::Collections(_))
    }

    /// Whether this filter was synthesized from collection references
    pub fn is_synthesized(&self) -> bool {
        matches!(self.kind, FilterKind::ResolvedCollections { .. })
    }

    /// Whether `beatmap` passes this filter, honoring negation.
    ///
    /// Unresolved collection references place no constraint on the beatmap.
    pub fn includes(&self, beatmap: &BeatmapInfo) -> bool {
        let verdict = match &self.kind {
            FilterKind::Predicate(predicate)
            | FilterKind::ResolvedCollections { predicate, .. } => predicate(beatmap),
            FilterKind::Collections(_) => return true,
        };
        verdict != self.negated
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            FilterKind::Predicate(_) => "Predicate".to_string(),
            FilterKind::Collections(refs) => format!("Collections({:?})", refs),
            FilterKind::ResolvedCollections { names, .. } => {
                format!("ResolvedCollections({:?})", names)
            }
        };
        f.debug_struct("Filter")
            .field("description", &self.description)
            .field("negated", &self.negated)
            .field("template", &self.template)
            .field("kind", &kind)
            .finish()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "NOT ")?;
        }
        write!(f, "{}", self.description)
    }
}
