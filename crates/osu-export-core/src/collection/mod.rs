//! Beatmap collections and the collection index
//!
//! Collections are user-defined groups of difficulties, referenced by MD5
//! hash. The [`CollectionIndex`] numbers them and resolves their members
//! against the loaded library once per run.

mod index;
mod model;

pub use index::{CollectionEntry, CollectionIndex};
pub use model::Collection;
