//! Selection of beatmaps from the library
//!
//! The [`Selector`] turns the configured filters into a [`Selection`]: for
//! every set, the difficulties that pass all filters. A selection is a plain
//! value; it is recomputed in full whenever the filters change and never
//! patched.

mod selection;
mod selector;

pub use selection::{SelectedSet, Selection};
pub use selector::{Selector, ALL_COLLECTIONS};
