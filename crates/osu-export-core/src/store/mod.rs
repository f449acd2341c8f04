//! Content-addressed file storage
//!
//! Beatmap files are never addressed by path. Every [`NamedFile`] carries the
//! hash of its content and the [`FileStore`] hands back a reader for it.

mod hashed;

pub use hashed::HashedFileStore;

use std::io::Read;

use crate::beatmap::BeatmapSet;
use crate::error::{Error, Result};

/// Boxed reader returned by a [`FileStore`]
pub type FileReader = Box<dyn Read + Send>;

/// Read access to the files of a library
pub trait FileStore: Send + Sync {
    /// Open a file by its content hash, failing with [`Error::NotFound`]
    fn open(&self, hash: &str) -> Result<FileReader>;

    /// Open a file by its name within a set.
    ///
    /// Returns `Ok(None)` when the set has no file with that name.
    fn open_named(&self, set: &BeatmapSet, filename: &str) -> Result<Option<FileReader>> {
        match set.find_file(filename) {
            Some(file) => self.open(&file.hash).map(Some),
            None => Ok(None),
        }
    }

    /// Read a whole file by its content hash
    fn read(&self, hash: &str) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        self.open(hash)?.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Read a whole file by its name within a set, failing when it is missing
    fn read_named(&self, set: &BeatmapSet, filename: &str) -> Result<Vec<u8>> {
        let mut reader = self
            .open_named(set, filename)?
            .ok_or_else(|| Error::NotFound(format!("{} in set {}", filename, set.id_or_zero())))?;
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Ok(content)
    }
}
