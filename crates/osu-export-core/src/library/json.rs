//! JSON manifest library source

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{Library, LibrarySource};
use crate::beatmap::BeatmapSet;
use crate::collection::Collection;
use crate::error::{Error, Result};

/// On-disk shape of a library manifest
#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryManifest {
    #[serde(default)]
    sets: Vec<BeatmapSet>,
    #[serde(default)]
    collections: Vec<Collection>,
}

/// Reads a library from a `library.json` manifest
///
/// ```json
/// { "sets": [ { "online_id": 1, "beatmaps": [...], "files": [...] } ],
///   "collections": [ { "name": "Favorites", "beatmap_hashes": ["..."] } ] }
/// ```
pub struct JsonLibrarySource {
    path: PathBuf,
}

impl JsonLibrarySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Write a library back out as a manifest
    pub fn save(&self, sets: &[BeatmapSet], collections: &[Collection]) -> Result<()> {
        let manifest = LibraryManifest {
            sets: sets.to_vec(),
            collections: collections.to_vec(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&manifest)?)?;
        Ok(())
    }
}

impl LibrarySource for JsonLibrarySource {
    fn load(&self) -> Result<Library> {
        let content = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::NotFound(format!("library manifest {}", self.path.display()))
            }
            _ => Error::Io(e),
        })?;
        let manifest: LibraryManifest = serde_json::from_str(&content)?;

        tracing::info!(
            "Loaded {} beatmap sets and {} collections from {}",
            manifest.sets.len(),
            manifest.collections.len(),
            self.path.display()
        );

        Ok(Library::new(manifest.sets, manifest.collections))
    }
}
