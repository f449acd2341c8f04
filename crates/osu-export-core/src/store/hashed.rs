//! Hash-based on-disk file storage

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::{FileReader, FileStore};
use crate::error::{Error, Result};

/// Directory store laid out the way osu!lazer keeps its files
///
/// Files are stored at: `{root}/{hash[0]}/{hash[0..2]}/{hash}`
/// Where `hash` is the lowercase SHA-256 hex digest
#[derive(Debug, Clone)]
pub struct HashedFileStore {
    files_path: PathBuf,
}

impl HashedFileStore {
    /// Create a store rooted at `files_path`
    pub fn new(files_path: impl AsRef<Path>) -> Self {
        Self {
            files_path: files_path.as_ref().to_path_buf(),
        }
    }

    /// Get the storage path for a given hash.
    ///
    /// Returns `None` unless `hash` is at least two ASCII hex digits.
    pub fn hash_to_path(&self, hash: &str) -> Option<PathBuf> {
        if hash.len() < 2 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let hash = hash.to_ascii_lowercase();
        Some(
            self.files_path
                .join(&hash[0..1])
                .join(&hash[0..2])
                .join(&hash),
        )
    }

    /// Check if a file exists in the store
    pub fn exists(&self, hash: &str) -> bool {
        self.hash_to_path(hash).is_some_and(|path| path.is_file())
    }

    /// Store `content` under its hash, returning the hash.
    ///
    /// Storing the same content twice is a no-op.
    pub fn insert(&self, content: &[u8]) -> Result<String> {
        let hash = Self::calculate_hash(content);
        let path = self
            .hash_to_path(&hash)
            .ok_or_else(|| Error::Other(format!("Invalid content hash {}", hash)))?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
        }
        Ok(hash)
    }

    /// Calculate the SHA-256 hash of content
    pub fn calculate_hash(content: &[u8]) -> String {
        format!("{:x}", Sha256::digest(content))
    }
}

impl FileStore for HashedFileStore {
    fn open(&self, hash: &str) -> Result<FileReader> {
        let not_found = || Error::NotFound(format!("File with hash {} not found", hash));
        let path = self.hash_to_path(hash).ok_or_else(not_found)?;
        match fs::File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }
}
