//! Error types for osu-export-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for osu-export operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read/write ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to read library manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// An expected file is missing from the file store or the beatmap set
    #[error("File not found: {0}")]
    NotFound(String),

    /// Export destination is already occupied; nothing is ever overwritten
    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Transcoding {source_file} failed: {message}")]
    Transcode {
        source_file: String,
        message: String,
    },

    #[error("Failed to tag {}: {message}", path.display())]
    Tagging { path: PathBuf, message: String },

    #[error("Unknown collection reference: {0}")]
    CollectionResolution(String),

    #[error("Invalid filter '{rule}': {reason}")]
    InvalidFilter { rule: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error fails the unit of work it occurred in.
    ///
    /// Tagging and collection resolution problems are diagnostics only: the
    /// export or the selection still goes ahead without the offending part.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Tagging { .. } | Error::CollectionResolution(_))
    }

    /// Map an `AlreadyExists` I/O failure on `path` to [`Error::DestinationExists`]
    pub(crate) fn from_create(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::AlreadyExists {
            Error::DestinationExists(path.to_path_buf())
        } else {
            Error::Io(err)
        }
    }
}

/// Result type alias for osu-export operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::NotFound("audio.mp3".into()).is_fatal());
        assert!(Error::DestinationExists(PathBuf::from("a.osz")).is_fatal());
        assert!(!Error::CollectionResolution("#9".into()).is_fatal());
        assert!(!Error::Tagging {
            path: PathBuf::from("a.mp3"),
            message: "bad frame".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_from_create_maps_already_exists() {
        let err = std::io::Error::from(std::io::ErrorKind::AlreadyExists);
        assert!(matches!(
            Error::from_create(err, Path::new("x")),
            Error::DestinationExists(_)
        ));

        let err = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(Error::from_create(err, Path::new("x")), Error::Io(_)));
    }
}
