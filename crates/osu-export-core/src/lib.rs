//! # osu-export-core
//!
//! Core library for selecting beatmaps from an osu! library and exporting
//! them.
//!
//! This crate provides the foundational functionality for:
//! - Loading a library of beatmap sets and collections
//! - Reading files from a content-addressed file store
//! - Declaring filters as text rules, including collection membership
//! - Computing the selected difficulties of every set
//! - Exporting the selection as `.osz` archives, tagged mp3 tracks,
//!   background images and replays
//!
//! ## Modules
//!
//! - [`beatmap`] - Beatmap data structures (sets, difficulties, scores, files)
//! - [`collection`] - Collections and the collection index
//! - [`config`] - Persisted and run-time configuration
//! - [`error`] - Error types and Result alias
//! - [`export`] - Export tasks, executors and the export pipeline
//! - [`filter`] - Filters and the filter rule parser
//! - [`library`] - Library loading
//! - [`select`] - Filter resolution and selection
//! - [`store`] - Content-addressed file storage
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use osu_export_core::{
//!     ExportConfig, ExportPipeline, Filter, HashedFileStore, JsonLibrarySource, LibrarySource,
//! };
//!
//! let library = JsonLibrarySource::new("library.json").load().expect("Failed to load");
//! let store = Arc::new(HashedFileStore::new("files"));
//! let config = ExportConfig::new("out").with_filter(Filter::parse("stars 5+").unwrap());
//!
//! let mut pipeline = ExportPipeline::new(library, store, config);
//! pipeline.refresh_selection(|e| eprintln!("{}", e));
//! let report = pipeline.export_archives().expect("Failed to export");
//! println!("Exported {} archives", report.exported.len());
//! ```

// Module declarations
pub mod beatmap;
pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod library;
pub mod select;
pub mod store;
pub mod utils;

// Re-export key types for convenience

// Error types
pub use error::{Error, Result};

// Beatmap types
pub use beatmap::{
    BeatmapInfo, BeatmapMetadata, BeatmapSet, GameMode, NamedFile, RankedStatus, ScoreInfo,
};

// Library and storage
pub use library::{JsonLibrarySource, Library, LibrarySource};
pub use store::{FileReader, FileStore, HashedFileStore};

// Configuration
pub use config::{CompressionLevel, Config, ExportConfig, ExportFormat};

// Collections
pub use collection::{Collection, CollectionEntry, CollectionIndex};

// Filtering and selection
pub use filter::{Filter, FilterKind, FilterTemplate};
pub use select::{SelectedSet, Selection, Selector, ALL_COLLECTIONS};

// Export
pub use export::{
    AudioExport, AudioExportOutcome, AudioTask, BackgroundTask, ExportPipeline, ExportProgress,
    ExportProgressCallback, ExportReport, FfmpegTranscoder, ReplayTask, Transcoder, UnitFailure,
};
