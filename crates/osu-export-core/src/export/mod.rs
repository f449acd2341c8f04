//! Export of selected beatmaps
//!
//! Task generators in [`tasks`] turn a selected set into export units. The
//! executors write each unit to the output directory without ever
//! overwriting an existing file, and [`ExportPipeline`] drives whole runs.

mod archive;
mod audio;
mod files;
mod pipeline;
mod tagging;
pub mod tasks;

pub use archive::export_archive;
pub use audio::{export_audio, AudioExport, AudioExportOutcome, FfmpegTranscoder, Transcoder};
pub use files::{export_background, export_file, export_replay};
pub use pipeline::{
    ExportPipeline, ExportProgress, ExportProgressCallback, ExportReport, UnitFailure,
};
pub use tagging::{write_tags, CoverArt, TagValues};
pub use tasks::{audio_tasks, background_tasks, replay_tasks, AudioTask, BackgroundTask, ReplayTask};
