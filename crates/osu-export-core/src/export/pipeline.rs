//! Run-level export driver
//!
//! The pipeline owns the library, the current filters and the current
//! selection. Each export method walks the selection, runs one unit of work
//! per set or task and keeps going when a unit fails.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::archive::export_archive;
use super::audio::{export_audio, AudioExport, Transcoder};
use super::files::{export_background, export_file, export_replay};
use super::tasks::{audio_tasks, background_tasks, replay_tasks};
use crate::collection::CollectionIndex;
use crate::config::{ExportConfig, ExportFormat};
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::library::Library;
use crate::select::{SelectedSet, Selection, Selector};
use crate::store::FileStore;

/// A unit of work that failed
#[derive(Debug)]
pub struct UnitFailure {
    /// Human-readable name of the unit (archive, track or replay)
    pub unit: String,
    pub error: Error,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.unit, self.error)
    }
}

/// Result of one export run
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Files written
    pub exported: Vec<PathBuf>,
    /// Units that were skipped without error
    pub skipped: usize,
    /// Units exported with a tagging problem
    pub tagging_warnings: usize,
    pub failures: Vec<UnitFailure>,
}

impl ExportReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of units processed, successful or not
    pub fn total(&self) -> usize {
        self.exported.len() + self.skipped + self.failures.len()
    }

    /// Check if any unit failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn record(&mut self, unit: String, result: Result<PathBuf>) {
        match result {
            Ok(path) => {
                tracing::debug!("Exported {}", path.display());
                self.exported.push(path);
            }
            Err(error) => {
                tracing::warn!("Failed to export {}: {}", unit, error);
                self.failures.push(UnitFailure { unit, error });
            }
        }
    }
}

/// Progress callback for export runs
pub type ExportProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Progress information during an export run
#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub format: ExportFormat,
    /// Unit that was just processed
    pub current: String,
    /// Units processed so far
    pub processed: usize,
    /// Units in this run
    pub total: usize,
}

impl ExportProgress {
    /// Get progress percentage (0.0 to 100.0)
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.processed as f32 / self.total as f32) * 100.0
        }
    }
}

/// Selects beatmaps and exports them
pub struct ExportPipeline {
    library: Library,
    store: Arc<dyn FileStore>,
    collections: CollectionIndex,
    config: ExportConfig,
    selection: Selection,
    progress_callback: Option<ExportProgressCallback>,
}

impl ExportPipeline {
    /// Create a pipeline. Nothing is selected until
    /// [`refresh_selection`](Self::refresh_selection) runs.
    pub fn new(library: Library, store: Arc<dyn FileStore>, config: ExportConfig) -> Self {
        let collections = CollectionIndex::new(library.collections(), library.sets());
        Self {
            library,
            store,
            collections,
            config,
            selection: Selection::default(),
            progress_callback: None,
        }
    }

    /// Set a callback invoked after every unit of an export run
    pub fn with_progress(mut self, callback: ExportProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn collections(&self) -> &CollectionIndex {
        &self.collections
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Current filters, with collection filters resolved after a refresh
    pub fn filters(&self) -> &[Filter] {
        &self.config.filters
    }

    /// Replace the filters. The selection is stale until the next refresh.
    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.config.filters = filters;
    }

    /// Resolve collection filters and recompute the selection
    pub fn refresh_selection(&mut self, on_collection_failure: impl FnMut(Error)) -> &Selection {
        let selector = Selector::new(&self.library, &self.collections);
        self.selection = selector.refresh(&mut self.config.filters, on_collection_failure);
        &self.selection
    }

    /// Selected sets with their selected difficulties
    pub fn selected_sets(&self) -> impl Iterator<Item = SelectedSet<'_>> {
        self.selection.sets(&self.library)
    }

    fn output_dir(&self) -> Result<&Path> {
        let dir = self.config.output_path.as_path();
        std::fs::create_dir_all(dir)?;
        Ok(dir)
    }

    fn report_progress(&self, format: ExportFormat, current: &str, processed: usize, total: usize) {
        if let Some(ref cb) = self.progress_callback {
            cb(ExportProgress {
                format,
                current: current.to_string(),
                processed,
                total,
            });
        }
    }

    fn finish(&self, format: ExportFormat, report: ExportReport) -> ExportReport {
        tracing::info!(
            "{} export finished: {} exported, {} skipped, {} failed",
            format,
            report.exported.len(),
            report.skipped,
            report.failures.len()
        );
        report
    }

    /// Write one .osz archive per selected set
    pub fn export_archives(&self) -> Result<ExportReport> {
        let output_dir = self.output_dir()?;
        let total = self.selection.set_count();
        let mut report = ExportReport::new();

        for (idx, selected) in self.selected_sets().enumerate() {
            let unit = selected.set.generate_folder_name();
            let result = export_archive(
                &selected,
                self.store.as_ref(),
                output_dir,
                self.config.compression_level,
            );
            report.record(unit.clone(), result);
            self.report_progress(ExportFormat::Beatmap, &unit, idx + 1, total);
        }

        Ok(self.finish(ExportFormat::Beatmap, report))
    }

    /// Copy every distinct background of the selection
    pub fn export_backgrounds(&self) -> Result<ExportReport> {
        let output_dir = self.output_dir()?;
        let tasks: Vec<_> = self
            .selected_sets()
            .flat_map(|selected| background_tasks(&selected))
            .collect();
        let mut report = ExportReport::new();

        for (idx, task) in tasks.iter().enumerate() {
            let result = export_background(task, self.store.as_ref(), output_dir);
            report.record(task.output_filename.clone(), result);
            self.report_progress(ExportFormat::Background, &task.output_filename, idx + 1, tasks.len());
        }

        Ok(self.finish(ExportFormat::Background, report))
    }

    /// Copy the replay of every score on a selected difficulty
    pub fn export_replays(&self) -> Result<ExportReport> {
        let output_dir = self.output_dir()?;
        let tasks: Vec<_> = self
            .selected_sets()
            .flat_map(|selected| replay_tasks(&selected))
            .collect();
        let mut report = ExportReport::new();

        for (idx, task) in tasks.iter().enumerate() {
            if task.score.replay_file().is_none() {
                tracing::debug!("Score {} has no replay", task.score.id);
                report.skipped += 1;
            } else {
                let result = export_replay(task, self.store.as_ref(), output_dir);
                report.record(task.output_filename.clone(), result);
            }
            self.report_progress(ExportFormat::Replay, &task.output_filename, idx + 1, tasks.len());
        }

        Ok(self.finish(ExportFormat::Replay, report))
    }

    /// Export every distinct audio track of the selection, running up to
    /// `concurrency` tracks at once.
    ///
    /// Tagging problems go to `on_tagging_failure` and do not fail the track.
    pub async fn export_audio(
        &self,
        transcoder: &dyn Transcoder,
        concurrency: usize,
        mut on_tagging_failure: impl FnMut(Error),
    ) -> Result<ExportReport> {
        let output_dir = self.output_dir()?;
        let store = &self.store;
        let tasks: Vec<_> = self
            .selected_sets()
            .flat_map(|selected| audio_tasks(&selected))
            .collect();
        let total = tasks.len();
        let mut report = ExportReport::new();

        let mut results = stream::iter(tasks.iter())
            .map(|task| async move {
                let result = export_audio(task, store, output_dir, transcoder).await;
                (task, result)
            })
            .buffer_unordered(concurrency.max(1));

        let mut processed = 0;
        while let Some((task, result)) = results.next().await {
            processed += 1;
            match result {
                Ok(outcome) => {
                    if let Some(error) = outcome.tagging {
                        report.tagging_warnings += 1;
                        on_tagging_failure(error);
                    }
                    match outcome.export {
                        AudioExport::Copied(path) | AudioExport::Transcoded(path) => {
                            report.exported.push(path)
                        }
                        AudioExport::Skipped => report.skipped += 1,
                    }
                }
                Err(error) => report.record(task.output_filename.clone(), Err(error)),
            }
            self.report_progress(ExportFormat::Audio, &task.output_filename, processed, total);
        }

        Ok(self.finish(ExportFormat::Audio, report))
    }

    /// Copy a single stored file into the output directory
    pub fn export_file(&self, hash: &str, name: &str) -> Result<PathBuf> {
        let output_dir = self.output_dir()?;
        export_file(self.store.as_ref(), hash, name, output_dir)
    }
}
