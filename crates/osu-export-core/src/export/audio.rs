//! Audio export: copy or transcode to mp3, then tag

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::tagging::{write_tags, CoverArt, TagValues};
use super::tasks::AudioTask;
use crate::error::{Error, Result};
use crate::store::FileStore;

/// Converts audio to mp3
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Whether transcoding is possible at all
    fn is_available(&self) -> bool;

    /// Transcode `source` (encoded as `source_format`) into an mp3 at `dest`.
    ///
    /// `dest` has already been created empty for this export and is
    /// replaced with the mp3.
    async fn transcode_to_mp3(&self, source: Vec<u8>, source_format: &str, dest: &Path)
        -> Result<()>;
}

/// [`Transcoder`] backed by the ffmpeg binary
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    available: bool,
}

impl FfmpegTranscoder {
    /// Probe `binary` (or `ffmpeg` on `PATH`) by running `-version`
    pub async fn detect(binary: Option<PathBuf>) -> Self {
        let binary = binary.unwrap_or_else(|| PathBuf::from("ffmpeg"));
        let available = Command::new(&binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);

        if available {
            tracing::debug!("Using ffmpeg at {}", binary.display());
        } else {
            tracing::warn!(
                "ffmpeg not found at {}; non-mp3 audio will be skipped",
                binary.display()
            );
        }

        Self { binary, available }
    }

    /// A transcoder that never runs
    pub fn unavailable() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            available: false,
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn transcode_to_mp3(
        &self,
        source: Vec<u8>,
        source_format: &str,
        dest: &Path,
    ) -> Result<()> {
        let transcode_error = |message: String| Error::Transcode {
            source_file: format!("{} input", source_format),
            message,
        };

        let mut child = Command::new(&self.binary)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i", "pipe:0"])
            .args(["-vn", "-codec:a", "libmp3lame", "-q:a", "2", "-f", "mp3"])
            .arg(dest)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| transcode_error(format!("failed to spawn ffmpeg: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| transcode_error("ffmpeg stdin unavailable".to_string()))?;

        // ffmpeg may exit before reading everything; the exit status decides.
        let feed = async move {
            let _ = stdin.write_all(&source).await;
        };
        let (_, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| transcode_error(format!("ffmpeg process error: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(transcode_error(format!(
                "ffmpeg exited with status {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// What happened to the audio file itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioExport {
    /// Source already was mp3 and was copied verbatim
    Copied(PathBuf),
    /// Source was transcoded to mp3
    Transcoded(PathBuf),
    /// Transcoding was needed but no transcoder is available
    Skipped,
}

impl AudioExport {
    /// Path of the written file, if one was written
    pub fn path(&self) -> Option<&Path> {
        match self {
            AudioExport::Copied(path) | AudioExport::Transcoded(path) => Some(path),
            AudioExport::Skipped => None,
        }
    }
}

/// A successful audio export with an optional tagging diagnostic
#[derive(Debug)]
pub struct AudioExportOutcome {
    pub export: AudioExport,
    /// Set when tagging failed; the exported file is still valid
    pub tagging: Option<Error>,
}

/// Export one audio task into `output_dir`.
///
/// The destination is created before any audio is written, so two tasks
/// that share an output name never clobber each other. On failure only a
/// file created by this call is removed.
pub async fn export_audio(
    task: &AudioTask<'_>,
    store: &Arc<dyn FileStore>,
    output_dir: &Path,
    transcoder: &dyn Transcoder,
) -> Result<AudioExportOutcome> {
    let audio_file = &task.metadata.audio_file;
    let hash = task
        .set
        .find_file(audio_file)
        .map(|file| file.hash.clone())
        .ok_or_else(|| Error::NotFound(format!("{} in set {}", audio_file, task.set.id_or_zero())))?;

    if let Some(format) = &task.transcode_from {
        if !transcoder.is_available() {
            tracing::debug!(
                "Skipping {} ({} needs transcoding)",
                task.output_filename,
                format
            );
            return Ok(AudioExportOutcome {
                export: AudioExport::Skipped,
                tagging: None,
            });
        }
    }

    let source = read_stored(store, hash).await?;
    let dest = output_dir.join(&task.output_filename);
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&dest)
        .await
        .map_err(|e| Error::from_create(e, &dest))?;

    let written = match &task.transcode_from {
        None => {
            let copied = match file.write_all(&source).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };
            drop(file);
            copied
                .map(|_| AudioExport::Copied(dest.clone()))
                .map_err(Error::from)
        }
        Some(format) => {
            drop(file);
            transcoder
                .transcode_to_mp3(source, format, &dest)
                .await
                .map(|_| AudioExport::Transcoded(dest.clone()))
                .map_err(|e| match e {
                    Error::Transcode { message, .. } => Error::Transcode {
                        source_file: audio_file.clone(),
                        message,
                    },
                    other => Error::Transcode {
                        source_file: audio_file.clone(),
                        message: other.to_string(),
                    },
                })
        }
    };

    let export = match written {
        Ok(export) => export,
        Err(e) => {
            let _ = tokio::fs::remove_file(&dest).await;
            return Err(e);
        }
    };

    let values = TagValues::from_metadata(task.set, task.metadata).with_cover(cover_art(task, store).await);
    let tagging = tag_file(dest, values).await.err();
    if let Some(e) = &tagging {
        tracing::warn!("{}", e);
    }

    Ok(AudioExportOutcome { export, tagging })
}

/// The set's background as cover art, if it resolves to a readable file
async fn cover_art(task: &AudioTask<'_>, store: &Arc<dyn FileStore>) -> Option<CoverArt> {
    let filename = task.metadata.background()?;
    let result = match task.set.find_file(filename) {
        Some(file) => read_stored(store, file.hash.clone()).await,
        None => Err(Error::NotFound(filename.to_string())),
    };
    match result {
        Ok(data) => Some(CoverArt::new(data, filename)),
        Err(e) => {
            tracing::debug!("No cover art for {}: {}", task.output_filename, e);
            None
        }
    }
}

/// Read a stored file off the async runtime
async fn read_stored(store: &Arc<dyn FileStore>, hash: String) -> Result<Vec<u8>> {
    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || store.read(&hash)).await {
        Ok(result) => result,
        Err(e) => Err(Error::Other(format!("file read task failed: {e}"))),
    }
}

async fn tag_file(path: PathBuf, values: TagValues) -> Result<()> {
    let target = path.clone();
    match tokio::task::spawn_blocking(move || write_tags(&target, &values)).await {
        Ok(result) => result,
        Err(e) => Err(Error::Tagging {
            path,
            message: e.to_string(),
        }),
    }
}
