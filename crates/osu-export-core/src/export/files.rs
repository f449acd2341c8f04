//! Plain file exports: backgrounds, replays and single files

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::tasks::{BackgroundTask, ReplayTask};
use crate::error::{Error, Result};
use crate::store::{FileReader, FileStore};
use crate::utils::{base_filename, sanitize_filename};

/// Create `dest`, failing with [`Error::DestinationExists`] if it is present
fn create_new(dest: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| Error::from_create(e, dest))
}

/// Copy `reader` into a new file at `dest`, removing it again if the copy
/// fails part way
fn copy_new(mut reader: FileReader, dest: &Path) -> Result<PathBuf> {
    let mut file = create_new(dest)?;
    let copied = io::copy(&mut reader, &mut file).and_then(|_| file.flush());
    drop(file);
    if let Err(e) = copied {
        let _ = fs::remove_file(dest);
        return Err(e.into());
    }
    Ok(dest.to_path_buf())
}

/// Copy the background image of a task into `output_dir`
pub fn export_background(
    task: &BackgroundTask<'_>,
    store: &dyn FileStore,
    output_dir: &Path,
) -> Result<PathBuf> {
    let reader = store.open_named(task.set, task.filename())?.ok_or_else(|| {
        Error::NotFound(format!("{} in set {}", task.filename(), task.set.id_or_zero()))
    })?;
    copy_new(reader, &output_dir.join(&task.output_filename))
}

/// Copy the replay of a score into `output_dir`
pub fn export_replay(
    task: &ReplayTask<'_>,
    store: &dyn FileStore,
    output_dir: &Path,
) -> Result<PathBuf> {
    let replay = task
        .score
        .replay_file()
        .ok_or_else(|| Error::NotFound(format!("replay for score {}", task.score.id)))?;
    let reader = store.open(&replay.hash)?;
    copy_new(reader, &output_dir.join(&task.output_filename))
}

/// Copy one stored file by hash into `output_dir`, keeping only the base
/// component of `name`
pub fn export_file(
    store: &dyn FileStore,
    hash: &str,
    name: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let reader = store.open(hash)?;
    let filename = sanitize_filename(base_filename(name));
    copy_new(reader, &output_dir.join(filename))
}
