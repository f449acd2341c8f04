//! Beatmap set archive (.osz) export

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::CompressionLevel;
use crate::error::{Error, Result};
use crate::select::SelectedSet;
use crate::store::FileStore;

/// Write the selected part of a set to `{output_dir}/{folder name}.osz`.
///
/// Every file of the set is included except .osu files that belong only to
/// unselected difficulties. An existing archive is never overwritten.
pub fn export_archive(
    selected: &SelectedSet<'_>,
    store: &dyn FileStore,
    output_dir: &Path,
    level: CompressionLevel,
) -> Result<PathBuf> {
    let dest = output_dir.join(format!("{}.osz", selected.set.generate_folder_name()));

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&dest)
        .map_err(|e| Error::from_create(e, &dest))?;

    match write_archive(file, selected, store, level) {
        Ok(count) => {
            tracing::debug!("Wrote {} files to {}", count, dest.display());
            Ok(dest)
        }
        Err(e) => {
            let _ = fs::remove_file(&dest);
            Err(e)
        }
    }
}

fn write_archive<W: Write + io::Seek>(
    writer: W,
    selected: &SelectedSet<'_>,
    store: &dyn FileStore,
    level: CompressionLevel,
) -> Result<usize> {
    let mut zip = ZipWriter::new(writer);

    let options = match level {
        CompressionLevel::Fast => {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        }
        _ => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level.to_zip_level() as i64)),
    };

    let excluded = selected.excluded_hashes();
    let mut count = 0;

    for file in &selected.set.files {
        if excluded.contains(file.hash.as_str()) {
            continue;
        }

        let mut reader = store.open(&file.hash)?;
        zip.start_file(file.filename.replace('\\', "/"), options)?;
        io::copy(&mut reader, &mut zip)?;
        count += 1;
    }

    zip.finish()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::{BeatmapInfo, BeatmapMetadata, BeatmapSet, NamedFile};
    use crate::store::HashedFileStore;
    use std::fs::File;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn fixture(store: &HashedFileStore) -> BeatmapSet {
        let mut set = BeatmapSet::new(Some(42));
        for (id, content) in [("1", "easy"), ("2", "hard")] {
            let hash = store.insert(content.as_bytes()).unwrap();
            set.files.push(NamedFile::new(format!("{}.osu", content), hash.clone()));
            set.beatmaps.push(BeatmapInfo {
                id: id.into(),
                hash,
                metadata: BeatmapMetadata {
                    artist: "Artist".into(),
                    title: "Title".into(),
                    audio_file: "audio.mp3".into(),
                    ..Default::default()
                },
                ..Default::default()
            });
        }
        let audio = store.insert(b"audio").unwrap();
        set.files.push(NamedFile::new("sb\\audio.mp3", audio));
        set
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        names
    }

    #[test]
    fn test_full_set() {
        let files = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = HashedFileStore::new(files.path());
        let set = fixture(&store);

        let path = export_archive(
            &SelectedSet::all(&set),
            &store,
            out.path(),
            CompressionLevel::Normal,
        )
        .unwrap();

        assert_eq!(path.file_name().unwrap(), "42 Artist - Title.osz");
        assert_eq!(entry_names(&path), vec!["easy.osu", "hard.osu", "sb/audio.mp3"]);
    }

    #[test]
    fn test_unselected_difficulty_excluded() {
        let files = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = HashedFileStore::new(files.path());
        let set = fixture(&store);

        let path = export_archive(
            &SelectedSet::new(&set, &[1]),
            &store,
            out.path(),
            CompressionLevel::Fast,
        )
        .unwrap();

        assert_eq!(entry_names(&path), vec!["hard.osu", "sb/audio.mp3"]);
    }

    #[test]
    fn test_missing_file_removes_partial_archive() {
        let files = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = HashedFileStore::new(files.path());
        let mut set = fixture(&store);
        set.files.push(NamedFile::new("gone.png", "deadbeef"));

        let result = export_archive(
            &SelectedSet::all(&set),
            &store,
            out.path(),
            CompressionLevel::Best,
        );

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(fs::read_dir(out.path()).unwrap().next().is_none());
    }
}
