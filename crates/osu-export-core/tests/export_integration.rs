//! Integration tests for selection and export runs.
//!
//! Each test builds a small library backed by a real `HashedFileStore` in a
//! temporary directory, round-trips it through a JSON manifest and drives the
//! `ExportPipeline` end to end.

use async_trait::async_trait;
use id3::{Tag, TagLike, Version};
use osu_export_core::{
    BeatmapInfo, BeatmapMetadata, BeatmapSet, Collection, Error, ExportConfig, ExportPipeline,
    FileStore, Filter, HashedFileStore, JsonLibrarySource, LibrarySource, NamedFile, Result,
    ScoreInfo, Transcoder,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use zip::ZipArchive;

/// Test fixture with a file store, a manifest and an output directory.
struct TestFixture {
    _temp_dir: TempDir,
    store: HashedFileStore,
    manifest: PathBuf,
    output: PathBuf,
}

impl TestFixture {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        Self {
            store: HashedFileStore::new(base.join("files")),
            manifest: base.join("library.json"),
            output: base.join("export"),
            _temp_dir: temp_dir,
        }
    }

    fn insert(&self, content: &[u8]) -> String {
        self.store.insert(content).expect("Failed to store file")
    }

    /// Add a difficulty and its .osu file to `set`
    fn add_difficulty(&self, set: &mut BeatmapSet, id: &str, version: &str, audio: &str) {
        let osu = format!("osu file format v14\n[Metadata]\nVersion:{}\n", version);
        let hash = self.insert(osu.as_bytes());
        let title = format!("Song {}", set.id_or_zero());
        set.files.push(NamedFile::new(format!("{}.osu", version), hash.clone()));
        set.beatmaps.push(BeatmapInfo {
            id: id.into(),
            md5_hash: format!("md5-{}", id),
            hash,
            version: version.into(),
            metadata: BeatmapMetadata {
                title,
                artist: "Artist".into(),
                tags: "tech".into(),
                audio_file: audio.into(),
                background_file: Some("bg.jpg".into()),
                ..Default::default()
            },
            ..Default::default()
        });
    }

    /// Two sets: set 10 with Easy/Hard sharing `audio.mp3`, set 20 with a
    /// single difficulty using `audio.ogg`. Collection "Faves" holds Hard.
    fn build_library(&self) {
        let mut first = BeatmapSet::new(Some(10));
        self.add_difficulty(&mut first, "10-easy", "Easy", "audio.mp3");
        self.add_difficulty(&mut first, "10-hard", "Hard", "audio.mp3");
        first.files.push(NamedFile::new("audio.mp3", self.insert(b"mp3 audio")));
        first.files.push(NamedFile::new("bg.jpg", self.insert(b"background 10")));

        let mut second = BeatmapSet::new(Some(20));
        self.add_difficulty(&mut second, "20-normal", "Normal", "audio.ogg");
        second.files.push(NamedFile::new("audio.ogg", self.insert(b"ogg audio")));
        second.files.push(NamedFile::new("bg.jpg", self.insert(b"background 20")));
        second.beatmaps[0].scores.push(ScoreInfo {
            id: "900".into(),
            player_name: "WhiteCat".into(),
            files: vec![NamedFile::new("replay.osr", self.insert(b"replay data"))],
            ..Default::default()
        });

        let collections = vec![Collection::with_hashes("Faves", vec!["md5-10-hard".into()])];

        JsonLibrarySource::new(&self.manifest)
            .save(&[second, first], &collections)
            .expect("Failed to write manifest");
    }

    fn pipeline(&self, filters: &[&str]) -> ExportPipeline {
        let library = JsonLibrarySource::new(&self.manifest)
            .load()
            .expect("Failed to load manifest");
        let mut config = ExportConfig::new(&self.output);
        for rule in filters {
            config = config.with_filter(Filter::parse(rule).expect("Invalid rule"));
        }
        let mut pipeline = ExportPipeline::new(library, Arc::new(self.store.clone()), config);
        pipeline.refresh_selection(|e| panic!("unexpected collection failure: {}", e));
        pipeline
    }
}

fn archive_entries(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).expect("Failed to open archive"))
        .expect("Failed to read archive");
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

/// Transcoder double that records calls
struct MockTranscoder {
    available: bool,
    fail: bool,
    write_output: bool,
    calls: AtomicUsize,
}

impl MockTranscoder {
    fn new(available: bool) -> Self {
        Self {
            available,
            fail: false,
            write_output: true,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(true)
        }
    }

    /// Reports success but leaves no file behind
    fn silent() -> Self {
        Self {
            write_output: false,
            ..Self::new(true)
        }
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn transcode_to_mp3(&self, source: Vec<u8>, source_format: &str, dest: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(source_format, "ogg");
        if self.fail {
            return Err(Error::Transcode {
                source_file: "stdin".into(),
                message: "encoder crashed".into(),
            });
        }
        if self.write_output {
            let mut converted = b"converted:".to_vec();
            converted.extend_from_slice(&source);
            fs::write(dest, converted)?;
        } else {
            fs::remove_file(dest)?;
        }
        Ok(())
    }
}

#[test]
fn test_discovery_order_follows_online_id() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&[]);

    let ids: Vec<_> = pipeline
        .selected_sets()
        .map(|s| s.set.online_id)
        .collect();
    assert_eq!(ids, vec![Some(10), Some(20)]);
    assert_eq!(pipeline.selection().beatmap_count(), 3);
}

#[test]
fn test_archive_includes_only_selected_difficulties() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&["collection Faves"]);

    assert_eq!(pipeline.selection().set_count(), 1);
    let report = pipeline.export_archives().expect("Export failed");

    assert!(!report.has_failures());
    assert_eq!(report.exported.len(), 1);
    assert_eq!(
        report.exported[0].file_name().unwrap(),
        "10 Artist - Song 10.osz"
    );
    assert_eq!(
        archive_entries(&report.exported[0]),
        vec!["Hard.osu", "audio.mp3", "bg.jpg"]
    );
}

#[test]
fn test_archive_of_fully_selected_set_has_every_file() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&["mode osu"]);

    let report = pipeline.export_archives().expect("Export failed");
    assert_eq!(report.exported.len(), 2);
    assert_eq!(
        archive_entries(&report.exported[0]),
        vec!["Easy.osu", "Hard.osu", "audio.mp3", "bg.jpg"]
    );
}

#[test]
fn test_existing_archive_fails_only_that_set() {
    let fixture = TestFixture::new();
    fixture.build_library();
    fs::create_dir_all(&fixture.output).unwrap();
    let occupied = fixture.output.join("10 Artist - Song 10.osz");
    fs::write(&occupied, b"do not touch").unwrap();

    let pipeline = fixture.pipeline(&[]);
    let report = pipeline.export_archives().expect("Export failed");

    assert_eq!(report.exported.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        Error::DestinationExists(_)
    ));
    assert_eq!(fs::read(&occupied).unwrap(), b"do not touch");
}

#[tokio::test]
async fn test_audio_export_without_transcoder() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&[]);
    let transcoder = MockTranscoder::new(false);

    let report = pipeline
        .export_audio(&transcoder, 4, |e| panic!("unexpected tagging failure: {}", e))
        .await
        .expect("Export failed");

    // Easy and Hard share one track; the ogg track is skipped.
    assert_eq!(report.exported, vec![fixture.output.join("Artist - Song 10 (10).mp3")]);
    assert_eq!(report.skipped, 1);
    assert!(!report.has_failures());
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_audio_export_with_transcoder() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&["!collection Faves"]);
    let transcoder = MockTranscoder::new(true);

    let report = pipeline
        .export_audio(&transcoder, 2, |e| panic!("unexpected tagging failure: {}", e))
        .await
        .expect("Export failed");

    let mut exported = report.exported.clone();
    exported.sort();
    assert_eq!(
        exported,
        vec![
            fixture.output.join("Artist - Song 10 (10).mp3"),
            fixture.output.join("Artist - Song 20 (20).mp3"),
        ]
    );
    assert_eq!(transcoder.calls.load(Ordering::SeqCst), 1);

    let tag = Tag::read_from_path(fixture.output.join("Artist - Song 20 (20).mp3")).unwrap();
    assert_eq!(tag.title(), Some("Song 20"));
    assert_eq!(tag.artist(), Some("Artist"));
    assert_eq!(tag.comments().next().unwrap().text, "20 tech");
    assert_eq!(tag.pictures().next().unwrap().data, b"background 20".to_vec());
}

#[tokio::test]
async fn test_transcode_failure_is_reported_per_track() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&[]);

    let report = pipeline
        .export_audio(&MockTranscoder::failing(), 4, |_| {})
        .await
        .expect("Export failed");

    assert_eq!(report.exported.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].unit, "Artist - Song 20 (20).mp3");
    match &report.failures[0].error {
        Error::Transcode { source_file, message } => {
            assert_eq!(source_file, "audio.ogg");
            assert!(message.contains("encoder crashed"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_shared_audio_name_keeps_first_export() {
    let fixture = TestFixture::new();
    let mut sets = Vec::new();
    for (id, content) in [("a", &b"ogg one"[..]), ("b", &b"ogg two"[..])] {
        let mut set = BeatmapSet::new(Some(9));
        set.files.push(NamedFile::new("a.ogg", fixture.insert(content)));
        set.beatmaps.push(BeatmapInfo {
            id: id.into(),
            metadata: BeatmapMetadata {
                artist: "Artist".into(),
                title: "Title".into(),
                audio_file: "a.ogg".into(),
                ..Default::default()
            },
            ..Default::default()
        });
        sets.push(set);
    }
    let mut pipeline = ExportPipeline::new(
        osu_export_core::Library::new(sets, Vec::new()),
        Arc::new(fixture.store.clone()),
        ExportConfig::new(&fixture.output),
    );
    pipeline.refresh_selection(|_| {});

    let report = pipeline
        .export_audio(&MockTranscoder::new(true), 2, |e| panic!("unexpected tagging failure: {}", e))
        .await
        .expect("Export failed");

    let path = fixture.output.join("Artist - Title (9).mp3");
    assert_eq!(report.exported, vec![path.clone()]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        Error::DestinationExists(_)
    ));
    assert!(path.is_file());
    assert_eq!(Tag::read_from_path(&path).unwrap().title(), Some("Title"));
    assert_eq!(fs::read_dir(&fixture.output).unwrap().count(), 1);
}

#[tokio::test]
async fn test_tagging_failure_goes_to_callback() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&["title song 20"]);

    let mut tagging_failures = Vec::new();
    let report = pipeline
        .export_audio(&MockTranscoder::silent(), 1, |e| tagging_failures.push(e))
        .await
        .expect("Export failed");

    assert_eq!(report.exported.len(), 1);
    assert_eq!(report.tagging_warnings, 1);
    assert!(!report.has_failures());
    assert_eq!(tagging_failures.len(), 1);
    assert!(matches!(tagging_failures[0], Error::Tagging { .. }));
}

#[tokio::test]
async fn test_existing_title_is_kept_but_comment_replaced() {
    let fixture = TestFixture::new();
    fixture.build_library();

    // Give the stored mp3 a tag of its own before exporting it.
    let tagged = fixture._temp_dir.path().join("tagged.mp3");
    fs::write(&tagged, b"mp3 audio").unwrap();
    let mut tag = Tag::new();
    tag.set_title("Original Title");
    tag.write_to_path(&tagged, Version::Id3v24).unwrap();
    let hash = fixture.insert(&fs::read(&tagged).unwrap());

    let mut library = JsonLibrarySource::new(&fixture.manifest).load().unwrap();
    let mut sets = library.sets().to_vec();
    for file in sets[0].files.iter_mut().filter(|f| f.filename == "audio.mp3") {
        file.hash = hash.clone();
    }
    library = osu_export_core::Library::new(sets, library.collections().to_vec());

    let mut pipeline = ExportPipeline::new(
        library,
        Arc::new(fixture.store.clone()),
        ExportConfig::new(&fixture.output),
    );
    pipeline.refresh_selection(|_| {});

    let report = pipeline
        .export_audio(&MockTranscoder::new(false), 1, |_| {})
        .await
        .expect("Export failed");
    assert_eq!(report.exported.len(), 1);

    let tag = Tag::read_from_path(&report.exported[0]).unwrap();
    assert_eq!(tag.title(), Some("Original Title"));
    assert_eq!(tag.comments().next().unwrap().text, "10 tech");
}

#[test]
fn test_backgrounds_and_replays() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&[]);

    let backgrounds = pipeline.export_backgrounds().expect("Export failed");
    assert_eq!(backgrounds.exported.len(), 2);
    assert_eq!(
        fs::read(fixture.output.join("Artist - Song 20 (20).jpg")).unwrap(),
        b"background 20"
    );

    let replays = pipeline.export_replays().expect("Export failed");
    assert_eq!(
        replays.exported,
        vec![fixture.output.join("WhiteCat - Artist - Song 20 [Normal] (900).osr")]
    );
}

#[test]
fn test_unknown_collection_is_reported_and_dropped() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let library = JsonLibrarySource::new(&fixture.manifest).load().unwrap();
    let config = ExportConfig::new(&fixture.output)
        .with_filter(Filter::parse("collection #1, Missing").unwrap());
    let mut pipeline = ExportPipeline::new(library, Arc::new(fixture.store.clone()), config);

    let mut failures = Vec::new();
    pipeline.refresh_selection(|e| failures.push(e.to_string()));

    assert_eq!(failures, vec!["Unknown collection reference: Missing".to_string()]);
    assert_eq!(pipeline.selection().beatmap_count(), 1);
    assert_eq!(pipeline.filters().len(), 1);
    assert!(pipeline.filters()[0].is_synthesized());
}

#[test]
fn test_export_single_file() {
    let fixture = TestFixture::new();
    fixture.build_library();
    let pipeline = fixture.pipeline(&[]);
    let hash = fixture.insert(b"storyboard sprite");

    let path = pipeline
        .export_file(&hash, "sb/sprites/star.png")
        .expect("Export failed");

    assert_eq!(path, fixture.output.join("star.png"));
    assert_eq!(fixture.store.read(&hash).unwrap(), b"storyboard sprite");
}
