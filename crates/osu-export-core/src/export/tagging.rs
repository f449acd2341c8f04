//! ID3 tag enrichment for exported audio
//!
//! Fields already present in the file are left alone. The comment is the one
//! exception: it always carries the set ID and the beatmap tags.

use std::path::Path;

use id3::frame::{Comment, Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Version};

use crate::beatmap::{BeatmapMetadata, BeatmapSet};
use crate::error::{Error, Result};

/// Embedded cover image
#[derive(Debug, Clone)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl CoverArt {
    /// Guess the MIME type from the image filename
    pub fn new(data: Vec<u8>, filename: &str) -> Self {
        let mime_type = match crate::utils::extension_of(filename).as_deref() {
            Some("png") => "image/png",
            Some("bmp") => "image/bmp",
            Some("gif") => "image/gif",
            _ => "image/jpeg",
        };
        Self {
            data,
            mime_type: mime_type.to_string(),
        }
    }
}

/// Values written to an exported audio file
#[derive(Debug, Clone, Default)]
pub struct TagValues {
    pub title: String,
    pub performer: String,
    pub description: String,
    pub comment: String,
    pub cover: Option<CoverArt>,
}

impl TagValues {
    /// Derive tag values for one track of a set
    pub fn from_metadata(set: &BeatmapSet, metadata: &BeatmapMetadata) -> Self {
        Self {
            title: metadata.display_title().to_string(),
            performer: metadata.display_artist().to_string(),
            description: format!("{} - {}", metadata.artist, metadata.title),
            comment: format!("{} {}", set.id_or_zero(), metadata.tags),
            cover: None,
        }
    }

    pub fn with_cover(mut self, cover: Option<CoverArt>) -> Self {
        self.cover = cover;
        self
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn tagging_error(path: &Path, message: impl ToString) -> Error {
    Error::Tagging {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Merge `values` into the ID3 tag of the file at `path`
pub fn write_tags(path: &Path, values: &TagValues) -> Result<()> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Tag::new(),
        Err(e) => return Err(tagging_error(path, e)),
    };

    if is_blank(tag.title()) && !values.title.is_empty() {
        tag.set_title(values.title.as_str());
    }
    if is_blank(tag.artist()) && !values.performer.is_empty() {
        tag.set_artist(values.performer.as_str());
    }
    let subtitle = tag.get("TIT3").and_then(|f| f.content().text());
    if is_blank(subtitle) && !values.description.is_empty() {
        tag.set_text("TIT3", values.description.as_str());
    }

    let _ = tag.remove("COMM");
    tag.add_frame(Comment {
        lang: "eng".to_string(),
        description: String::new(),
        text: values.comment.clone(),
    });

    if let Some(cover) = &values.cover {
        if tag.pictures().next().is_none() {
            tag.add_frame(Picture {
                mime_type: cover.mime_type.clone(),
                picture_type: PictureType::CoverFront,
                description: String::new(),
                data: cover.data.clone(),
            });
        }
    }

    tag.write_to_path(path, Version::Id3v24)
        .map_err(|e| tagging_error(path, e))
}
