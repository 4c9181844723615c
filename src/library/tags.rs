//! ID3v2 tag access for committed and in-progress audio files.
//!
//! All functions here do blocking file I/O; async callers should run them on
//! the blocking pool.

use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};

use lofty::TextEncoding;
use lofty::config::{ParseOptions, WriteOptions};
use lofty::error::LoftyError;
use lofty::file::AudioFile;
use lofty::id3::v2::{Frame, FrameId, Id3v2Tag, TextInformationFrame};
use lofty::mpeg::MpegFile;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{Accessor, TagExt, TagType};
use thiserror::Error;
use tracing::debug;

use super::cover::CoverArt;
use crate::metadata::TrackMetadata;

/// ID3v2.3 year frame. Holds the date text verbatim, even the default.
const YEAR_FRAME: FrameId<'static> = FrameId::Valid(Cow::Borrowed("TYER"));
const GENRE_FRAME: FrameId<'static> = FrameId::Valid(Cow::Borrowed("TCON"));

/// Errors from reading or writing embedded tags.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("failed to read tags from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: LoftyError,
    },

    #[error("{path} has no ID3v2 tag")]
    NoTag { path: PathBuf },

    #[error("failed to write tags to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: LoftyError,
    },
}

/// Fields read back from a file's ID3v2 tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub date: Option<String>,
    pub genre: Option<String>,
    pub pictures: usize,
}

impl EmbeddedTags {
    /// True when title, artist and album equal `metadata` exactly.
    #[must_use]
    pub fn matches(&self, metadata: &TrackMetadata) -> bool {
        self.title.as_deref() == Some(metadata.title())
            && self.artist.as_deref() == Some(metadata.artists())
            && self.album.as_deref() == Some(metadata.album())
    }
}

/// Reads the ID3v2 fields of the MP3 at `path`.
///
/// Frames are read as stored: the year comes from `TYER` without being
/// folded into a timestamp, so non-numeric values survive.
///
/// # Errors
///
/// Returns [`TagError::Read`] when the file cannot be opened or parsed and
/// [`TagError::NoTag`] when it carries no ID3v2 tag.
pub fn read_tags(path: &Path) -> Result<EmbeddedTags, TagError> {
    let read_error = |source| TagError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(|e| read_error(LoftyError::from(e)))?;
    let mpeg = MpegFile::read_from(
        &mut file,
        ParseOptions::new()
            .read_properties(false)
            .implicit_conversions(false),
    )
    .map_err(read_error)?;

    let tag = mpeg.id3v2().ok_or_else(|| TagError::NoTag {
        path: path.to_path_buf(),
    })?;

    Ok(EmbeddedTags {
        title: tag.title().map(Cow::into_owned),
        artist: tag.artist().map(Cow::into_owned),
        album: tag.album().map(Cow::into_owned),
        date: tag.get_text(&YEAR_FRAME).map(str::to_string),
        genre: tag.get_text(&GENRE_FRAME).map(str::to_string),
        pictures: tag
            .into_iter()
            .filter(|frame| matches!(frame, Frame::Picture(_)))
            .count(),
    })
}

/// Replaces the ID3v2 tag of `path` with `metadata` and optional cover art.
///
/// Any existing ID3v2 tag, including a thumbnail the backend embedded, is
/// removed first. The new tag is saved as ID3v2.3, with the date in `TYER`.
///
/// # Errors
///
/// Returns [`TagError::Write`] when the old tag cannot be removed or the new
/// one cannot be saved.
pub fn embed_tags(
    path: &Path,
    metadata: &TrackMetadata,
    cover: Option<&CoverArt>,
) -> Result<(), TagError> {
    let write_error = |source| TagError::Write {
        path: path.to_path_buf(),
        source,
    };

    TagType::Id3v2.remove_from_path(path).map_err(write_error)?;

    let mut tag = Id3v2Tag::new();
    tag.set_title(metadata.title().to_string());
    tag.set_artist(metadata.artists().to_string());
    tag.set_album(metadata.album().to_string());
    tag.set_genre(metadata.genre().to_string());
    // A generic recording date becomes a text TDRC, which the v2.3 writer drops.
    tag.insert(Frame::Text(TextInformationFrame::new(
        YEAR_FRAME,
        TextEncoding::UTF8,
        metadata.date().to_string(),
    )));

    if let Some(cover) = cover {
        tag.insert_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(mime_type(cover.mime())),
            None,
            cover.data().to_vec(),
        ));
    }

    tag.save_to_path(path, WriteOptions::default().use_id3v23(true))
        .map_err(write_error)?;

    debug!(path = %path.display(), with_cover = cover.is_some(), "tags embedded");
    Ok(())
}

fn mime_type(mime: &str) -> MimeType {
    match mime {
        "image/jpeg" | "image/jpg" => MimeType::Jpeg,
        "image/png" => MimeType::Png,
        "image/gif" => MimeType::Gif,
        "image/bmp" => MimeType::Bmp,
        "image/tiff" => MimeType::Tiff,
        other => MimeType::Unknown(other.to_string()),
    }
}

/// Writes a short, valid MPEG-1 Layer III stream so lofty can probe it.
#[cfg(test)]
pub(crate) fn write_silent_mp3(path: &Path) -> std::io::Result<()> {
    // 128 kbps, 44.1 kHz, no padding: 417 bytes per frame.
    const FRAME_LEN: usize = 417;
    let mut bytes = Vec::with_capacity(FRAME_LEN * 16);
    for _ in 0..16 {
        let mut frame = vec![0_u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        bytes.extend_from_slice(&frame);
    }
    std::fs::write(path, bytes)
}
