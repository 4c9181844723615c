//! Deterministic filenames for the destination directory.
//!
//! The canonical name is the only link between a catalog track and the file
//! that stores it, so it must depend on nothing but the artist and title
//! text. Two tracks whose names differ only in stripped characters map to the
//! same file.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::metadata::TrackMetadata;

/// Prefix marking an in-progress acquisition in the destination directory.
pub const TEMP_PREFIX: &str = "temp_";

/// Extension of committed files.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Characters removed from every filename component.
const STRIPPED: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// What the backend appends to a stem: an optional format id or `temp`
/// segment, a media or thumbnail extension, an optional download suffix.
#[allow(clippy::expect_used)]
static ATTEMPT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:f[0-9]+(?:-[0-9A-Za-z]+)?\.|temp\.)?(?:mp3|m4a|webm|opus|ogg|oga|mp4|aac|flac|wav|mka|mkv|3gp|jpg|jpeg|png|webp)(?:\.part(?:-Frag[0-9]+)?|\.ytdl)?$",
    )
    .expect("attempt suffix regex is valid") // Static pattern, safe to panic
});

/// Removes path separators and reserved characters, then trims whitespace.
#[must_use]
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// `"{artists} - {title}.mp3"` with both parts sanitized.
#[must_use]
pub fn canonical_name(artists: &str, title: &str) -> String {
    format!(
        "{} - {}.{AUDIO_EXTENSION}",
        sanitize_component(artists),
        sanitize_component(title)
    )
}

/// Stem (no extension) the acquisition backend writes to before commit.
#[must_use]
pub fn temp_stem(artists: &str, title: &str) -> String {
    format!(
        "{TEMP_PREFIX}{} - {}",
        sanitize_component(artists),
        sanitize_component(title)
    )
}

/// Final location of `metadata` inside `dir`.
#[must_use]
pub fn canonical_path(dir: &Path, metadata: &TrackMetadata) -> PathBuf {
    dir.join(canonical_name(metadata.artists(), metadata.title()))
}

/// Whether `file_name` looks like a leftover of an interrupted acquisition.
#[must_use]
pub fn is_temp_name(file_name: &str) -> bool {
    file_name.starts_with(TEMP_PREFIX)
}

/// Whether `file_name` was written by an acquisition using `stem`.
///
/// Only the shapes the backend produces match, so the files of a track whose
/// title merely continues this one after a dot (`T` vs `T.2`) do not.
#[must_use]
pub fn is_attempt_file(stem: &str, file_name: &str) -> bool {
    file_name
        .strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|suffix| ATTEMPT_SUFFIX.is_match(suffix))
}
