//! The destination directory: naming, tags, and presence checks.
//!
//! # Architecture
//!
//! - [`filename`] - Canonical and temporary names derived from artist + title
//! - [`tags`] - ID3v2 read / embed via lofty
//! - [`cover`] - Cover art download for embedding

pub mod cover;
pub mod filename;
pub mod tags;

pub use cover::{CoverArt, DEFAULT_COVER_TIMEOUT, build_cover_http_client, fetch_cover};
pub use filename::{canonical_name, canonical_path, sanitize_component, temp_stem};
pub use tags::{EmbeddedTags, TagError, embed_tags, read_tags};

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::metadata::TrackMetadata;

/// True only when the canonical file for `metadata` exists in `dir` and its
/// embedded title, artist and album equal the metadata exactly.
///
/// Unreadable or untagged files count as absent.
#[must_use]
pub fn track_exists(dir: &Path, metadata: &TrackMetadata) -> bool {
    let path = canonical_path(dir, metadata);
    if !path.is_file() {
        return false;
    }
    match read_tags(&path) {
        Ok(tags) => {
            let matches = tags.matches(metadata);
            if !matches {
                debug!(path = %path.display(), ?tags, "existing file has different tags");
            }
            matches
        }
        Err(error) => {
            debug!(path = %path.display(), error = %error, "existing file tags unreadable");
            false
        }
    }
}

/// Lists leftovers of interrupted acquisitions (`temp_*` files) in `dir`.
///
/// # Errors
///
/// Returns the I/O error when `dir` cannot be listed.
pub fn stale_temp_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut stale = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_temp = entry
            .file_name()
            .to_str()
            .is_some_and(filename::is_temp_name);
        if is_temp && entry.file_type()?.is_file() {
            stale.push(entry.path());
        }
    }
    stale.sort();
    Ok(stale)
}
