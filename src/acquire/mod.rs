//! Acquire-and-commit pipeline for one track.
//!
//! The backend writes audio under a `temp_` name in the destination
//! directory. Only after tags are embedded is the file renamed to its
//! canonical name, so a canonical path never holds a partial file. On any
//! failure the temporary output (and a final file, should one have appeared)
//! is removed and the track is left for the next run.
//!
//! # Architecture
//!
//! - [`AudioBackend`] - Produces an audio file for a search query
//! - [`YtDlpBackend`] - Production backend over the `yt-dlp` executable
//! - [`acquire_and_commit`] - Fetch, tag, rename, clean up

mod error;
mod ytdlp;

pub use error::AcquireError;
pub use ytdlp::{BackendSettings, YtDlpBackend};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::library::{canonical_path, embed_tags, fetch_cover, filename, temp_stem};
use crate::metadata::TrackMetadata;

/// What the backend should fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Free-text search query.
    pub query: String,
    pub output_dir: PathBuf,
    /// File stem (no extension) the output must use.
    pub temp_stem: String,
}

impl FetchRequest {
    /// Request for `metadata` into `dir`: `"{title} lyrics explicit {artists}"`.
    #[must_use]
    pub fn for_track(dir: &Path, metadata: &TrackMetadata) -> Self {
        Self {
            query: format!(
                "{} lyrics explicit {}",
                metadata.title(),
                metadata.artists()
            ),
            output_dir: dir.to_path_buf(),
            temp_stem: temp_stem(metadata.artists(), metadata.title()),
        }
    }

    /// Where the MP3 lands when the backend does not report a path.
    #[must_use]
    pub fn expected_output(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            self.temp_stem,
            filename::AUDIO_EXTENSION
        ))
    }
}

/// Produces an MP3 for a search query.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Fetches audio for `request`, returning the path of the produced file.
    async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf, AcquireError>;
}

/// Result of one acquisition attempt.
#[derive(Debug)]
pub enum AcquireOutcome {
    /// A file already sits at the canonical path; nothing was done.
    AlreadyPresent,
    /// The track was fetched, tagged and renamed into place.
    Committed(PathBuf),
    /// The attempt failed and its partial files were removed.
    Failed(AcquireError),
}

/// Fetches, tags and commits one track into `dir`. Never returns an error;
/// failures come back as [`AcquireOutcome::Failed`].
#[instrument(skip_all, fields(title = %metadata.title(), artists = %metadata.artists()))]
pub async fn acquire_and_commit(
    dir: &Path,
    metadata: &TrackMetadata,
    backend: &dyn AudioBackend,
    covers: &Client,
) -> AcquireOutcome {
    let final_path = canonical_path(dir, metadata);
    if tokio::fs::try_exists(&final_path).await.unwrap_or(false) {
        debug!(path = %final_path.display(), "canonical path already taken");
        return AcquireOutcome::AlreadyPresent;
    }

    let request = FetchRequest::for_track(dir, metadata);
    match fetch_tag_commit(&request, &final_path, metadata, backend, covers).await {
        Ok(()) => {
            info!(path = %final_path.display(), "track committed");
            AcquireOutcome::Committed(final_path)
        }
        Err(error) => {
            warn!(error = %error, "acquisition failed");
            remove_partial_files(&request, &final_path).await;
            AcquireOutcome::Failed(error)
        }
    }
}

async fn fetch_tag_commit(
    request: &FetchRequest,
    final_path: &Path,
    metadata: &TrackMetadata,
    backend: &dyn AudioBackend,
    covers: &Client,
) -> Result<(), AcquireError> {
    let produced = backend.fetch(request).await?;
    if !tokio::fs::try_exists(&produced).await.unwrap_or(false) {
        return Err(AcquireError::MissingOutput {
            query: request.query.clone(),
            expected: produced,
        });
    }

    let cover = match metadata.cover_image_url() {
        Some(url) => fetch_cover(covers, url).await,
        None => None,
    };

    let tag_path = produced.clone();
    let tag_metadata = metadata.clone();
    tokio::task::spawn_blocking(move || embed_tags(&tag_path, &tag_metadata, cover.as_ref()))
        .await
        .map_err(|join_error| AcquireError::Io {
            path: produced.clone(),
            source: std::io::Error::other(join_error),
        })??;

    tokio::fs::rename(&produced, final_path)
        .await
        .map_err(|source| AcquireError::Io {
            path: final_path.to_path_buf(),
            source,
        })
}

/// Removes the files this attempt wrote under its temp stem and the
/// canonical file, if present.
async fn remove_partial_files(request: &FetchRequest, final_path: &Path) {
    let mut doomed = vec![final_path.to_path_buf()];

    match tokio::fs::read_dir(&request.output_dir).await {
        Ok(mut entries) => loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let stem = request.temp_stem.as_str();
                    let matches = entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| filename::is_attempt_file(stem, name));
                    if matches {
                        doomed.push(entry.path());
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    warn!(error = %error, "could not finish listing destination for cleanup");
                    break;
                }
            }
        },
        Err(error) => warn!(error = %error, "could not list destination for cleanup"),
    }

    for path in doomed {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "removed partial file"),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => warn!(path = %path.display(), error = %error, "could not remove partial file"),
        }
    }
}
