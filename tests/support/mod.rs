//! Shared fakes for integration tests: an in-memory catalog, a scripted
//! audio backend and a tiny valid MP3 writer.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use playlist_sync_core::catalog::{PageRef, RawAlbum, RawArtist, RawImage, RawTrack};
use playlist_sync_core::{AcquireError, AudioBackend, Catalog, CatalogError, FetchRequest, TrackPage};
use playlist_sync_core::parser::PlaylistId;

/// Writes 16 silent MPEG-1 Layer III frames (128 kbps, 44.1 kHz).
pub fn write_silent_mp3(path: &Path) -> std::io::Result<()> {
    const FRAME_LEN: usize = 417;
    let mut bytes = Vec::with_capacity(FRAME_LEN * 16);
    for _ in 0..16 {
        let mut frame = vec![0_u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        bytes.extend_from_slice(&frame);
    }
    std::fs::write(path, bytes)
}

/// Builds a catalog track with one artist per `(id, name)` pair.
pub fn raw_track(title: &str, artists: &[(&str, &str)], album: &str, release: &str) -> RawTrack {
    RawTrack {
        name: Some(title.to_string()),
        artists: Some(
            artists
                .iter()
                .map(|(id, name)| RawArtist {
                    id: Some((*id).to_string()),
                    name: Some((*name).to_string()),
                })
                .collect(),
        ),
        album: Some(RawAlbum {
            id: Some(format!("album-{album}")),
            name: Some(album.to_string()),
            release_date: Some(release.to_string()),
            images: Some(Vec::<RawImage>::new()),
        }),
        kind: Some("track".to_string()),
        is_local: false,
    }
}

/// Catalog serving fixed pages and fixed genre tags.
#[derive(Default)]
pub struct MemoryCatalog {
    pages: Vec<Vec<Option<RawTrack>>>,
    artist_genres: HashMap<String, Vec<String>>,
    album_genres: HashMap<String, Vec<String>>,
}

impl MemoryCatalog {
    pub fn with_pages(pages: Vec<Vec<Option<RawTrack>>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn artist_genre(mut self, artist_id: &str, genres: &[&str]) -> Self {
        self.artist_genres.insert(
            artist_id.to_string(),
            genres.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub fn album_genre(mut self, album_id: &str, genres: &[&str]) -> Self {
        self.album_genres.insert(
            album_id.to_string(),
            genres.iter().map(ToString::to_string).collect(),
        );
        self
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn playlist_track_page(
        &self,
        _playlist: &PlaylistId,
        page: Option<&PageRef>,
    ) -> Result<TrackPage, CatalogError> {
        let index = page.map_or(0, |page| page.as_str().parse::<usize>().unwrap_or(0));
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| PageRef::new((index + 1).to_string()));
        Ok(TrackPage { items, next })
    }

    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.artist_genres.get(artist_id).cloned().unwrap_or_default())
    }

    async fn album_genres(&self, album_id: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self.album_genres.get(album_id).cloned().unwrap_or_default())
    }
}

/// Backend that writes a silent MP3 at the expected temp path, except for
/// queries containing one of the failing titles.
#[derive(Default)]
pub struct ScriptedBackend {
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(titles: &[&str]) -> Self {
        Self {
            failing: titles.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioBackend for ScriptedBackend {
    async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf, AcquireError> {
        self.queries.lock().unwrap().push(request.query.clone());

        let output = request.expected_output();
        if self
            .failing
            .iter()
            .any(|title| request.query.starts_with(title.as_str()))
        {
            // Leave a partial file behind so cleanup can be checked.
            std::fs::write(request.output_dir.join(format!("{}.webm", request.temp_stem)), b"part")
                .unwrap();
            return Err(AcquireError::exit(&request.query, Some(1), "ERROR: no results"));
        }

        write_silent_mp3(&output).unwrap();
        Ok(output)
    }
}

/// Names of the regular files in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(ToString::to_string))
        .collect();
    names.sort();
    names
}
