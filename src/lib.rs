//! Playlist Sync Core Library
//!
//! This library synchronizes a remote playlist into a flat directory of
//! tagged MP3 files. Every track is fetched at most once per destination,
//! tagged with catalog metadata, and committed under a deterministic
//! `"{Artist} - {Title}.mp3"` name.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Playlist URL / URI parsing into a [`PlaylistId`]
//! - [`catalog`] - Catalog service client (Spotify Web API) with retry
//! - [`metadata`] - Raw catalog record to complete [`TrackMetadata`]
//! - [`playlist`] - Paginated playlist enumeration
//! - [`library`] - Destination directory: filenames, tags, idempotency check
//! - [`acquire`] - Audio acquisition backend and the atomic commit pipeline
//! - [`sync`] - Batch driver with pacing and per-item failure isolation
//! - [`config`] - File configuration and settings resolution

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod acquire;
pub mod catalog;
pub mod config;
pub mod library;
pub mod metadata;
pub mod parser;
pub mod playlist;
pub mod sync;

mod user_agent;

// Re-export commonly used types
pub use acquire::{
    AcquireError, AcquireOutcome, AudioBackend, BackendSettings, FetchRequest, YtDlpBackend,
    acquire_and_commit,
};
pub use catalog::{
    Catalog, CatalogError, Credentials, RetryPolicy, SpotifyCatalog, TrackPage,
};
pub use config::{ConfigError, FileConfig, Overrides, RunSettings, load_config};
pub use library::{canonical_name, canonical_path, track_exists};
pub use metadata::{DEFAULTS, MetadataDefaults, TrackMetadata, resolve_track};
pub use parser::{ParseError, PlaylistId, parse_playlist_id};
pub use playlist::enumerate;
pub use sync::{SyncEngine, SyncError, SyncSettings, SyncStats, SyncSummary};
