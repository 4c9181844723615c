//! Track metadata resolution.
//!
//! Turns a partial catalog record into a complete [`TrackMetadata`]. Every
//! field goes through its own extractor; whatever an extractor cannot supply
//! is filled from [`MetadataDefaults`] when the builder finishes, so a
//! resolved record never carries an empty string.

mod extract;
mod genre;

pub use extract::{
    ExtractionError, extract_album, extract_artists, extract_cover_url, extract_date,
    extract_title,
};
pub use genre::{capitalize_genre, resolve_genre};

use tracing::{debug, warn};

use crate::catalog::{Catalog, RawTrack};

/// Substitution values for fields the catalog did not supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataDefaults {
    pub title: &'static str,
    pub artists: &'static str,
    pub album: &'static str,
    pub date: &'static str,
    pub genre: &'static str,
}

/// The default values used by the sync pipeline.
pub const DEFAULTS: MetadataDefaults = MetadataDefaults {
    title: "Unknown Title",
    artists: "Unknown Artist",
    album: "Unknown Album",
    date: "Unknown Year",
    genre: "Unknown Genre",
};

/// Complete, immutable description of one track.
///
/// Only built through [`TrackMetadataBuilder`], which guarantees that every
/// string field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    title: String,
    artists: String,
    album: String,
    date: String,
    genre: String,
    cover_image_url: Option<String>,
}

impl TrackMetadata {
    /// Starts a builder with every field unset.
    #[must_use]
    pub fn builder() -> TrackMetadataBuilder {
        TrackMetadataBuilder::default()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Artist names joined with `", "`.
    #[must_use]
    pub fn artists(&self) -> &str {
        &self.artists
    }

    #[must_use]
    pub fn album(&self) -> &str {
        &self.album
    }

    /// Four-digit release year, or the default year text.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub fn genre(&self) -> &str {
        &self.genre
    }

    #[must_use]
    pub fn cover_image_url(&self) -> Option<&str> {
        self.cover_image_url.as_deref()
    }
}

/// Collects resolved fields; unset or blank fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct TrackMetadataBuilder {
    title: Option<String>,
    artists: Option<String>,
    album: Option<String>,
    date: Option<String>,
    genre: Option<String>,
    cover_image_url: Option<String>,
}

impl TrackMetadataBuilder {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn artists(mut self, artists: impl Into<String>) -> Self {
        self.artists = Some(artists.into());
        self
    }

    #[must_use]
    pub fn album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    #[must_use]
    pub fn cover_image_url(mut self, url: impl Into<String>) -> Self {
        self.cover_image_url = Some(url.into());
        self
    }

    /// Finishes the record, substituting `defaults` for missing fields.
    #[must_use]
    pub fn build(self, defaults: &MetadataDefaults) -> TrackMetadata {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        TrackMetadata {
            title: or_default(self.title, defaults.title),
            artists: or_default(self.artists, defaults.artists),
            album: or_default(self.album, defaults.album),
            date: or_default(self.date, defaults.date),
            genre: or_default(self.genre, defaults.genre),
            cover_image_url: self.cover_image_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Resolves one catalog record into complete metadata.
///
/// Field extraction failures and genre lookup errors are logged and replaced
/// by defaults; this function never fails.
pub async fn resolve_track(
    catalog: &dyn Catalog,
    raw: &RawTrack,
    defaults: &MetadataDefaults,
) -> TrackMetadata {
    let mut builder = TrackMetadata::builder();

    builder = match extract_title(raw) {
        Ok(title) => builder.title(title),
        Err(error) => substituted(builder, &error),
    };
    builder = match extract_artists(raw) {
        Ok(artists) => builder.artists(artists),
        Err(error) => substituted(builder, &error),
    };
    builder = match extract_album(raw) {
        Ok(album) => builder.album(album),
        Err(error) => substituted(builder, &error),
    };
    builder = match extract_date(raw) {
        Ok(date) => builder.date(date),
        Err(error) => substituted(builder, &error),
    };
    builder = match extract_cover_url(raw) {
        Ok(url) => builder.cover_image_url(url),
        Err(error) => substituted(builder, &error),
    };
    if let Some(genre) = resolve_genre(catalog, raw).await {
        builder = builder.genre(genre);
    }

    builder.build(defaults)
}

fn substituted(builder: TrackMetadataBuilder, error: &ExtractionError) -> TrackMetadataBuilder {
    // A track without cover art is ordinary; everything else is worth a warning.
    if matches!(error, ExtractionError::Missing { field: "cover" }) {
        debug!(%error, "no cover image");
    } else {
        warn!(%error, "using default value");
    }
    builder
}
