//! Catalog service client.
//!
//! The sync pipeline only needs three questions answered by the remote
//! catalog: the tracks of a playlist (page by page), and the genre tags of an
//! artist or an album. [`Catalog`] is that seam; [`SpotifyCatalog`] is the
//! production implementation over the Spotify Web API.
//!
//! # Architecture
//!
//! - [`Catalog`] - Async trait the enumerator and metadata resolver consume
//! - [`SpotifyCatalog`] - Client-credentials auth, pagination, genre lookups
//! - [`RetryPolicy`] - Exponential backoff for 429 / 5xx / network failures
//! - [`CatalogError`] - Structured errors with actionable suggestions

mod dto;
mod error;
mod http_client;
mod retry;
mod spotify;

pub use dto::{RawAlbum, RawArtist, RawImage, RawTrack};
pub use error::CatalogError;
pub use retry::{
    DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy, classify_error,
    parse_retry_after,
};
pub use spotify::{DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL, SpotifyCatalog};

use std::fmt;

use async_trait::async_trait;

use crate::parser::PlaylistId;

/// Environment variable holding the catalog client id.
pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";

/// Environment variable holding the catalog client secret.
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";

/// Opaque reference to the next page of a playlist, as handed out by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef(String);

impl PageRef {
    /// Wraps a page reference returned by the service.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Returns the reference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of playlist items.
///
/// `None` entries stand for null items or items without a track; they are
/// kept so callers can count them but never produce metadata.
#[derive(Debug, Clone, Default)]
pub struct TrackPage {
    pub items: Vec<Option<RawTrack>>,
    pub next: Option<PageRef>,
}

/// Read access to the remote catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches one page of playlist items. `page` is `None` for the first page.
    async fn playlist_track_page(
        &self,
        playlist: &PlaylistId,
        page: Option<&PageRef>,
    ) -> Result<TrackPage, CatalogError>;

    /// Genre tags of an artist, most relevant first (possibly empty).
    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, CatalogError>;

    /// Genre tags of an album, most relevant first (possibly empty).
    async fn album_genres(&self, album_id: &str) -> Result<Vec<String>, CatalogError>;
}

/// Client-credentials pair for the catalog API.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Creates credentials from explicit values.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Reads credentials from [`CLIENT_ID_VAR`] and [`CLIENT_SECRET_VAR`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingCredentials`] naming the first variable
    /// that is unset or blank.
    pub fn from_env() -> Result<Self, CatalogError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CatalogError> {
        let read = |variable: &'static str| {
            lookup(variable)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(CatalogError::MissingCredentials { variable })
        };
        Ok(Self {
            client_id: read(CLIENT_ID_VAR)?,
            client_secret: read(CLIENT_SECRET_VAR)?,
        })
    }

    pub(crate) fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
