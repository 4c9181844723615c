//! Wire types for the Spotify Web API responses the catalog reads.
//!
//! Every field is optional: partial records must still deserialize so the
//! metadata resolver can substitute defaults field by field.

use serde::Deserialize;

/// A track object as embedded in a playlist item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawTrack {
    pub name: Option<String>,
    pub artists: Option<Vec<RawArtist>>,
    pub album: Option<RawAlbum>,
    /// `"track"` or `"episode"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_local: bool,
}

impl RawTrack {
    /// Whether this item is a catalog music track (not an episode or local file).
    #[must_use]
    pub fn is_catalog_track(&self) -> bool {
        !self.is_local && self.kind.as_deref().is_none_or(|kind| kind == "track")
    }
}

/// A simplified artist object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawArtist {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A simplified album object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawAlbum {
    pub id: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub images: Option<Vec<RawImage>>,
}

/// An image reference; the API lists the widest image first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawImage {
    pub url: Option<String>,
}

/// `GET /v1/playlists/{id}/tracks` page, with items left undecoded so that
/// one malformed item cannot fail the whole page.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTrackPage {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    pub next: Option<String>,
}

/// One entry of a playlist page.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPlaylistItem {
    pub track: Option<RawTrack>,
}

/// The `genres` list carried by artist and album objects.
#[derive(Debug, Deserialize)]
pub(crate) struct RawGenres {
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

/// `POST /api/token` response.
#[derive(Debug, Deserialize)]
pub(crate) struct RawToken {
    pub access_token: String,
    pub expires_in: u64,
}
