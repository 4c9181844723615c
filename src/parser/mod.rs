//! Playlist input parsing.
//!
//! Turns what the user pastes on the command line into a [`PlaylistId`].
//!
//! # Accepted Forms
//!
//! - `https://open.spotify.com/playlist/<id>?si=...`
//! - Localized links such as `https://open.spotify.com/intl-de/playlist/<id>`
//! - `spotify:playlist:<id>` URIs
//! - A bare `<id>`
//!
//! # Example
//!
//! ```
//! use playlist_sync_core::parser::parse_playlist_id;
//!
//! let id = parse_playlist_id("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=x")
//!     .unwrap();
//! assert_eq!(id.as_str(), "37i9dQZF1DXcBWIGoYBM5M");
//! ```

mod error;

pub use error::{MAX_INPUT_LENGTH, ParseError};

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

/// Playlist ids are non-empty base-62 strings.
#[allow(clippy::expect_used)]
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z]{1,64}$").expect("playlist id regex is valid") // Static pattern, safe to panic
});

const URI_PREFIX: &str = "spotify:playlist:";

/// Opaque playlist identifier used to seed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistId(String);

impl PlaylistId {
    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the playlist identifier from a URL, URI or bare id.
///
/// # Errors
///
/// Returns [`ParseError`] when the input is too long, is not an http(s) URL,
/// has no `/playlist/<id>` path, or the id is not base-62.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse_playlist_id(input: &str) -> Result<PlaylistId, ParseError> {
    let trimmed = input.trim();
    if trimmed.len() > MAX_INPUT_LENGTH {
        return Err(ParseError::too_long(trimmed));
    }

    if let Some(rest) = trimmed.strip_prefix(URI_PREFIX) {
        return validate_id(trimmed, rest);
    }

    if ID_PATTERN.is_match(trimmed) {
        return validate_id(trimmed, trimmed);
    }

    let url = Url::parse(trimmed).map_err(|e| ParseError::malformed(trimmed, &e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ParseError::unsupported_scheme(trimmed, url.scheme()));
    }

    let id = url
        .path_segments()
        .and_then(|mut segments| {
            segments.by_ref().find(|segment| *segment == "playlist")?;
            segments.next()
        })
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ParseError::not_a_playlist(trimmed))?;

    validate_id(trimmed, id)
}

fn validate_id(input: &str, id: &str) -> Result<PlaylistId, ParseError> {
    if ID_PATTERN.is_match(id) {
        debug!(playlist_id = id, "parsed playlist id");
        Ok(PlaylistId(id.to_string()))
    } else {
        Err(ParseError::invalid_id(input, id))
    }
}
