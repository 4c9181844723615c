//! Genre fallback chain: primary artist, then album.

use tracing::{debug, warn};

use crate::catalog::{Catalog, CatalogError, RawTrack};

/// Looks up the genre of `raw`, capitalized.
///
/// Asks the catalog for the primary artist's genres first and the album's
/// genres second. Returns `None` when neither has any, when the record lacks
/// the ids needed for the lookups, or when a lookup fails; the caller then
/// substitutes the default genre.
pub async fn resolve_genre(catalog: &dyn Catalog, raw: &RawTrack) -> Option<String> {
    match lookup_chain(catalog, raw).await {
        Ok(Some(genre)) => Some(capitalize_genre(&genre)),
        Ok(None) => {
            debug!("no genre tags for track");
            None
        }
        Err(error) => {
            warn!(error = %error, "genre lookup failed, using default");
            None
        }
    }
}

async fn lookup_chain(
    catalog: &dyn Catalog,
    raw: &RawTrack,
) -> Result<Option<String>, CatalogError> {
    let Some(artist_id) = raw
        .artists
        .as_deref()
        .and_then(<[_]>::first)
        .and_then(|artist| artist.id.as_deref())
    else {
        debug!("primary artist has no catalog id, skipping genre lookup");
        return Ok(None);
    };

    if let Some(genre) = first_tag(catalog.artist_genres(artist_id).await?) {
        return Ok(Some(genre));
    }

    let Some(album_id) = raw.album.as_ref().and_then(|album| album.id.as_deref()) else {
        return Ok(None);
    };
    Ok(first_tag(catalog.album_genres(album_id).await?))
}

/// First non-blank tag. Blank entries are passed over rather than taken as
/// the genre, so a list like `["", "rock"]` yields `rock`.
fn first_tag(genres: Vec<String>) -> Option<String> {
    genres.into_iter().find(|genre| !genre.trim().is_empty())
}

/// Upper-cases the first character and lower-cases the rest. Surrounding
/// whitespace is trimmed first.
#[must_use]
pub fn capitalize_genre(genre: &str) -> String {
    let mut chars = genre.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::{PageRef, TrackPage};
    use crate::parser::PlaylistId;

    struct ScriptedCatalog {
        artist: Vec<String>,
        album: Vec<String>,
        album_calls: AtomicUsize,
    }

    impl ScriptedCatalog {
        fn new(artist: &[&str], album: &[&str]) -> Self {
            Self {
                artist: artist.iter().map(ToString::to_string).collect(),
                album: album.iter().map(ToString::to_string).collect(),
                album_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Catalog for ScriptedCatalog {
        async fn playlist_track_page(
            &self,
            _playlist: &PlaylistId,
            _page: Option<&PageRef>,
        ) -> Result<TrackPage, CatalogError> {
            Ok(TrackPage::default())
        }

        async fn artist_genres(&self, _artist_id: &str) -> Result<Vec<String>, CatalogError> {
            Ok(self.artist.clone())
        }

        async fn album_genres(&self, _album_id: &str) -> Result<Vec<String>, CatalogError> {
            self.album_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.album.clone())
        }
    }

    fn track() -> RawTrack {
        serde_json::from_str(r#"{"artists": [{"id": "a"}], "album": {"id": "b"}}"#).unwrap()
    }

    #[test]
    fn test_capitalize_genre() {
        assert_eq!(capitalize_genre("hip hop"), "Hip hop");
        assert_eq!(capitalize_genre("ROCK"), "Rock");
        assert_eq!(capitalize_genre("élan"), "Élan");
        assert_eq!(capitalize_genre(""), "");
    }

    #[tokio::test]
    async fn test_artist_genres_win_over_album() {
        let catalog = ScriptedCatalog::new(&["synthwave"], &["pop"]);
        assert_eq!(
            resolve_genre(&catalog, &track()).await.as_deref(),
            Some("Synthwave")
        );
        assert_eq!(catalog.album_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_album_genres_used_when_artist_has_none() {
        let catalog = ScriptedCatalog::new(&[], &["dream pop", "shoegaze"]);
        assert_eq!(
            resolve_genre(&catalog, &track()).await.as_deref(),
            Some("Dream pop")
        );
    }

    #[tokio::test]
    async fn test_blank_leading_tag_is_passed_over() {
        let catalog = ScriptedCatalog::new(&["  ", " indie folk "], &["pop"]);
        assert_eq!(
            resolve_genre(&catalog, &track()).await.as_deref(),
            Some("Indie folk")
        );
    }

    #[tokio::test]
    async fn test_no_tags_anywhere_is_none() {
        let catalog = ScriptedCatalog::new(&[], &[]);
        assert!(resolve_genre(&catalog, &track()).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_artist_id_skips_lookup() {
        let catalog = ScriptedCatalog::new(&["rock"], &["pop"]);
        let raw: RawTrack = serde_json::from_str(r#"{"artists": [{"name": "A"}]}"#).unwrap();
        assert!(resolve_genre(&catalog, &raw).await.is_none());
        assert_eq!(catalog.album_calls.load(Ordering::SeqCst), 0);
    }
}
