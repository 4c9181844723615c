//! Per-field extraction from a raw catalog record.

use thiserror::Error;

use crate::catalog::RawTrack;

/// Why a field could not be taken from the catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The field is absent or null
    #[error("track has no {field}")]
    Missing { field: &'static str },

    /// The field is present but carries no usable text
    #[error("track {field} is empty")]
    Empty { field: &'static str },
}

fn non_blank(value: Option<&str>, field: &'static str) -> Result<String, ExtractionError> {
    let value = value.ok_or(ExtractionError::Missing { field })?;
    if value.trim().is_empty() {
        return Err(ExtractionError::Empty { field });
    }
    Ok(value.to_string())
}

/// Track name.
///
/// # Errors
///
/// Returns [`ExtractionError`] when the name is absent or blank.
pub fn extract_title(raw: &RawTrack) -> Result<String, ExtractionError> {
    non_blank(raw.name.as_deref(), "title")
}

/// Non-empty artist names joined with `", "`, in catalog order.
///
/// # Errors
///
/// Returns [`ExtractionError`] when no artist carries a name.
pub fn extract_artists(raw: &RawTrack) -> Result<String, ExtractionError> {
    let artists = raw
        .artists
        .as_deref()
        .ok_or(ExtractionError::Missing { field: "artists" })?;

    let names = artists
        .iter()
        .filter_map(|artist| artist.name.as_deref())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>();

    if names.is_empty() {
        return Err(ExtractionError::Empty { field: "artists" });
    }
    Ok(names.join(", "))
}

/// Album name.
///
/// # Errors
///
/// Returns [`ExtractionError`] when the album or its name is absent or blank.
pub fn extract_album(raw: &RawTrack) -> Result<String, ExtractionError> {
    non_blank(
        raw.album.as_ref().and_then(|album| album.name.as_deref()),
        "album",
    )
}

/// Release year: the first four characters of the album release date.
///
/// # Errors
///
/// Returns [`ExtractionError`] when the release date is absent or empty.
pub fn extract_date(raw: &RawTrack) -> Result<String, ExtractionError> {
    let date = non_blank(
        raw.album
            .as_ref()
            .and_then(|album| album.release_date.as_deref()),
        "release date",
    )?;
    Ok(date.chars().take(4).collect())
}

/// URL of the first album image.
///
/// # Errors
///
/// Returns [`ExtractionError::Missing`] with field `"cover"` when the album
/// lists no image with a URL.
pub fn extract_cover_url(raw: &RawTrack) -> Result<String, ExtractionError> {
    raw.album
        .as_ref()
        .and_then(|album| album.images.as_deref())
        .and_then(<[_]>::first)
        .and_then(|image| image.url.clone())
        .filter(|url| !url.trim().is_empty())
        .ok_or(ExtractionError::Missing { field: "cover" })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawTrack {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_title_missing_and_blank() {
        assert_eq!(
            extract_title(&raw("{}")),
            Err(ExtractionError::Missing { field: "title" })
        );
        assert_eq!(
            extract_title(&raw(r#"{"name": " "}"#)),
            Err(ExtractionError::Empty { field: "title" })
        );
    }

    #[test]
    fn test_extract_artists_skips_unnamed() {
        let track = raw(r#"{"artists": [{"id": "1"}, {"name": "A"}, {"name": "B"}]}"#);
        assert_eq!(extract_artists(&track).unwrap(), "A, B");
    }

    #[test]
    fn test_extract_artists_all_unnamed_is_empty() {
        let track = raw(r#"{"artists": [{"name": ""}]}"#);
        assert_eq!(
            extract_artists(&track),
            Err(ExtractionError::Empty { field: "artists" })
        );
    }

    #[test]
    fn test_extract_date_takes_year_prefix() {
        let track = raw(r#"{"album": {"release_date": "2020-05-01"}}"#);
        assert_eq!(extract_date(&track).unwrap(), "2020");
        let track = raw(r#"{"album": {"release_date": "1987"}}"#);
        assert_eq!(extract_date(&track).unwrap(), "1987");
    }

    #[test]
    fn test_extract_date_empty_release_date() {
        let track = raw(r#"{"album": {"release_date": ""}}"#);
        assert!(extract_date(&track).is_err());
    }

    #[test]
    fn test_extract_cover_url_empty_list() {
        let track = raw(r#"{"album": {"images": []}}"#);
        assert_eq!(
            extract_cover_url(&track),
            Err(ExtractionError::Missing { field: "cover" })
        );
    }
}
