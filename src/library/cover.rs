//! Album cover download.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, warn};

use crate::user_agent;

/// Default whole-request timeout for cover downloads.
pub const DEFAULT_COVER_TIMEOUT: Duration = Duration::from_secs(15);

const FALLBACK_MIME: &str = "image/jpeg";

/// Downloaded cover image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    data: Vec<u8>,
    mime: String,
}

impl CoverArt {
    #[must_use]
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
        }
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }
}

/// Builds the client used for cover downloads, bounded by `timeout`.
///
/// # Errors
///
/// Returns the reqwest builder error when TLS initialization fails.
pub fn build_cover_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent::default_cover_user_agent())
        .timeout(timeout)
        .build()
}

/// Downloads the cover at `url`.
///
/// Returns `None` (after logging) for network errors, non-success statuses,
/// empty bodies and non-image content types. A missing `Content-Type` is
/// treated as JPEG.
#[instrument(skip(http))]
pub async fn fetch_cover(http: &Client, url: &str) -> Option<CoverArt> {
    let response = match http.get(url).send().await {
        Ok(response) => response,
        Err(error) => {
            warn!(error = %error, "cover download failed");
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "cover download returned non-success status");
        return None;
    }

    let mime = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_MIME.to_string());
    if !mime.starts_with("image/") {
        warn!(%mime, "cover response is not an image");
        return None;
    }

    match response.bytes().await {
        Ok(bytes) if bytes.is_empty() => {
            warn!("cover response body is empty");
            None
        }
        Ok(bytes) => {
            debug!(bytes = bytes.len(), %mime, "cover downloaded");
            Some(CoverArt::new(bytes.to_vec(), mime))
        }
        Err(error) => {
            warn!(error = %error, "cover body could not be read");
            None
        }
    }
}
