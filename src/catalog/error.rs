//! Error types for the catalog client.
//!
//! Variants carry the URL or credential name they relate to, so log lines
//! and setup-failure messages are actionable without extra context.

use thiserror::Error;

/// Errors that can occur while talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required credential is absent from the environment.
    #[error(
        "missing catalog credential {variable}\n  Suggestion: set {variable} in the environment or in a .env file"
    )]
    MissingCredentials {
        /// Name of the environment variable that is unset or empty.
        variable: &'static str,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response not covered by a more specific variant.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The Retry-After header value, if present (for 429 responses).
        retry_after: Option<String>,
    },

    /// The catalog rejected the credentials or the access token.
    #[error(
        "[AUTH] catalog rejected credentials (HTTP {status}) requesting {url}\n  Suggestion: check SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET"
    )]
    Auth {
        /// The URL that was rejected.
        url: String,
        /// The HTTP status code (400 from the token endpoint, 401 or 403 from the API).
        status: u16,
    },

    /// The requested resource does not exist (or is private).
    #[error("not found: {url}\n  Suggestion: check that the playlist exists and is public")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The response body did not match the expected JSON shape.
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A page reference points outside the configured API base.
    #[error("refusing to follow page reference outside the catalog API: {url}")]
    ForeignPageUrl {
        /// The rejected page URL.
        url: String,
    },

    /// HTTP client construction failed.
    #[error("failed to build catalog HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl CatalogError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Maps a non-success status to the most specific variant.
    pub fn from_status(url: impl Into<String>, status: u16, retry_after: Option<String>) -> Self {
        let url = url.into();
        match status {
            401 | 403 => Self::Auth { url, status },
            404 => Self::NotFound { url },
            _ => Self::HttpStatus {
                url,
                status,
                retry_after,
            },
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Returns the raw Retry-After header value, when the server sent one.
    #[must_use]
    pub fn retry_after(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { retry_after, .. } => retry_after.as_deref(),
            _ => None,
        }
    }

    /// True for a 401 from the API, i.e. an access token that went stale.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Auth { status: 401, .. })
    }
}
