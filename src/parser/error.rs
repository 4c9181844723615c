//! Error types for playlist input parsing.

use thiserror::Error;

/// Maximum input length to accept (standard browser URL limit).
pub const MAX_INPUT_LENGTH: usize = 2000;

/// Errors that can occur while extracting a playlist identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input is not a usable playlist URL or URI
    #[error("invalid playlist URL '{input}': {reason}\n  Suggestion: {suggestion}")]
    InvalidPlaylistUrl {
        /// The input that failed validation
        input: String,
        /// Why the input is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// Input exceeds maximum allowed length
    #[error("input too long ({length} chars, max {max}): {preview}...")]
    TooLong {
        /// Truncated input for display
        preview: String,
        /// Actual length
        length: usize,
        /// Maximum allowed
        max: usize,
    },
}

impl ParseError {
    /// Creates an error for input that does not parse as a URL at all.
    #[must_use]
    pub fn malformed(input: &str, parse_error: &str) -> Self {
        Self::InvalidPlaylistUrl {
            input: input.to_string(),
            reason: parse_error.to_string(),
            suggestion: "Copy the playlist link via Share > Copy link to playlist".to_string(),
        }
    }

    /// Creates an error for a URL using a scheme other than http(s).
    #[must_use]
    pub fn unsupported_scheme(input: &str, scheme: &str) -> Self {
        Self::InvalidPlaylistUrl {
            input: input.to_string(),
            reason: format!("scheme '{scheme}' is not supported"),
            suggestion: "Use an https:// playlist link or a spotify:playlist: URI".to_string(),
        }
    }

    /// Creates an error for a URL without a `/playlist/<id>` path.
    #[must_use]
    pub fn not_a_playlist(input: &str) -> Self {
        Self::InvalidPlaylistUrl {
            input: input.to_string(),
            reason: "URL does not contain a /playlist/<id> path".to_string(),
            suggestion: "Album, artist and track links are not supported; use a playlist link"
                .to_string(),
        }
    }

    /// Creates an error for an identifier with characters outside base-62.
    #[must_use]
    pub fn invalid_id(input: &str, id: &str) -> Self {
        Self::InvalidPlaylistUrl {
            input: input.to_string(),
            reason: format!("'{id}' is not a valid playlist id"),
            suggestion: "Playlist ids contain only letters and digits".to_string(),
        }
    }

    /// Creates a `TooLong` error for oversized input.
    #[must_use]
    pub fn too_long(input: &str) -> Self {
        Self::TooLong {
            preview: input.chars().take(50).collect(),
            length: input.len(),
            max: MAX_INPUT_LENGTH,
        }
    }
}
