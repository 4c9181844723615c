//! Error types for audio acquisition.

use std::path::PathBuf;

use thiserror::Error;

use crate::library::TagError;

/// Why one track could not be acquired and committed.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The backend could not be launched or reported failure
    #[error("audio backend failed for '{query}': {message}")]
    Backend { query: String, message: String },

    /// The backend finished but the expected file is not there
    #[error("audio backend produced no file for '{query}' (expected {})", expected.display())]
    MissingOutput { query: String, expected: PathBuf },

    /// Metadata could not be embedded into the downloaded file
    #[error(transparent)]
    Tagging(#[from] TagError),

    /// Filesystem error while committing or cleaning up
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AcquireError {
    /// Creates a backend error from a process launch failure.
    #[must_use]
    pub fn launch(query: &str, program: &std::path::Path, source: &std::io::Error) -> Self {
        Self::Backend {
            query: query.to_string(),
            message: format!(
                "could not run {}: {source}\n  Suggestion: install yt-dlp or set yt_dlp_path in the config file",
                program.display()
            ),
        }
    }

    /// Creates a backend error from a non-zero exit, keeping the last stderr line.
    #[must_use]
    pub fn exit(query: &str, code: Option<i32>, stderr: &str) -> Self {
        let detail = stderr
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .unwrap_or("no error output");
        let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        Self::Backend {
            query: query.to_string(),
            message: format!("exited with {code}: {detail}"),
        }
    }
}
