//! Shared User-Agent strings for catalog and cover-art HTTP clients.

/// Default User-Agent for catalog API requests.
#[must_use]
pub(crate) fn default_catalog_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("playlist-sync/{version} (catalog-client)")
}

/// Default User-Agent for cover-art fetches.
#[must_use]
pub(crate) fn default_cover_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("playlist-sync/{version} (cover-art)")
}
