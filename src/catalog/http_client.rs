//! Shared HTTP client construction policy for the catalog.
//!
//! Centralizes timeout, user-agent and compression defaults so every catalog
//! request behaves the same.

use std::time::Duration;

use reqwest::Client;

use crate::user_agent;

use super::CatalogError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Builds the catalog HTTP client.
///
/// # Errors
///
/// Returns [`CatalogError::ClientBuild`] when the TLS backend or proxy
/// configuration cannot be initialized.
pub(crate) fn build_catalog_http_client() -> Result<Client, CatalogError> {
    Client::builder()
        .user_agent(user_agent::default_catalog_user_agent())
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .read_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .gzip(true)
        .build()
        .map_err(|source| CatalogError::ClientBuild { source })
}
