//! Spotify Web API catalog.
//!
//! Authenticates with the client-credentials grant, caches the access token
//! until shortly before it expires, and follows the absolute `next` links the
//! API hands out for playlist pagination.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::parser::PlaylistId;

use super::dto::{RawGenres, RawPlaylistItem, RawToken, RawTrackPage};
use super::http_client::build_catalog_http_client;
use super::retry::{RetryDecision, RetryPolicy, classify_error, parse_retry_after};
use super::{Catalog, CatalogError, Credentials, PageRef, RawTrack, TrackPage};

/// Default Web API base URL.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";

/// Default accounts service base URL (token endpoint).
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Largest page size the playlist items endpoint accepts.
const PAGE_LIMIT: u32 = 100;

/// Tokens are refreshed this long before their advertised expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound on the lifetime the token endpoint may claim.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// [`Catalog`] implementation backed by the Spotify Web API.
pub struct SpotifyCatalog {
    client: Client,
    api_base: String,
    accounts_base: String,
    credentials: Credentials,
    retry_policy: RetryPolicy,
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyCatalog {
    /// Creates a catalog client against the public Spotify endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ClientBuild`] if HTTP client construction fails.
    pub fn new(credentials: Credentials) -> Result<Self, CatalogError> {
        Self::with_base_urls(credentials, DEFAULT_API_URL, DEFAULT_ACCOUNTS_URL)
    }

    /// Creates a catalog client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ClientBuild`] if HTTP client construction fails.
    pub fn with_base_urls(
        credentials: Credentials,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            client: build_catalog_http_client()?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            accounts_base: accounts_base.into().trim_end_matches('/').to_string(),
            credentials,
            retry_policy: RetryPolicy::default(),
            token: Mutex::new(None),
        })
    }

    /// Replaces the retry policy used for every request.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Obtains an access token up front so bad credentials fail the run early.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Auth`] when the credentials are rejected, or a
    /// network error when the accounts service is unreachable.
    pub async fn authenticate(&self) -> Result<(), CatalogError> {
        self.access_token().await.map(|_| ())
    }

    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.with_retry(|| self.request_token()).await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    #[instrument(skip(self), fields(accounts = %self.accounts_base))]
    async fn request_token(&self) -> Result<AccessToken, CatalogError> {
        let url = format!("{}/api/token", self.accounts_base);
        debug!("requesting client-credentials token");

        let response = self
            .client
            .post(&url)
            .basic_auth(
                self.credentials.client_id(),
                Some(self.credentials.client_secret()),
            )
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| CatalogError::network(&url, e))?;

        let status = response.status().as_u16();
        if matches!(status, 400 | 401) {
            return Err(CatalogError::Auth { url, status });
        }
        let raw: RawToken = decode_response(&url, response).await?;

        Ok(AccessToken {
            value: raw.access_token,
            expires_at: token_deadline(Instant::now(), raw.expires_in),
        })
    }

    /// GETs `url` as JSON, refreshing the token once if the API reports it stale.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        match self.with_retry(|| self.get_once(url)).await {
            Err(error) if error.is_unauthorized() => {
                debug!(url, "access token rejected, refreshing once");
                self.invalidate_token().await;
                self.with_retry(|| self.get_once(url)).await
            }
            other => other,
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CatalogError::network(url, e))?;
        decode_response(url, response).await
    }

    async fn with_retry<T, F, Fut>(&self, mut operation: F) -> Result<T, CatalogError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match self
                .retry_policy
                .should_retry(classify_error(&error), attempt)
            {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    let delay = error
                        .retry_after()
                        .and_then(parse_retry_after)
                        .unwrap_or(delay);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "catalog request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt = next_attempt;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(attempt, %reason, "not retrying catalog request");
                    return Err(error);
                }
            }
        }
    }

    fn first_page_url(&self, playlist: &PlaylistId) -> String {
        format!(
            "{}/v1/playlists/{}/tracks?limit={PAGE_LIMIT}&additional_types=track",
            self.api_base,
            urlencoding::encode(playlist.as_str())
        )
    }

    fn checked_page_url<'a>(&self, page: &'a PageRef) -> Result<&'a str, CatalogError> {
        let url = page.as_str();
        let inside_api = url
            .strip_prefix(self.api_base.as_str())
            .is_some_and(|rest| rest.starts_with('/'));
        if inside_api {
            Ok(url)
        } else {
            Err(CatalogError::ForeignPageUrl {
                url: url.to_string(),
            })
        }
    }

    async fn genres(&self, kind: &str, id: &str) -> Result<Vec<String>, CatalogError> {
        let url = format!("{}/v1/{kind}/{}", self.api_base, urlencoding::encode(id));
        let raw: RawGenres = self.get_json(&url).await?;
        Ok(raw.genres.unwrap_or_default())
    }
}

impl std::fmt::Debug for SpotifyCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCatalog")
            .field("api_base", &self.api_base)
            .field("accounts_base", &self.accounts_base)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    #[instrument(skip(self, page), fields(playlist = %playlist, first = page.is_none()))]
    async fn playlist_track_page(
        &self,
        playlist: &PlaylistId,
        page: Option<&PageRef>,
    ) -> Result<TrackPage, CatalogError> {
        let url = match page {
            Some(page) => self.checked_page_url(page)?.to_string(),
            None => self.first_page_url(playlist),
        };

        let raw: RawTrackPage = self.get_json(&url).await?;
        let items = raw
            .items
            .into_iter()
            .enumerate()
            .map(|(index, value)| decode_item(index, value))
            .collect::<Vec<_>>();

        debug!(items = items.len(), has_next = raw.next.is_some(), "fetched playlist page");
        Ok(TrackPage {
            items,
            next: raw.next.map(PageRef::new),
        })
    }

    #[instrument(skip(self))]
    async fn artist_genres(&self, artist_id: &str) -> Result<Vec<String>, CatalogError> {
        self.genres("artists", artist_id).await
    }

    #[instrument(skip(self))]
    async fn album_genres(&self, album_id: &str) -> Result<Vec<String>, CatalogError> {
        self.genres("albums", album_id).await
    }
}

fn decode_item(index: usize, value: serde_json::Value) -> Option<RawTrack> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value::<RawPlaylistItem>(value) {
        Ok(item) => item.track,
        Err(error) => {
            warn!(index, error = %error, "skipping undecodable playlist item");
            None
        }
    }
}

async fn decode_response<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, CatalogError> {
    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        return Err(CatalogError::from_status(url, status.as_u16(), retry_after));
    }

    let body = response
        .text()
        .await
        .map_err(|e| CatalogError::network(url, e))?;
    serde_json::from_str(&body).map_err(|e| CatalogError::decode(url, e))
}

/// Expiry instant for a token issued at `now`, clamped to [`MAX_TOKEN_LIFETIME`].
fn token_deadline(now: Instant, expires_in_secs: u64) -> Instant {
    let lifetime = Duration::from_secs(expires_in_secs).min(MAX_TOKEN_LIFETIME);
    now.checked_add(lifetime).unwrap_or(now)
}
