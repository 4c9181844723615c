//! Paginated playlist enumeration.

use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::catalog::{Catalog, CatalogError};
use crate::metadata::{MetadataDefaults, TrackMetadata, resolve_track};
use crate::parser::PlaylistId;

/// Default pause after each page request.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(700);

/// Lists every music track of `playlist` in playlist order.
///
/// Pages are requested one after another, sleeping `page_delay` after each.
/// Empty items, podcast episodes and local files are skipped. Metadata for
/// each track is resolved as its page arrives.
///
/// # Errors
///
/// Returns the [`CatalogError`] of the first page request that fails; a
/// partially listed playlist is never returned.
#[instrument(skip(catalog, defaults), fields(playlist = %playlist))]
pub async fn enumerate(
    catalog: &dyn Catalog,
    playlist: &PlaylistId,
    defaults: &MetadataDefaults,
    page_delay: Duration,
) -> Result<Vec<TrackMetadata>, CatalogError> {
    let mut tracks = Vec::new();
    let mut next = None;
    let mut page_number = 0_usize;

    loop {
        let page = catalog
            .playlist_track_page(playlist, next.as_ref())
            .await?;
        page_number += 1;

        for (index, item) in page.items.iter().enumerate() {
            let Some(raw) = item else {
                debug!(page = page_number, index, "skipping empty playlist item");
                continue;
            };
            if !raw.is_catalog_track() {
                debug!(
                    page = page_number,
                    index,
                    kind = raw.kind.as_deref().unwrap_or("unknown"),
                    is_local = raw.is_local,
                    "skipping non-catalog item"
                );
                continue;
            }
            tracks.push(resolve_track(catalog, raw, defaults).await);
        }

        if !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }

        match page.next {
            Some(reference) => next = Some(reference),
            None => break,
        }
    }

    info!(tracks = tracks.len(), pages = page_number, "playlist enumerated");
    Ok(tracks)
}
