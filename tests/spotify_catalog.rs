//! Integration tests for the Spotify catalog client against a mock server.

use std::time::Duration;

use playlist_sync_core::{CatalogError, Credentials, DEFAULTS, SpotifyCatalog, enumerate, parse_playlist_id};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn catalog_for(server: &MockServer) -> SpotifyCatalog {
    SpotifyCatalog::with_base_urls(Credentials::new("id", "secret"), server.uri(), server.uri())
        .unwrap()
}

fn track(name: &str, artist_id: &str, artist: &str, album_id: &str) -> serde_json::Value {
    json!({
        "track": {
            "type": "track",
            "is_local": false,
            "name": name,
            "artists": [{"id": artist_id, "name": artist}],
            "album": {
                "id": album_id,
                "name": "Album",
                "release_date": "2019-03-01",
                "images": [{"url": "https://img.example/cover.jpg"}]
            }
        }
    })
}

#[tokio::test]
async fn test_enumerate_follows_next_pages_and_resolves_genres() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let second_page = format!(
        "{}/v1/playlists/PL1/tracks?offset=100&limit=100",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/v1/playlists/PL1/tracks"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                track("First", "AR1", "Alpha", "AL1"),
                {"track": {"type": "episode", "name": "Podcast"}},
                null
            ],
            "next": second_page
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/PL1/tracks"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [track("Second", "AR2", "Beta", "AL2")],
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/artists/AR1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"genres": ["synthpop", "pop"]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/AR2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"genres": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/albums/AL2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"genres": ["JAZZ"]})))
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    catalog.authenticate().await.unwrap();
    let playlist = parse_playlist_id("PL1").unwrap();
    let tracks = enumerate(&catalog, &playlist, &DEFAULTS, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title(), "First");
    assert_eq!(tracks[0].artists(), "Alpha");
    assert_eq!(tracks[0].album(), "Album");
    assert_eq!(tracks[0].date(), "2019");
    assert_eq!(tracks[0].genre(), "Synthpop");
    assert_eq!(
        tracks[0].cover_image_url(),
        Some("https://img.example/cover.jpg")
    );
    assert_eq!(tracks[1].title(), "Second");
    assert_eq!(tracks[1].genre(), "Jazz");
}

#[tokio::test]
async fn test_genre_endpoint_failure_uses_default_genre() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/PL1/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [track("Lonely", "AR9", "Gamma", "AL9")],
            "next": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/AR9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let playlist = parse_playlist_id("PL1").unwrap();
    let tracks = enumerate(&catalog, &playlist, &DEFAULTS, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].genre(), "Unknown Genre");
}

#[tokio::test]
async fn test_unknown_playlist_fails_enumeration() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/MISSING/tracks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let playlist = parse_playlist_id("MISSING").unwrap();
    let result = enumerate(&catalog, &playlist, &DEFAULTS, Duration::ZERO).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_bad_credentials_fail_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_client"})),
        )
        .mount(&server)
        .await;

    let catalog = catalog_for(&server);
    let error = catalog.authenticate().await.unwrap_err();

    assert!(matches!(error, CatalogError::Auth { .. }), "got {error:?}");
}
