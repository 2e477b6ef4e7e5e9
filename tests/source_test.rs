use std::fs;

use reqwest::Client;
use serde_json::json;
use tuneport::{
    error::SyncError,
    source::{AppleMusicSource, CatalogKind, SourceRef, load_file},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

fn apple_track(name: &str, artist: &str) -> serde_json::Value {
    json!({
        "id": name,
        "type": "songs",
        "attributes": { "name": name, "artistName": artist, "albumName": "Album" }
    })
}

#[tokio::test]
async fn test_apple_music_follows_next_pages() {
    let server = MockServer::start().await;
    let tracks_path = "/v1/catalog/us/playlists/pl.abc/tracks";

    Mock::given(method("GET"))
        .and(path(tracks_path))
        .and(query_param("offset", "2"))
        .and(query_param("limit", "300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [apple_track("Three", "C")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(tracks_path))
        .and(query_param("limit", "300"))
        .and(header("authorization", "Bearer dev-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [apple_track("One", "A"), apple_track("Two", "B")],
            "next": format!("{tracks_path}?offset=2"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = AppleMusicSource::new(Client::new(), server.uri(), "dev-token");
    let tracks = source
        .fetch_tracks("us", CatalogKind::Playlist, "pl.abc")
        .await
        .unwrap();

    let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
    assert_eq!(tracks[1].artist, "B");
    assert_eq!(tracks[2].album, "Album");
}

#[tokio::test]
async fn test_apple_music_error_is_source_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/catalog/us/albums/123/tracks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = AppleMusicSource::new(Client::new(), server.uri(), "dev-token");
    let result = source.fetch_tracks("us", CatalogKind::Album, "123").await;

    assert!(matches!(result, Err(SyncError::Source { .. })));
}

#[tokio::test]
async fn test_load_file_uses_stem_as_name() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Road Trip.json");
    fs::write(
        &file,
        r#"[
            {"title": "One", "artist": "A", "album": "X"},
            {"title": "Two", "artist": "B"}
        ]"#,
    )
    .unwrap();

    let playlist = load_file(&file).await.unwrap();

    assert_eq!(playlist.name.as_deref(), Some("Road Trip"));
    assert_eq!(playlist.tracks.len(), 2);
    assert_eq!(playlist.tracks[1].album, "");
}

#[tokio::test]
async fn test_load_file_rejects_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.json");
    fs::write(&file, r#"{"title": "not a list"}"#).unwrap();

    let result = load_file(&file).await;

    assert!(matches!(result, Err(SyncError::Source { .. })));
}

#[tokio::test]
async fn test_source_ref_loads_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("mix.json");
    fs::write(&file, r#"[{"title": "One", "artist": "A"}]"#).unwrap();

    let source = SourceRef::parse(file.to_str().unwrap()).unwrap();
    assert_eq!(source, SourceRef::File(file.clone()));

    let playlist = source.load(&Client::new()).await.unwrap();
    assert_eq!(playlist.name.as_deref(), Some("mix"));
}

#[test]
fn test_source_ref_rejects_unknown_input() {
    assert!(SourceRef::parse("https://example.com/playlist/1").is_err());
    assert!(SourceRef::parse("/does/not/exist.json").is_err());
}
