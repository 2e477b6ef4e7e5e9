use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One entry of the source playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, album: impl Into<String>) -> Self {
        Track {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePlaylist {
    pub name: Option<String>,
    pub tracks: Vec<Track>,
}

/// A destination search hit. `id` is the track URI used for playlist writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub artist_names: Vec<String>,
    pub popularity: u32,
}

impl From<SearchTrack> for Candidate {
    fn from(track: SearchTrack) -> Self {
        Candidate {
            id: track.uri,
            name: track.name,
            artist_names: track.artists.into_iter().map(|a| a.name).collect(),
            popularity: track.popularity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Authorization-code session of the user who owns the destination playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    pub fn user_session(&self) -> UserSession {
        UserSession {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: SearchTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracks {
    #[serde(default)]
    pub items: Vec<SearchTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTrack {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SearchArtist>,
    #[serde(default)]
    pub popularity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppleTracksPage {
    #[serde(default)]
    pub data: Vec<AppleTrack>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppleTrack {
    pub attributes: AppleTrackAttributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleTrackAttributes {
    pub name: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub album_name: String,
}

impl From<AppleTrack> for Track {
    fn from(track: AppleTrack) -> Self {
        let attrs = track.attributes;
        Track {
            title: attrs.name,
            artist: attrs.artist_name,
            album: attrs.album_name,
        }
    }
}

#[derive(Tabled)]
pub struct UnresolvedTableRow {
    pub position: usize,
    pub title: String,
    pub artist: String,
    pub reason: String,
}

/// Authorization in progress, shared between the consent flow and the
/// callback handler.
#[derive(Debug, Clone, Default)]
pub struct PendingAuthorization {
    pub state: String,
    pub code: Option<String>,
    pub error: Option<String>,
}
