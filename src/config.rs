//! Configuration management for tuneport.
//!
//! Values come from environment variables. Before anything reads them,
//! [`load_env`] merges a `.env` file from the local data directory into the
//! process environment, so the lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::{error::SyncError, types::Credentials};

pub const APP_DIR: &str = "tuneport";

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_APPLE_API_URL: &str = "https://api.music.apple.com";
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory structure if it doesn't exist. The file is looked up in:
/// - Linux: `~/.local/share/tuneport/.env`
/// - macOS: `~/Library/Application Support/tuneport/.env`
/// - Windows: `%LOCALAPPDATA%/tuneport/.env`
///
/// A missing `.env` file is fine: the process environment alone may carry
/// every value.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an existing `.env`
/// file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Root of every file tuneport keeps locally (logs, token cache, `.env`).
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn required(key: &'static str) -> Result<String, SyncError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(SyncError::Config { key })
}

fn optional(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Returns the Spotify API client ID (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, SyncError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret (`SPOTIFY_API_AUTH_CLIENT_SECRET`).
///
/// The secret is used for both the client-credentials grant and the
/// authorization-code exchange. It is never written to logs.
pub fn spotify_client_secret() -> Result<String, SyncError> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Returns the OAuth redirect URI. Must match the URI registered in the
/// Spotify application settings.
pub fn spotify_redirect_uri() -> String {
    optional("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

pub fn spotify_scope() -> String {
    optional("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

/// Returns the Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Returns the Spotify accounts service base URL. Token exchange happens at
/// `{accounts}/api/token` and the consent page lives at `{accounts}/authorize`.
pub fn spotify_accounts_url() -> String {
    optional("SPOTIFY_ACCOUNTS_URL", DEFAULT_ACCOUNTS_URL)
}

/// Address the local OAuth callback server binds to.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

pub fn apple_music_apiurl() -> String {
    optional("APPLE_MUSIC_API_URL", DEFAULT_APPLE_API_URL)
}

/// Developer token for the Apple Music catalog API. Only needed when the
/// source playlist is an Apple Music URL.
pub fn apple_music_token() -> Result<String, SyncError> {
    required("APPLE_MUSIC_DEVELOPER_TOKEN")
}

/// Number of tracks resolved at the same time (`TUNEPORT_CONCURRENCY`).
pub fn concurrency() -> usize {
    env::var("TUNEPORT_CONCURRENCY")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_CONCURRENCY)
}

/// Base URLs of the destination service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyEndpoints {
    pub api_url: String,
    pub accounts_url: String,
}

impl SpotifyEndpoints {
    pub fn new(api_url: impl Into<String>, accounts_url: impl Into<String>) -> Self {
        SpotifyEndpoints {
            api_url: trim_slash(api_url.into()),
            accounts_url: trim_slash(accounts_url.into()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(spotify_apiurl(), spotify_accounts_url())
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_url)
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_url)
    }
}

impl Default for SpotifyEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_ACCOUNTS_URL)
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub redirect_uri: String,
    pub scope: String,
    pub server_addr: String,
}

impl OAuthSettings {
    /// Route the callback server listens on, taken from the redirect URI so
    /// both always agree.
    pub fn callback_path(&self) -> Result<String, SyncError> {
        let url = reqwest::Url::parse(&self.redirect_uri).map_err(|_| SyncError::Config {
            key: "SPOTIFY_API_REDIRECT_URI",
        })?;
        Ok(url.path().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub endpoints: SpotifyEndpoints,
    pub oauth: OAuthSettings,
    pub concurrency: usize,
}

impl Settings {
    /// Collects everything a conversion run needs from the environment.
    pub fn from_env() -> Result<Self, SyncError> {
        let oauth = OAuthSettings {
            redirect_uri: spotify_redirect_uri(),
            scope: spotify_scope(),
            server_addr: server_addr(),
        };
        oauth.callback_path()?;

        Ok(Settings {
            credentials: Credentials {
                client_id: spotify_client_id()?,
                client_secret: spotify_client_secret()?,
            },
            endpoints: SpotifyEndpoints::from_env(),
            oauth,
            concurrency: concurrency(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_drop_trailing_slash() {
        let endpoints = SpotifyEndpoints::new("http://api/v1/", "http://accounts/");
        assert_eq!(endpoints.api_url, "http://api/v1");
        assert_eq!(endpoints.token_url(), "http://accounts/api/token");
        assert_eq!(endpoints.authorize_url(), "http://accounts/authorize");
    }

    #[test]
    fn callback_path_follows_redirect_uri() {
        let oauth = OAuthSettings {
            redirect_uri: "http://127.0.0.1:9000/oauth/done?x=1".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            server_addr: "127.0.0.1:9000".to_string(),
        };
        assert_eq!(oauth.callback_path().unwrap(), "/oauth/done");

        let broken = OAuthSettings {
            redirect_uri: "not a url".to_string(),
            ..oauth
        };
        assert!(matches!(
            broken.callback_path(),
            Err(SyncError::Config {
                key: "SPOTIFY_API_REDIRECT_URI"
            })
        ));
    }

    #[test]
    fn default_endpoints_point_at_spotify() {
        let endpoints = SpotifyEndpoints::default();
        assert_eq!(endpoints.api_url, "https://api.spotify.com/v1");
        assert_eq!(endpoints.token_url(), "https://accounts.spotify.com/api/token");
    }
}
