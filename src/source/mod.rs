//! Where source playlists come from.
//!
//! A conversion only needs an ordered list of `{title, artist, album}`
//! triples. [`SourceRef::parse`] turns the user's input into either an Apple
//! Music catalog reference or a local JSON file, and [`SourceRef::load`]
//! fetches the track list.

mod apple;
mod file;

use std::{path::PathBuf, sync::LazyLock};

use regex::Regex;
use reqwest::Client;

use crate::{
    config,
    error::{SyncError, SyncResult},
    types::SourcePlaylist,
};

pub use apple::{AppleMusicSource, PAGE_LIMIT};
pub use file::load_file;

static APPLE_MUSIC_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:itunes|music)\.apple\.com/([a-z]{2})/.*?(album|playlist).*/([\w.\-]+)")
        .expect("valid apple music url pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Album,
    Playlist,
}

impl CatalogKind {
    /// Path segment of the catalog API.
    pub fn collection(&self) -> &'static str {
        match self {
            CatalogKind::Album => "albums",
            CatalogKind::Playlist => "playlists",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    AppleMusic {
        storefront: String,
        kind: CatalogKind,
        id: String,
    },
    File(PathBuf),
}

impl SourceRef {
    pub fn parse(input: &str) -> SyncResult<Self> {
        let input = input.trim();
        if input.starts_with("http://") || input.starts_with("https://") {
            let without_query = input.split(['?', '#']).next().unwrap_or(input);
            let caps = APPLE_MUSIC_URL
                .captures(without_query)
                .ok_or_else(|| SyncError::source(format!("unsupported playlist url {input}")))?;
            let kind = match &caps[2] {
                "album" => CatalogKind::Album,
                _ => CatalogKind::Playlist,
            };
            return Ok(SourceRef::AppleMusic {
                storefront: caps[1].to_string(),
                kind,
                id: caps[3].to_string(),
            });
        }

        let path = PathBuf::from(input);
        if path.is_file() {
            Ok(SourceRef::File(path))
        } else {
            Err(SyncError::source(format!(
                "{input} is neither an Apple Music url nor a readable file"
            )))
        }
    }

    pub async fn load(&self, http: &Client) -> SyncResult<SourcePlaylist> {
        match self {
            SourceRef::AppleMusic {
                storefront,
                kind,
                id,
            } => {
                let source = AppleMusicSource::new(
                    http.clone(),
                    config::apple_music_apiurl(),
                    config::apple_music_token()?,
                );
                let tracks = source.fetch_tracks(storefront, *kind, id).await?;
                Ok(SourcePlaylist { name: None, tracks })
            }
            SourceRef::File(path) => load_file(path).await,
        }
    }
}
