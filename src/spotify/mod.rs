//! # Spotify Integration Module
//!
//! Destination side of a conversion: everything that talks to the Spotify Web
//! API and the Spotify accounts service.
//!
//! ## Architecture
//!
//! ```text
//! sync (fan-out scheduler)
//!          ↓
//! SpotifyClient
//!     ├── search    track resolution and candidate ranking
//!     └── playlist  playlist creation and batched appends
//!          ↓
//! Session (application token + user session)
//!          ↓
//! reqwest → Spotify Web API / accounts service
//! ```
//!
//! ## Modules
//!
//! - [`session`] - Client-credentials token, refresh on expiry, authorization-code exchange
//! - [`auth`] - Interactive consent: browser redirect plus local callback listener
//! - [`search`] - `GET /search` with bounded refresh/backoff and best-match selection
//! - [`playlist`] - `POST /users/{id}/playlists` and `POST /playlists/{id}/tracks`
//!
//! ## Token usage
//!
//! Searches use the application token, which any task may refresh on a 401 or
//! 429. Playlist writes use the user access token, because only the user can
//! own the destination playlist.
//!
//! ## Retry limits
//!
//! No request loops forever. Each loop is bounded by a [`RetryPolicy`]:
//!
//! | Operation       | Retried on                 | Attempts | Backoff                |
//! |-----------------|----------------------------|----------|------------------------|
//! | search          | 401, 429, 5xx, network     | 5        | 250ms doubling, 8s cap |
//! | create playlist | 429                        | 5        | 500ms doubling, 8s cap |
//! | add items       | any non-success, network   | 5        | 2s doubling, 30s cap   |
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client credentials, authorization code, refresh token
//! - `GET /me` - id of the authenticated user
//! - `GET /search?type=track&limit=3` - candidate lookup
//! - `POST /users/{user_id}/playlists` - create the destination playlist
//! - `POST /playlists/{playlist_id}/tracks` - append up to 100 URIs

pub mod auth;
pub mod playlist;
pub mod search;
pub mod session;

use std::sync::Arc;

use crate::retry::RetryPolicy;

pub use playlist::{MAX_BATCH_SIZE, WrittenPlaylist, write_playlist};
pub use search::{SEARCH_LIMIT, pick_best_candidate};
pub use session::Session;

/// Search and playlist operations on top of a shared [`Session`].
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    session: Arc<Session>,
    search_policy: RetryPolicy,
    create_policy: RetryPolicy,
    write_policy: RetryPolicy,
}

impl SpotifyClient {
    pub fn new(session: Arc<Session>) -> Self {
        SpotifyClient {
            session,
            search_policy: RetryPolicy::search(),
            create_policy: RetryPolicy::create(),
            write_policy: RetryPolicy::write(),
        }
    }

    pub fn with_search_policy(mut self, policy: RetryPolicy) -> Self {
        self.search_policy = policy;
        self
    }

    pub fn with_create_policy(mut self, policy: RetryPolicy) -> Self {
        self.create_policy = policy;
        self
    }

    pub fn with_write_policy(mut self, policy: RetryPolicy) -> Self {
        self.write_policy = policy;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.session.endpoints().api_url, path)
    }
}
