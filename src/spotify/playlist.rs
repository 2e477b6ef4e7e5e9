use reqwest::StatusCode;
use tokio::time::sleep;

use crate::{
    error::{SyncError, SyncResult},
    retry::retry_after,
    types::{AddTrackToPlaylistRequest, CreatePlaylistRequest, CreatePlaylistResponse},
};

use super::SpotifyClient;

/// Largest number of URIs the API accepts in one append.
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPlaylist {
    pub id: String,
    pub tracks_written: usize,
    pub batches: usize,
}

impl SpotifyClient {
    /// Creates an empty playlist owned by the authenticated user and returns
    /// its id.
    ///
    /// A 429 is retried with backoff until the create policy runs out. Network
    /// errors are not retried, since the first request may already have
    /// created the playlist.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Write`] on a non-2xx response, exhausted retries or a body without `id`
    /// - [`SyncError::Auth`] when no user session is established
    /// - [`SyncError::Transport`] when the request could not be sent
    pub async fn create_playlist(&self, name: &str) -> SyncResult<String> {
        let user_id = self.session.user_id()?;
        let token = self.session.user_token()?;
        let url = self.api_url(&format!("/users/{user_id}/playlists"));
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: "Converted with tuneport".to_string(),
            public: false,
        };
        let policy = self.create_policy;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self
                .session
                .http()
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if !policy.has_attempts_left(attempt) {
                    return Err(SyncError::write(format!(
                        "creating playlist \"{name}\" still rate limited after {attempt} attempts"
                    )));
                }
                let wait = policy.delay_after(attempt, retry_after(&response));
                tracing::debug!(attempt, ?wait, "playlist creation rate limited");
                sleep(wait).await;
                continue;
            }

            let text = response.text().await?;
            if !status.is_success() {
                return Err(SyncError::write(format!(
                    "creating playlist \"{name}\" returned {status}: {text}"
                )));
            }

            let created: CreatePlaylistResponse = serde_json::from_str(&text).map_err(|e| {
                SyncError::write(format!("create playlist response {status} has no id: {e}"))
            })?;
            tracing::info!(playlist = %created.id, retries = attempt - 1, "playlist created");
            return Ok(created.id);
        }
    }

    /// Appends one batch of track URIs to a playlist.
    ///
    /// Callers split their URIs into batches of at most [`MAX_BATCH_SIZE`]
    /// first. Any failed attempt is retried with backoff until the write
    /// policy runs out.
    pub async fn add_items(&self, playlist_id: &str, uris: &[String]) -> SyncResult<()> {
        if playlist_id.is_empty() {
            return Err(SyncError::write("playlist must be created before adding items"));
        }
        if uris.len() > MAX_BATCH_SIZE {
            return Err(SyncError::write(format!(
                "batch of {} items exceeds the limit of {MAX_BATCH_SIZE}",
                uris.len()
            )));
        }
        if uris.iter().any(|uri| uri.is_empty()) {
            return Err(SyncError::write("batch contains an empty track uri"));
        }

        let token = self.session.user_token()?;
        let url = self.api_url(&format!("/playlists/{playlist_id}/tracks"));
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };
        let policy = self.write_policy;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self
                .session
                .http()
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await;

            let (reason, wait) = match response {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => (
                    format!("returned {}", response.status()),
                    policy.delay_after(attempt, retry_after(&response)),
                ),
                Err(err) => (err.to_string(), policy.delay_for(attempt)),
            };

            if !policy.has_attempts_left(attempt) {
                return Err(SyncError::write(format!(
                    "adding {} items to playlist {playlist_id} {reason} after {attempt} attempts",
                    uris.len()
                )));
            }

            tracing::debug!(attempt, %reason, ?wait, "adding items failed, retrying");
            sleep(wait).await;
        }
    }
}

/// Creates the destination playlist and fills it with every resolved slot,
/// in slot order, in batches of at most [`MAX_BATCH_SIZE`].
///
/// Empty slots are unresolved tracks and are skipped. The first batch that
/// fails after retries ends the write phase.
pub async fn write_playlist(
    client: &SpotifyClient,
    name: &str,
    slots: &[String],
) -> SyncResult<WrittenPlaylist> {
    let uris: Vec<String> = slots.iter().filter(|s| !s.is_empty()).cloned().collect();

    let id = client.create_playlist(name).await?;

    let mut batches = 0;
    for batch in uris.chunks(MAX_BATCH_SIZE) {
        client.add_items(&id, batch).await?;
        batches += 1;
        tracing::debug!(playlist = %id, batch = batches, size = batch.len(), "batch written");
    }

    Ok(WrittenPlaylist {
        id,
        tracks_written: uris.len(),
        batches,
    })
}
