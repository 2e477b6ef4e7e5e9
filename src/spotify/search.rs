use reqwest::StatusCode;
use tokio::time::sleep;

use crate::{
    error::{SyncError, SyncResult},
    retry::retry_after,
    types::{Candidate, SearchResponse},
    utils,
};

use super::SpotifyClient;

/// Number of candidates requested per search.
pub const SEARCH_LIMIT: u32 = 3;

impl SpotifyClient {
    /// Resolves one source track to a destination track.
    ///
    /// Searches for `"<title>: <artist>"`. When nothing comes back and
    /// `allow_retry_without_artist` is set, searches once more for the title
    /// alone. The best candidate is chosen by [`pick_best_candidate`].
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotFound`] with the sanitized query when every search was empty
    /// - [`SyncError::RateLimited`] when 401/429 responses outlast the retry policy
    /// - [`SyncError::Auth`] when the application token cannot be refreshed
    /// - [`SyncError::Transport`] when the API stays unreachable
    pub async fn resolve_track(
        &self,
        title: &str,
        artist: &str,
        allow_retry_without_artist: bool,
    ) -> SyncResult<Candidate> {
        let query = utils::build_search_query(title, Some(artist));
        let mut candidates = self.search(&query).await?;

        if candidates.is_empty() && allow_retry_without_artist {
            let fallback = utils::build_search_query(title, None);
            if fallback != query {
                tracing::debug!(%query, %fallback, "no candidates, retrying without artist");
                candidates = self.search(&fallback).await?;
            }
        }

        pick_best_candidate(candidates, title).ok_or(SyncError::NotFound { query })
    }

    /// Runs a single track search with the current application token.
    pub async fn search(&self, query: &str) -> SyncResult<Vec<Candidate>> {
        let url = self.api_url("/search");
        let limit = SEARCH_LIMIT.to_string();
        let policy = self.search_policy;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let token = self.session.current_app_token();
            let response = self
                .session
                .http()
                .get(&url)
                .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
                .bearer_auth(token)
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    if !policy.has_attempts_left(attempt) {
                        return Err(err.into());
                    }
                    tracing::debug!(attempt, error = %err, "search request failed, retrying");
                    sleep(policy.delay_for(attempt)).await;
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::TOO_MANY_REQUESTS {
                if !policy.has_attempts_left(attempt) {
                    return Err(SyncError::RateLimited { attempts: attempt });
                }
                let wait = policy.delay_after(attempt, retry_after(&response));
                tracing::debug!(attempt, %status, ?wait, "refreshing application token");
                sleep(wait).await;
                self.session.refresh().await?;
                continue;
            }

            if status.is_server_error() && policy.has_attempts_left(attempt) {
                tracing::debug!(attempt, %status, "search failed on server, retrying");
                sleep(policy.delay_for(attempt)).await;
                continue;
            }

            if let Err(err) = response.error_for_status_ref() {
                return Err(err.into());
            }

            let body = response.text().await?;
            let results: SearchResponse = serde_json::from_str(&body)
                .map_err(|source| SyncError::Decode {
                    context: "search",
                    source,
                })?;

            return Ok(results
                .tracks
                .items
                .into_iter()
                .map(Candidate::from)
                .collect());
        }
    }
}

/// Picks the candidate to use for `title`.
///
/// Among candidates whose sanitized name equals the sanitized title (ignoring
/// case), the most popular one wins and ties keep the earlier candidate. When
/// no name matches, the first candidate, which is the search API's best
/// guess, is used. Returns `None` only for an empty list.
pub fn pick_best_candidate(candidates: Vec<Candidate>, title: &str) -> Option<Candidate> {
    let mut best: Option<usize> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        if !utils::names_match(&candidate.name, title) {
            continue;
        }
        match best {
            Some(current) if candidates[current].popularity >= candidate.popularity => {}
            _ => best = Some(index),
        }
    }

    candidates.into_iter().nth(best.unwrap_or(0))
}
