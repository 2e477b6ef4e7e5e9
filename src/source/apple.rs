use reqwest::Client;

use crate::{
    error::{SyncError, SyncResult},
    types::{AppleTracksPage, Track},
};

use super::CatalogKind;

/// Page size of the catalog tracks endpoint.
pub const PAGE_LIMIT: u32 = 300;

/// Reads track lists from the Apple Music catalog API.
pub struct AppleMusicSource {
    http: Client,
    api_url: String,
    token: String,
}

impl AppleMusicSource {
    pub fn new(http: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        AppleMusicSource {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Collects every track of an album or playlist, following `next` links
    /// until the catalog stops returning one.
    pub async fn fetch_tracks(
        &self,
        storefront: &str,
        kind: CatalogKind,
        id: &str,
    ) -> SyncResult<Vec<Track>> {
        let mut url = format!(
            "{base}/v1/catalog/{storefront}/{collection}/{id}/tracks?limit={PAGE_LIMIT}",
            base = self.api_url,
            collection = kind.collection(),
        );
        let mut tracks = Vec::new();

        loop {
            let page = self.fetch_page(&url).await?;
            tracks.extend(page.data.into_iter().map(Track::from));

            match page.next.filter(|next| !next.is_empty()) {
                Some(next) => {
                    let separator = if next.contains('?') { '&' } else { '?' };
                    url = format!("{}{next}{separator}limit={PAGE_LIMIT}", self.api_url);
                }
                None => break,
            }
        }

        tracing::info!(count = tracks.len(), %id, "loaded source tracks");
        Ok(tracks)
    }

    async fn fetch_page(&self, url: &str) -> SyncResult<AppleTracksPage> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SyncError::source(format!("catalog request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::source(format!("catalog response unreadable: {e}")))?;
        if !status.is_success() {
            return Err(SyncError::source(format!("catalog returned {status}: {body}")));
        }

        serde_json::from_str(&body).map_err(|source| SyncError::Decode {
            context: "catalog tracks",
            source,
        })
    }
}
