use std::path::PathBuf;

use chrono::Utc;

use crate::{config, error::SyncResult, spotify::Session, types::Token};

/// Seconds before expiry at which a cached user token is refreshed.
const EXPIRY_MARGIN: u64 = 240;

/// On-disk cache of the user session, so the consent flow only runs once.
pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager {
            token,
            path: Self::token_path(),
        }
    }

    pub fn at(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    pub async fn load() -> Result<Self, String> {
        Self::load_from(Self::token_path()).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self, String> {
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token, path })
    }

    pub async fn persist(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| e.to_string())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN >= self.token.obtained_at + self.token.expires_in
    }

    /// Hands the cached session to `session`, refreshing it first when it is
    /// about to expire. A refreshed token is written back to disk.
    pub async fn install(&mut self, session: &Session) -> SyncResult<()> {
        if !self.is_expired() {
            session.restore_user_session(self.token.user_session());
            return Ok(());
        }

        tracing::debug!("cached user token expired, refreshing");
        self.token = session.refresh_user_session(&self.token).await?;
        if let Err(e) = self.persist().await {
            tracing::warn!(error = %e, "could not update token cache");
        }
        Ok(())
    }

    pub fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
