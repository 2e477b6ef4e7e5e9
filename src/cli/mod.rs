//! # CLI Module
//!
//! User-facing commands. Each command loads its settings, talks to the
//! library modules and turns their results into console output.
//!
//! - [`auth`] - Grants tuneport access to the user's Spotify account and caches the session
//! - [`convert`] - Converts a source playlist into a new Spotify playlist
//!
//! ## Usage
//!
//! ```bash
//! tuneport auth
//! tuneport convert https://music.apple.com/us/playlist/chill/pl.u-abc --name "Chill"
//! tuneport convert ./exported.json --dry-run
//! ```
//!
//! Fatal problems (missing configuration, failed authentication) end the
//! process through the `error!` macro. A track that cannot be matched is
//! reported at the end of the run and never stops it.

mod auth;
mod convert;

pub use auth::auth;
pub use convert::convert;

use reqwest::Client;

use crate::{
    config::Settings,
    error,
    error::SyncResult,
    info,
    management::TokenManager,
    spotify::{self, Session},
};

fn load_settings() -> Settings {
    match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("{}. Add it to your environment or the tuneport .env file.", e),
    }
}

fn new_session(settings: &Settings) -> Session {
    Session::new(
        Client::new(),
        settings.endpoints.clone(),
        settings.credentials.clone(),
        settings.oauth.redirect_uri.clone(),
    )
}

/// Installs the cached user session, or runs the consent flow when there is
/// none.
async fn ensure_user_session(session: &Session, settings: &Settings) -> SyncResult<()> {
    match TokenManager::load().await {
        Ok(mut manager) => manager.install(session).await,
        Err(e) => {
            tracing::debug!(error = %e, "no cached user session");
            info!("Please grant access to your Spotify account in the browser.");
            let token = spotify::auth::authorize(session, &settings.oauth).await?;
            if let Err(e) = TokenManager::new(token).persist().await {
                tracing::warn!(error = %e, "could not write token cache");
            }
            Ok(())
        }
    }
}
