use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    config::OAuthSettings,
    error::{SyncError, SyncResult},
    server::start_api_server,
    types::{PendingAuthorization, Token},
    utils, warning,
};

use super::Session;

/// How long the user has to grant access in the browser.
pub const CONSENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the interactive consent flow and establishes the user session.
///
/// Starts the local callback server, opens the authorize page in the default
/// browser (printing the URL when no browser can be launched), waits for the
/// redirect and exchanges the received code through
/// [`Session::acquire_user_session`].
///
/// # Errors
///
/// Returns [`SyncError::Auth`] when the user denies access, the `state`
/// parameter does not match, the callback server cannot start, or no redirect
/// arrives within [`CONSENT_TIMEOUT`]. A redirect URI that does not parse is
/// [`SyncError::Config`].
pub async fn authorize(session: &Session, oauth: &OAuthSettings) -> SyncResult<Token> {
    let state = utils::generate_state();
    let callback_path = oauth.callback_path()?;
    let shared_state = Arc::new(Mutex::new(Some(PendingAuthorization {
        state: state.clone(),
        ..PendingAuthorization::default()
    })));

    let shutdown = CancellationToken::new();
    let mut server = {
        let addr = oauth.server_addr.clone();
        let server_state = Arc::clone(&shared_state);
        let shutdown = shutdown.clone();
        tokio::spawn(
            async move { start_api_server(&addr, &callback_path, server_state, shutdown).await },
        )
    };

    let auth_url = authorize_url(session, oauth, &state)?;
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    }

    let code = wait_for_callback(&mut server, &shared_state, CONSENT_TIMEOUT).await;
    shutdown.cancel();
    if !server.is_finished() {
        if let Ok(Err(e)) = server.await {
            tracing::warn!(error = %e, "callback server stopped with an error");
        }
    }

    session.acquire_user_session(&code?).await
}

/// Waits for the redirect while watching the callback server. A server that
/// stops early, for example because its port is taken, ends the wait at once.
async fn wait_for_callback(
    server: &mut JoinHandle<SyncResult<()>>,
    shared_state: &Arc<Mutex<Option<PendingAuthorization>>>,
    max_wait: Duration,
) -> SyncResult<String> {
    tokio::select! {
        code = wait_for_code(shared_state, max_wait) => code,
        stopped = server => match stopped {
            Ok(Err(e)) => Err(SyncError::auth(format!("callback server failed: {e}"))),
            Ok(Ok(())) => Err(SyncError::auth("callback server stopped before the redirect")),
            Err(e) => Err(SyncError::auth(format!("callback server crashed: {e}"))),
        },
    }
}

pub fn authorize_url(session: &Session, oauth: &OAuthSettings, state: &str) -> SyncResult<String> {
    let url = reqwest::Url::parse_with_params(
        &session.endpoints().authorize_url(),
        &[
            ("client_id", session.client_id()),
            ("response_type", "code"),
            ("redirect_uri", oauth.redirect_uri.as_str()),
            ("scope", oauth.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| SyncError::auth(format!("invalid authorize url: {e}")))?;
    Ok(url.to_string())
}

async fn wait_for_code(
    shared_state: &Arc<Mutex<Option<PendingAuthorization>>>,
    max_wait: Duration,
) -> SyncResult<String> {
    let start = Instant::now();

    while start.elapsed() < max_wait {
        {
            let lock = shared_state.lock().await;
            if let Some(pending) = lock.as_ref() {
                if let Some(error) = &pending.error {
                    return Err(SyncError::auth(format!("authorization denied: {error}")));
                }
                if let Some(code) = &pending.code {
                    return Ok(code.clone());
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    Err(SyncError::auth("authorization timed out"))
}
