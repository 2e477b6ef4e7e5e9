use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{api, error::SyncError, types::PendingAuthorization};

/// Routes of the consent server. `callback_path` is the path of the
/// configured redirect URI.
pub fn router(state: Arc<Mutex<Option<PendingAuthorization>>>, callback_path: &str) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(callback_path, get(api::callback).layer(Extension(state)))
}

/// Serves the callback endpoints on `addr` until `shutdown` fires.
///
/// Fails right away when `addr` is invalid or cannot be bound.
pub async fn start_api_server(
    addr: &str,
    callback_path: &str,
    state: Arc<Mutex<Option<PendingAuthorization>>>,
    shutdown: CancellationToken,
) -> Result<(), SyncError> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| SyncError::auth(format!("invalid server address {addr}: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::debug!(%addr, callback_path, "callback server listening");
    axum::serve(listener, router(state, callback_path))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}
