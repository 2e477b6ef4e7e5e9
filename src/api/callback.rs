use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::types::PendingAuthorization;

/// Receives the authorization redirect and hands the code to the waiting
/// consent flow. The code itself is exchanged by the session, not here.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PendingAuthorization>>>>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;
    let Some(pending) = state.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    if params.get("state") != Some(&pending.state) {
        pending.error = Some("state parameter mismatch".to_string());
        return Html("<h4>Login failed: state mismatch.</h4>");
    }

    if let Some(error) = params.get("error") {
        pending.error = Some(error.clone());
        return Html("<h4>Login failed.</h4>");
    }

    match params.get("code") {
        Some(code) => {
            pending.code = Some(code.clone());
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        None => {
            pending.error = Some("callback carried no code".to_string());
            Html("<h4>Missing authorization code.</h4>")
        }
    }
}
