use crate::{error, management::TokenManager, spotify, success};

use super::{load_settings, new_session};

pub async fn auth() {
    let settings = load_settings();
    let session = new_session(&settings);

    match spotify::auth::authorize(&session, &settings.oauth).await {
        Ok(token) => {
            let user = token.user_id.clone();
            if let Err(e) = TokenManager::new(token).persist().await {
                error!("Failed to save token to cache: {}", e);
            }
            success!("Authenticated as {}.", user);
        }
        Err(e) => error!("Authentication failed: {}", e),
    }
}
