use std::sync::RwLock;

use chrono::Utc;
use reqwest::{
    Client, RequestBuilder, Response,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;

use crate::{
    config::SpotifyEndpoints,
    error::{SyncError, SyncResult},
    types::{Credentials, Token, TokenResponse, UserProfile, UserSession},
    utils,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Tokens of the destination service, shared by every resolution task.
///
/// The application token (client-credentials grant) is used for searches and
/// may be replaced by any task through [`Session::refresh`]. Replacement is a
/// single write under the lock, so readers see either the old or the new token
/// and never a torn value. Concurrent refreshes both run, the last one wins.
///
/// The user session (authorization-code grant) owns the destination playlist.
/// It is established once before a run and only read afterwards.
#[derive(Debug)]
pub struct Session {
    http: Client,
    endpoints: SpotifyEndpoints,
    credentials: Credentials,
    redirect_uri: String,
    app_token: RwLock<String>,
    user: RwLock<Option<UserSession>>,
}

impl Session {
    pub fn new(
        http: Client,
        endpoints: SpotifyEndpoints,
        credentials: Credentials,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Session {
            http,
            endpoints,
            credentials,
            redirect_uri: redirect_uri.into(),
            app_token: RwLock::new(String::new()),
            user: RwLock::new(None),
        }
    }

    /// Creates a session and acquires its first application token.
    pub async fn connect(
        http: Client,
        endpoints: SpotifyEndpoints,
        credentials: Credentials,
        redirect_uri: impl Into<String>,
    ) -> SyncResult<Self> {
        let session = Self::new(http, endpoints, credentials, redirect_uri);
        session.refresh().await?;
        Ok(session)
    }

    /// Seeds the application token without contacting the token endpoint.
    pub fn with_app_token(self, token: impl Into<String>) -> Self {
        self.set_app_token(token.into());
        self
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    pub fn endpoints(&self) -> &SpotifyEndpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Exchanges the client id and secret for an application bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Auth`] on a non-2xx response, a body without
    /// `access_token`, or when the token endpoint cannot be reached. No search
    /// can succeed without this token, so every failure here ends the run.
    pub async fn acquire_app_token(&self) -> SyncResult<String> {
        let response = send_auth(
            self.http
                .post(self.endpoints.token_url())
                .query(&[("grant_type", "client_credentials")])
                .header(AUTHORIZATION, utils::basic_auth_value(&self.credentials))
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE),
            "client credentials",
        )
        .await?;

        let token: TokenResponse = read_auth_json(response, "client credentials").await?;
        tracing::debug!("acquired application token");
        Ok(token.access_token)
    }

    pub fn current_app_token(&self) -> String {
        self.app_token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Re-acquires the application token and replaces the cached one.
    pub async fn refresh(&self) -> SyncResult<()> {
        let token = self.acquire_app_token().await?;
        self.set_app_token(token);
        Ok(())
    }

    fn set_app_token(&self, token: String) {
        *self
            .app_token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    /// Completes the authorization-code exchange for the code delivered to the
    /// redirect URI, then resolves the user's id with `GET /me`.
    ///
    /// The returned [`Token`] is what the token cache persists.
    pub async fn acquire_user_session(&self, code: &str) -> SyncResult<Token> {
        let response = send_auth(
            self.http
                .post(self.endpoints.token_url())
                .header(AUTHORIZATION, utils::basic_auth_value(&self.credentials))
                .form(&[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", self.redirect_uri.as_str()),
                ]),
            "authorization code",
        )
        .await?;

        let token: TokenResponse = read_auth_json(response, "authorization code").await?;
        let refresh_token = token
            .refresh_token
            .ok_or_else(|| SyncError::auth("authorization code response has no refresh_token"))?;

        let user_id = self.fetch_user_id(&token.access_token).await?;
        let token = Token {
            access_token: token.access_token,
            refresh_token,
            user_id,
            expires_in: token.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        };

        self.restore_user_session(token.user_session());
        tracing::info!(user = %token.user_id, "user session established");
        Ok(token)
    }

    /// Trades a cached refresh token for a new user access token. The refresh
    /// token itself is kept when the response does not rotate it.
    pub async fn refresh_user_session(&self, cached: &Token) -> SyncResult<Token> {
        let response = send_auth(
            self.http
                .post(self.endpoints.token_url())
                .header(AUTHORIZATION, utils::basic_auth_value(&self.credentials))
                .form(&[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", cached.refresh_token.as_str()),
                ]),
            "refresh token",
        )
        .await?;

        let token: TokenResponse = read_auth_json(response, "refresh token").await?;
        let token = Token {
            access_token: token.access_token,
            refresh_token: token
                .refresh_token
                .unwrap_or_else(|| cached.refresh_token.clone()),
            user_id: cached.user_id.clone(),
            expires_in: token.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        };

        self.restore_user_session(token.user_session());
        Ok(token)
    }

    pub fn restore_user_session(&self, session: UserSession) {
        *self
            .user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session);
    }

    pub fn user_session(&self) -> SyncResult<UserSession> {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or_else(|| SyncError::auth("no user session, run `tuneport auth` first"))
    }

    pub fn user_token(&self) -> SyncResult<String> {
        Ok(self.user_session()?.access_token)
    }

    pub fn user_id(&self) -> SyncResult<String> {
        Ok(self.user_session()?.user_id)
    }

    async fn fetch_user_id(&self, access_token: &str) -> SyncResult<String> {
        let response = send_auth(
            self.http
                .get(format!("{}/me", self.endpoints.api_url))
                .bearer_auth(access_token),
            "user profile",
        )
        .await?;

        let profile: UserProfile = read_auth_json(response, "user profile").await?;
        Ok(profile.id)
    }
}

async fn send_auth(request: RequestBuilder, context: &str) -> SyncResult<Response> {
    request
        .send()
        .await
        .map_err(|e| SyncError::auth(format!("{context} request failed: {e}")))
}

async fn read_auth_json<T: DeserializeOwned>(response: Response, context: &str) -> SyncResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SyncError::auth(format!("{context} response unreadable: {e}")))?;
    if !status.is_success() {
        return Err(SyncError::auth(format!(
            "{context} request returned {status}: {body}"
        )));
    }

    serde_json::from_str(&body)
        .map_err(|e| SyncError::auth(format!("{context} response {status} is malformed: {e}")))
}
