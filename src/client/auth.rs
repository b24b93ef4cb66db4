//! Identity providers for bearer-token authentication.
//!
//! The API client never stores tokens itself. Every authenticated request asks
//! an [`IdentityProvider`] for the current ID token, either from the
//! provider's cache or, after a 401, freshly minted.
//!
//! Two providers ship with the crate:
//!
//! - [`StaticSession`] - a fixed user and token (or no session at all), handy
//!   for scripts and tests
//! - [`RefreshTokenSession`] - exchanges a long-lived refresh token for
//!   short-lived ID tokens at a secure-token endpoint and caches them until
//!   shortly before they expire

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Default secure-token endpoint used to refresh ID tokens
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Cached tokens closer than this to expiry are refreshed instead of reused
const EXPIRY_SKEW_SECS: i64 = 300;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// First ten characters of a token, for log lines
pub(crate) fn token_preview(token: &str) -> &str {
    token
        .char_indices()
        .nth(10)
        .map_or(token, |(end, _)| &token[..end])
}

/// A signed-in user as seen by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }
}

/// Identity provider failures
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Nobody is signed in
    #[error("No signed-in session")]
    NoSession,

    /// The token endpoint rejected the refresh
    #[error("Token refresh failed ({status}): {message}")]
    Refresh { status: u16, message: String },

    /// The token endpoint could not be reached
    #[error("Failed to reach token endpoint: {0}")]
    Network(#[from] reqwest::Error),

    /// The token endpoint answered with something we cannot use
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

/// Source of bearer tokens for authenticated requests.
///
/// Implementations own the session; the API client only reads from it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, if any
    async fn current_user(&self) -> Option<User>;

    /// An ID token for the current user.
    ///
    /// With `force_refresh == false` a cached token may be returned. With
    /// `force_refresh == true` the provider must mint a token that is valid at
    /// call time. Returns [`IdentityError::NoSession`] when signed out.
    async fn id_token(&self, force_refresh: bool) -> Result<String, IdentityError>;
}

/// A fixed session: one user, one token, never refreshed.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    session: Option<(User, String)>,
}

impl StaticSession {
    pub fn signed_in(user: User, token: impl Into<String>) -> Self {
        Self {
            session: Some((user, token.into())),
        }
    }

    pub fn signed_out() -> Self {
        Self { session: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticSession {
    async fn current_user(&self) -> Option<User> {
        self.session.as_ref().map(|(user, _)| user.clone())
    }

    async fn id_token(&self, _force_refresh: bool) -> Result<String, IdentityError> {
        self.session
            .as_ref()
            .map(|(_, token)| token.clone())
            .ok_or(IdentityError::NoSession)
    }
}

/// Settings for [`RefreshTokenSession`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secure-token endpoint
    pub token_url: String,
    /// Project API key, appended as `?key=` when present
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_key: None,
        }
    }
}

impl SessionConfig {
    /// Reads `PANTRY_TOKEN_URL` and `PANTRY_API_KEY`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("PANTRY_TOKEN_URL") {
            config.token_url = url;
        }
        config.api_key = env::var("PANTRY_API_KEY").ok().filter(|k| !k.is_empty());
        config
    }

    fn refresh_url(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}?key={}", self.token_url, urlencoding::encode(key)),
            None => self.token_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
    #[serde(default)]
    user_id: Option<String>,
}

impl RefreshResponse {
    fn lifetime_secs(&self) -> i64 {
        match &self.expires_in {
            Some(serde_json::Value::String(s)) => s.parse().unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
            Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
            _ => DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    refresh_token: Option<String>,
    id_token: Option<CachedToken>,
    /// Bumped on every successful refresh
    generation: u64,
}

impl SessionState {
    fn usable_token(&self, now: DateTime<Utc>) -> Option<String> {
        self.id_token
            .as_ref()
            .filter(|cached| cached.expires_at - now > ChronoDuration::seconds(EXPIRY_SKEW_SECS))
            .map(|cached| cached.token.clone())
    }

    fn clear(&mut self) {
        self.user = None;
        self.refresh_token = None;
        self.id_token = None;
    }
}

/// # Refresh-token backed session
///
/// Holds a long-lived refresh token and trades it for short-lived ID tokens.
///
/// ## Caching
///
/// Cached lookups reuse the current ID token until it is within five minutes
/// of expiry. Forced lookups always hit the token endpoint.
///
/// ## Concurrent refreshes
///
/// Refreshes are serialized. A caller that queued behind an in-flight refresh
/// takes that refresh's token instead of issuing another one, so a burst of
/// 401s costs a single round trip to the token endpoint.
pub struct RefreshTokenSession {
    config: SessionConfig,
    client: Client,
    state: Mutex<SessionState>,
    refresh_lock: Mutex<()>,
}

impl RefreshTokenSession {
    pub fn new(config: SessionConfig, user: User, refresh_token: impl Into<String>) -> Self {
        Self {
            config,
            client: Client::new(),
            state: Mutex::new(SessionState {
                user: Some(user),
                refresh_token: Some(refresh_token.into()),
                id_token: None,
                generation: 0,
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Builds a session from `PANTRY_USER_ID` and `PANTRY_REFRESH_TOKEN`.
    /// Returns `None` when either is missing.
    pub fn from_env() -> Option<Self> {
        let uid = env::var("PANTRY_USER_ID").ok().filter(|v| !v.is_empty())?;
        let refresh_token = env::var("PANTRY_REFRESH_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self::new(SessionConfig::from_env(), User::new(uid), refresh_token))
    }

    /// Seeds the cache with an ID token obtained at sign-in
    pub async fn set_id_token(&self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        state.id_token = Some(CachedToken {
            token: token.into(),
            expires_at,
        });
    }

    pub async fn sign_out(&self) {
        tracing::info!("Signing out of identity session");
        self.state.lock().await.clear();
    }

    async fn refresh(&self) -> Result<String, IdentityError> {
        let (refresh_token, uid) = {
            let state = self.state.lock().await;
            match (&state.refresh_token, &state.user) {
                (Some(token), Some(user)) => (token.clone(), user.uid.clone()),
                _ => return Err(IdentityError::NoSession),
            }
        };

        tracing::debug!("Refreshing ID token for user: {}", uid);

        let response = self
            .client
            .post(self.config.refresh_url())
            .form(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token: &refresh_token,
            })
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network error during token refresh: {}", e);
                IdentityError::Network(e)
            })?;

        let status = response.status();
        tracing::debug!("Token refresh response status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::error!("Token refresh failed with status {}: {}", status, error_body);

            let message = match status.as_u16() {
                400 | 401 => {
                    // The refresh token is revoked or expired; the session is over.
                    self.sign_out().await;
                    format!("Refresh token rejected: {}", error_body)
                }
                403 => format!("Access denied: account may be disabled: {}", error_body),
                500..=599 => format!("Token service error: {}", error_body),
                _ => error_body,
            };
            return Err(IdentityError::Refresh {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let refreshed: RefreshResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse token refresh response: {}", e);
            IdentityError::InvalidResponse(e.to_string())
        })?;

        if refreshed.id_token.is_empty() {
            return Err(IdentityError::InvalidResponse("empty id_token".to_string()));
        }

        let expires_at = Utc::now() + ChronoDuration::seconds(refreshed.lifetime_secs());
        let mut state = self.state.lock().await;
        if state.user.is_none() {
            // Signed out while the refresh was in flight.
            return Err(IdentityError::NoSession);
        }
        if let Some(user_id) = &refreshed.user_id {
            if user_id != &uid {
                tracing::warn!("Token endpoint returned user {} for session {}", user_id, uid);
            }
        }
        if let Some(rotated) = refreshed.refresh_token {
            state.refresh_token = Some(rotated);
        }
        state.id_token = Some(CachedToken {
            token: refreshed.id_token.clone(),
            expires_at,
        });
        state.generation += 1;

        tracing::debug!(
            "Refreshed ID token: {}...",
            token_preview(&refreshed.id_token)
        );
        Ok(refreshed.id_token)
    }
}

#[async_trait]
impl IdentityProvider for RefreshTokenSession {
    async fn current_user(&self) -> Option<User> {
        self.state.lock().await.user.clone()
    }

    async fn id_token(&self, force_refresh: bool) -> Result<String, IdentityError> {
        let observed_generation = {
            let state = self.state.lock().await;
            if state.user.is_none() {
                return Err(IdentityError::NoSession);
            }
            if !force_refresh {
                if let Some(token) = state.usable_token(Utc::now()) {
                    return Ok(token);
                }
            }
            state.generation
        };

        let _refreshing = self.refresh_lock.lock().await;

        {
            let state = self.state.lock().await;
            if state.user.is_none() {
                return Err(IdentityError::NoSession);
            }
            if state.generation != observed_generation {
                if let Some(cached) = &state.id_token {
                    tracing::debug!("Reusing token from concurrent refresh");
                    return Ok(cached.token.clone());
                }
            }
        }

        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_session_signed_out_has_no_token() {
        let session = StaticSession::signed_out();
        assert!(session.current_user().await.is_none());
        assert!(matches!(
            session.id_token(false).await,
            Err(IdentityError::NoSession)
        ));
    }

    #[tokio::test]
    async fn cached_token_is_reused_until_near_expiry() {
        let session = RefreshTokenSession::new(
            SessionConfig::default(),
            User::new("u1"),
            "refresh-1",
        );
        session
            .set_id_token("fresh", Utc::now() + ChronoDuration::hours(1))
            .await;
        assert_eq!(session.id_token(false).await.unwrap(), "fresh");

        let state = session.state.lock().await;
        let an_hour_later = Utc::now() + ChronoDuration::seconds(EXPIRY_SKEW_SECS + 3600);
        assert!(state.usable_token(an_hour_later).is_none());
    }

    #[test]
    fn lifetime_accepts_string_or_number() {
        let from_string: RefreshResponse =
            serde_json::from_str(r#"{"id_token":"t","expires_in":"120"}"#).unwrap();
        assert_eq!(from_string.lifetime_secs(), 120);

        let from_number: RefreshResponse =
            serde_json::from_str(r#"{"id_token":"t","expires_in":60}"#).unwrap();
        assert_eq!(from_number.lifetime_secs(), 60);

        let missing: RefreshResponse = serde_json::from_str(r#"{"id_token":"t"}"#).unwrap();
        assert_eq!(missing.lifetime_secs(), DEFAULT_TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn refresh_url_appends_encoded_key() {
        let config = SessionConfig {
            token_url: "https://tokens.example.com/v1/token".to_string(),
            api_key: Some("a b".to_string()),
        };
        assert_eq!(
            config.refresh_url(),
            "https://tokens.example.com/v1/token?key=a%20b"
        );
    }

    #[test]
    fn token_preview_stops_on_char_boundary() {
        assert_eq!(token_preview("abcdefghij-rest"), "abcdefghij");
        assert_eq!(token_preview("abcdefghié-token"), "abcdefghié");
        assert_eq!(token_preview("short"), "short");
        assert_eq!(token_preview(""), "");
    }
}
