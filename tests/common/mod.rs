#![allow(dead_code)]

use async_trait::async_trait;
use pantry_api_client::client::{IdentityError, IdentityProvider, User};
use pantry_api_client::{ApiClient, ClientConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::MockServer;

/// Provider failure a `FakeIdentity` can be told to produce
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Cached lookups fail with a malformed-token error
    Lookup,
    /// Forced refreshes are rejected by the token service
    Refresh,
}

/// Identity provider double that counts token lookups.
///
/// Cached lookups return `cached`; forced lookups return `fresh`, or fail with
/// `NoSession` when `fresh` is `None`. A configured `Failure` overrides both.
pub struct FakeIdentity {
    user: Option<User>,
    cached: String,
    fresh: Option<String>,
    failure: Option<Failure>,
    pub cached_calls: AtomicUsize,
    pub forced_calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn signed_in(cached: &str, fresh: &str) -> Arc<Self> {
        Arc::new(Self {
            user: Some(User::new("u1")),
            cached: cached.to_string(),
            fresh: Some(fresh.to_string()),
            failure: None,
            cached_calls: AtomicUsize::new(0),
            forced_calls: AtomicUsize::new(0),
        })
    }

    /// Signed in, but the session cannot mint a new token
    pub fn without_refresh(cached: &str) -> Arc<Self> {
        Arc::new(Self {
            user: Some(User::new("u1")),
            cached: cached.to_string(),
            fresh: None,
            failure: None,
            cached_calls: AtomicUsize::new(0),
            forced_calls: AtomicUsize::new(0),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            user: None,
            cached: String::new(),
            fresh: None,
            failure: None,
            cached_calls: AtomicUsize::new(0),
            forced_calls: AtomicUsize::new(0),
        })
    }

    /// Signed in, with a provider that fails the given way
    pub fn failing(cached: &str, failure: Failure) -> Arc<Self> {
        Arc::new(Self {
            user: Some(User::new("u1")),
            cached: cached.to_string(),
            fresh: None,
            failure: Some(failure),
            cached_calls: AtomicUsize::new(0),
            forced_calls: AtomicUsize::new(0),
        })
    }

    pub fn forced(&self) -> usize {
        self.forced_calls.load(Ordering::SeqCst)
    }

    pub fn cached(&self) -> usize {
        self.cached_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_user(&self) -> Option<User> {
        self.user.clone()
    }

    async fn id_token(&self, force_refresh: bool) -> Result<String, IdentityError> {
        if self.user.is_none() {
            return Err(IdentityError::NoSession);
        }
        if force_refresh {
            self.forced_calls.fetch_add(1, Ordering::SeqCst);
            if self.failure == Some(Failure::Refresh) {
                return Err(IdentityError::Refresh {
                    status: 503,
                    message: "Token service unavailable".to_string(),
                });
            }
            self.fresh.clone().ok_or(IdentityError::NoSession)
        } else {
            self.cached_calls.fetch_add(1, Ordering::SeqCst);
            if self.failure == Some(Failure::Lookup) {
                return Err(IdentityError::InvalidResponse(
                    "Stored token is malformed".to_string(),
                ));
            }
            Ok(self.cached.clone())
        }
    }
}

pub fn base_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

pub fn client_for(server: &MockServer, identity: Arc<dyn IdentityProvider>) -> ApiClient {
    client_with_config(ClientConfig::default().with_base_url(base_url(server)), identity)
}

pub fn client_with_config(config: ClientConfig, identity: Arc<dyn IdentityProvider>) -> ApiClient {
    ApiClient::with_config(config, identity).expect("Failed to build client")
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

pub fn init_test_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
