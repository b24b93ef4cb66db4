//! # API Client
//!
//! This module provides the authenticated HTTP client for the backend API:
//! bearer-token attachment, a single token-refresh retry on 401, and JSON or
//! multipart bodies.
//!
//! ## Modules
//!
//! - [`auth`] - Identity providers that hand out ID tokens
//! - [`client`] - The request lifecycle and verb methods
//! - [`request`] - Request descriptors and body variants
//! - [`types`] - Request and response payloads of the backend services
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pantry_api_client::client::{ApiClient, StaticSession, User};
//! use pantry_api_client::ClientConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = Arc::new(StaticSession::signed_in(User::new("u1"), "id-token"));
//! let client = ApiClient::with_config(ClientConfig::default(), session)?;
//!
//! // Public endpoint, no session needed
//! let plans = client.subscription().plans().await?;
//! println!("{} plans available", plans.len());
//!
//! // Authenticated endpoint
//! let plan = client.diet_planning().active_plan().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
#[allow(clippy::module_inception)]
pub mod client;
pub mod request;
pub mod types;

pub use auth::{IdentityError, IdentityProvider, RefreshTokenSession, SessionConfig, StaticSession, User};
pub use client::ApiClient;
pub use request::{ApiRequest, MultipartForm, RequestBody};
