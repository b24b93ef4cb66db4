//! # Pantry API Client
//!
//! Client-side API layer for the diet, recipe and pantry backend. All of the
//! heavy lifting (plan generation, recipe generation, ingredient detection,
//! payments) happens server-side; this crate makes the calls.
//!
//! ## Client Module
//!
//! The [`client`] module holds [`ApiClient`], a single authenticated HTTP
//! client. It attaches a bearer token from an injected
//! [`IdentityProvider`](client::IdentityProvider) to every authenticated
//! request and retries exactly once, with a freshly minted token, when the
//! backend answers 401.
//!
//! ## Services Module
//!
//! The [`services`] module wraps the backend endpoints (diet planning, pantry,
//! grocery list, recipes, subscriptions, ingredient detection, chefs) in typed
//! methods.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pantry_api_client::{ApiClient, client::StaticSession};
//!
//! # fn example() -> pantry_api_client::ApiResult<()> {
//! // Reads PANTRY_API_URL, falls back to http://localhost:5000/api
//! let client = ApiClient::new(Arc::new(StaticSession::signed_out()))?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod services;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
