//! Error types for the API client.
//!
//! Every failure of a request lifecycle surfaces as an [`ApiError`]. The
//! variants keep "no session" apart from HTTP failures so callers can route the
//! user to sign-in instead of showing a generic error.

use std::time::Duration;
use thiserror::Error;

use crate::client::auth::IdentityError;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request needs a bearer token and no session is signed in.
    /// Raised before any network I/O.
    #[error("Authentication required: no signed-in session")]
    AuthRequired,

    /// Non-2xx response that was not recovered by the token refresh path
    #[error("API error ({status}): {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body text
        body: String,
    },

    /// The single retry after a 401 failed as well
    #[error("Request failed after token refresh ({status}): {body}")]
    RetryExhausted {
        /// Status code of the retried request
        status: u16,
        /// Raw response body text of the retried request
        body: String,
    },

    /// Request body could not be encoded (strict serialization only)
    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Success response whose body is not the expected JSON
    #[error("Failed to parse response body: {0}")]
    Parse(#[source] serde_json::Error),

    /// Transport failure (DNS, connection refused, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The identity provider failed for a reason other than a missing session
    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// The request did not complete within its deadline
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A caller-supplied header name or value is not valid HTTP
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status code carried by this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::RetryExhausted { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body carried by this error, if any
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } | Self::RetryExhausted { body, .. } => Some(body),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// True when the server rejected our credentials, even after a refresh
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
