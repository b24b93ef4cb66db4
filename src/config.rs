//! Configuration for the API client
//!
//! The base URL is resolved once, at client construction, from the environment
//! with a local-development fallback.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Fallback base URL for local development
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin plus path prefix every endpoint is appended to
    pub base_url: String,
    /// Default deadline for a whole request lifecycle (retry included).
    /// `None` leaves requests unbounded unless the request sets its own.
    #[serde(with = "optional_secs", default)]
    pub timeout: Option<Duration>,
    /// Fail requests whose JSON body cannot be encoded instead of sending them
    /// without a body
    #[serde(default)]
    pub strict_serialization: bool,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        duration.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            strict_serialization: false,
            user_agent: format!("pantry-api-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads:
    /// - `PANTRY_API_URL`: base URL (defaults to [`DEFAULT_BASE_URL`])
    /// - `PANTRY_API_TIMEOUT_SECS`: default request timeout in seconds
    /// - `PANTRY_STRICT_SERIALIZATION`: `true`/`1` to fail on unencodable bodies
    pub fn from_env() -> ApiResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("PANTRY_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }

        if let Ok(secs) = env::var("PANTRY_API_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ApiError::config(format!("PANTRY_API_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Ok(flag) = env::var("PANTRY_STRICT_SERIALIZATION") {
            config.strict_serialization = parse_flag(&flag);
        }

        config.base_url = normalize_base_url(&config.base_url);
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_strict_serialization(mut self, strict: bool) -> Self {
        self.strict_serialization = strict;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(ApiError::config("timeout must be greater than zero"));
        }

        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
