use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::client::{
    auth::{token_preview, IdentityError, IdentityProvider},
    request::{ApiRequest, MultipartForm, RequestBody},
};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::{
    ChefService, DietPlanningService, GroceryService, IngredientDetectionService, PantryService,
    RecipeService, SubscriptionService,
};

/// Encoded body, ready to be attached to an attempt
enum Payload<'a> {
    Empty,
    Text(String),
    Form(&'a MultipartForm),
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ClientConfig>,
    identity: Arc<dyn IdentityProvider>,
}

impl ApiClient {
    /// Client configured from the environment
    pub fn new(identity: Arc<dyn IdentityProvider>) -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env()?, identity)
    }

    pub fn with_config(config: ClientConfig, identity: Arc<dyn IdentityProvider>) -> ApiResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
            identity,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    // Services

    pub fn diet_planning(&self) -> DietPlanningService {
        DietPlanningService::new(self.clone())
    }

    pub fn pantry(&self) -> PantryService {
        PantryService::new(self.clone())
    }

    pub fn grocery(&self) -> GroceryService {
        GroceryService::new(self.clone())
    }

    pub fn recipes(&self) -> RecipeService {
        RecipeService::new(self.clone())
    }

    pub fn subscription(&self) -> SubscriptionService {
        SubscriptionService::new(self.clone())
    }

    pub fn ingredients(&self) -> IngredientDetectionService {
        IngredientDetectionService::new(self.clone())
    }

    pub fn chefs(&self) -> ChefService {
        ChefService::new(self.clone())
    }

    // Verbs

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, require_auth: bool) -> ApiResult<T> {
        self.request(ApiRequest::get(endpoint).require_auth(require_auth))
            .await
    }

    pub async fn post<T, B>(&self, endpoint: &str, data: Option<&B>, require_auth: bool) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.verb_body(endpoint, data, require_auth).await?;
        self.request(
            ApiRequest::post(endpoint)
                .require_auth(require_auth)
                .body(body),
        )
        .await
    }

    /// Multipart upload. The boundary `Content-Type` is left to reqwest.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: MultipartForm,
        require_auth: bool,
    ) -> ApiResult<T> {
        self.request(
            ApiRequest::post(endpoint)
                .require_auth(require_auth)
                .form(form),
        )
        .await
    }

    pub async fn put<T, B>(&self, endpoint: &str, data: Option<&B>, require_auth: bool) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.verb_body(endpoint, data, require_auth).await?;
        self.request(
            ApiRequest::put(endpoint)
                .require_auth(require_auth)
                .body(body),
        )
        .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str, require_auth: bool) -> ApiResult<T> {
        self.request(ApiRequest::delete(endpoint).require_auth(require_auth))
            .await
    }

    /// Run one request lifecycle: attach a token, send, recover from a single
    /// 401 with a forced token refresh, and decode the JSON response.
    ///
    /// The request timeout (or the configured default) bounds the whole
    /// lifecycle, retry included. A cancelled token aborts it.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let deadline = request.timeout.or(self.config.timeout);
        let cancel = request.cancel.clone();
        let endpoint = request.endpoint.clone();

        let lifecycle = self.execute(&request);
        let bounded = async {
            match deadline {
                Some(limit) => match tokio::time::timeout(limit, lifecycle).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!("Request to {} timed out after {:?}", endpoint, limit);
                        Err(ApiError::Timeout(limit))
                    }
                },
                None => lifecycle.await,
            }
        };

        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!("Request to {} cancelled", request.endpoint);
                        Err(ApiError::Cancelled)
                    }
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        let url = format!("{}{}", self.config.base_url, request.endpoint);
        let headers = self.build_headers(request)?;

        let token = if request.require_auth {
            Some(self.session_token(&request.endpoint).await?)
        } else {
            None
        };

        let payload = self.encode_body(&request.body)?;

        tracing::debug!("{} {}", request.method, url);
        let response = self
            .send(&request.method, &url, &headers, token.as_deref(), &payload)
            .await?;

        let status = response.status();
        tracing::debug!("{} {} -> {}", request.method, request.endpoint, status);

        if status == StatusCode::UNAUTHORIZED && request.require_auth {
            let original_body = read_error_body(response).await;
            tracing::warn!("Received 401 from {}, refreshing token", request.endpoint);

            let fresh_token = match self.resolve_token(true).await {
                Ok(Some(token)) => token,
                Ok(None) => {
                    tracing::error!("No session to refresh after 401 from {}", request.endpoint);
                    return Err(ApiError::Http {
                        status: status.as_u16(),
                        body: original_body,
                    });
                }
                Err(e) => {
                    tracing::error!("Token refresh after 401 failed: {}", e);
                    return Err(ApiError::Http {
                        status: status.as_u16(),
                        body: original_body,
                    });
                }
            };

            let retry = self
                .send(&request.method, &url, &headers, Some(&fresh_token), &payload)
                .await?;
            let retry_status = retry.status();

            if !retry_status.is_success() {
                let body = read_error_body(retry).await;
                tracing::error!(
                    "Retry of {} failed with status {}: {}",
                    request.endpoint,
                    retry_status,
                    body
                );
                return Err(ApiError::RetryExhausted {
                    status: retry_status.as_u16(),
                    body,
                });
            }

            return parse_json(retry).await;
        }

        if !status.is_success() {
            let body = read_error_body(response).await;
            tracing::error!(
                "Request to {} failed with status {}: {}",
                request.endpoint,
                status,
                body
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_json(response).await
    }

    /// Caller headers plus the default JSON content type.
    /// Multipart requests never carry a manual `Content-Type`.
    fn build_headers(&self, request: &ApiRequest) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::InvalidHeader(format!("{}: {}", name, value)))?;
            headers.insert(header_name, header_value);
        }

        if request.body.is_multipart() {
            if headers.remove(CONTENT_TYPE).is_some() {
                tracing::warn!(
                    "Dropping Content-Type on multipart request to {}",
                    request.endpoint
                );
            }
        } else if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(headers)
    }

    /// Cached token for an authenticated call, or `AuthRequired`
    async fn session_token(&self, endpoint: &str) -> ApiResult<String> {
        match self.resolve_token(false).await? {
            Some(token) => Ok(token),
            None => {
                tracing::error!(
                    "Attempted authenticated request to {} without a session",
                    endpoint
                );
                Err(ApiError::AuthRequired)
            }
        }
    }

    /// Body for `post`/`put`. A missing session is reported ahead of a
    /// strict serialization failure.
    async fn verb_body<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: Option<&B>,
        require_auth: bool,
    ) -> ApiResult<RequestBody> {
        match self.json_body(data) {
            Ok(body) => Ok(body),
            Err(e) => {
                if require_auth {
                    self.session_token(endpoint).await?;
                }
                Err(e)
            }
        }
    }

    /// `Ok(None)` means there is no session to take a token from
    async fn resolve_token(&self, force_refresh: bool) -> ApiResult<Option<String>> {
        if self.identity.current_user().await.is_none() {
            return Ok(None);
        }

        match self.identity.id_token(force_refresh).await {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => {
                tracing::debug!("Using authentication token: {}...", token_preview(&token));
                Ok(Some(token))
            }
            Err(IdentityError::NoSession) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Turn caller data into a request body under the configured
    /// serialization policy. Lenient clients drop an unencodable body and
    /// send the request without one; strict clients fail before any I/O.
    pub fn json_body<B: Serialize + ?Sized>(&self, data: Option<&B>) -> ApiResult<RequestBody> {
        let Some(data) = data else {
            return Ok(RequestBody::Empty);
        };

        match serde_json::to_value(data) {
            // A string value is taken as already-encoded JSON text.
            Ok(serde_json::Value::String(text)) => Ok(RequestBody::Raw(text)),
            Ok(value) => Ok(RequestBody::Json(value)),
            Err(e) if self.config.strict_serialization => Err(ApiError::Serialization(e)),
            Err(e) => {
                tracing::warn!("Sending request without body, serialization failed: {}", e);
                Ok(RequestBody::Empty)
            }
        }
    }

    fn encode_body<'a>(&self, body: &'a RequestBody) -> ApiResult<Payload<'a>> {
        Ok(match body {
            RequestBody::Empty => Payload::Empty,
            RequestBody::Json(value) => match serde_json::to_string(value) {
                Ok(text) => Payload::Text(text),
                Err(e) if self.config.strict_serialization => {
                    return Err(ApiError::Serialization(e));
                }
                Err(e) => {
                    tracing::warn!("Sending request without body, serialization failed: {}", e);
                    Payload::Empty
                }
            },
            RequestBody::Raw(text) => Payload::Text(text.clone()),
            RequestBody::Multipart(form) => Payload::Form(form),
        })
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        token: Option<&str>,
        payload: &Payload<'_>,
    ) -> ApiResult<Response> {
        let mut headers = headers.clone();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidHeader("Authorization: Bearer <token>".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let builder = self.client.request(method.clone(), url).headers(headers);
        let builder = match payload {
            Payload::Empty => builder,
            Payload::Text(text) => builder.body(text.clone()),
            Payload::Form(form) => builder.multipart(form.to_form()?),
        };

        builder.send().await.map_err(|e| {
            tracing::error!("Network error calling {}: {}", url, e);
            ApiError::Network(e)
        })
    }
}

async fn read_error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string())
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let no_content = response.status() == StatusCode::NO_CONTENT;
    let text = response.text().await?;
    let text = if no_content && text.trim().is_empty() {
        "null"
    } else {
        text.as_str()
    };

    serde_json::from_str(text).map_err(|e| {
        tracing::error!("Failed to parse response body: {}", e);
        ApiError::Parse(e)
    })
}
