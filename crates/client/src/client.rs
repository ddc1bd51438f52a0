//! Bazaryo REST API client.
//!
//! Holds the HTTP connection pool, the backend base URL, the bearer token of
//! the signed-in user and the catalog cache. The endpoint wrappers live in
//! [`crate::api`].

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::cache::{CacheKey, CacheValue};
use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorBody};

const CACHE_CAPACITY: u64 = 1000;
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Bazaryo REST API client.
///
/// Cheap to clone; clones share the connection pool, token and cache.
///
/// # Authentication
///
/// Signing in through [`crate::api::AuthApi`] stores the returned bearer token
/// in memory. Endpoints that need a signed-in user fail with
/// [`ApiError::NoToken`] without a network call when no token is set.
#[derive(Clone)]
pub struct BazaryoClient {
    inner: Arc<BazaryoClientInner>,
}

struct BazaryoClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

/// Whether a request must carry the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    /// Sent with the token when one is set.
    Optional,
    /// Fails with [`ApiError::NoToken`] when no token is set.
    Required,
}

impl BazaryoClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bazaryo-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BazaryoClientInner {
                client,
                base_url: config.api_url.clone(),
                token: RwLock::new(config.api_token.clone()),
                cache,
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Token
    // =========================================================================

    /// Set the bearer token directly (for loading a saved session).
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Get the current token (if set).
    pub async fn token(&self) -> Option<SecretString> {
        self.inner.token.read().await.clone()
    }

    /// Check whether a token is set.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Clear the token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Absolute URL for a path below the base URL. Segments are
    /// percent-encoded, so ids can never escape their position.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Start a request to `segments`, attaching the bearer token.
    pub(crate) async fn request(
        &self,
        method: Method,
        segments: &[&str],
        auth: Auth,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        let builder = self.inner.client.request(method, url);

        let token = self.inner.token.read().await;
        match (token.as_ref(), auth) {
            (Some(token), _) => Ok(builder.bearer_auth(token.expose_secret())),
            (None, Auth::Optional) => Ok(builder),
            (None, Auth::Required) => Err(ApiError::NoToken),
        }
    }

    /// Send a request and decode the JSON response body.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(Self::handle_error_status(status, response).await)
        }
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(Self::handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(status: StatusCode, response: Response) -> ApiError {
        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return ApiError::RateLimited(retry_after);
        }

        let message = match response.text().await {
            Ok(body) => ErrorBody::message_from(&body),
            Err(e) => return ApiError::Http(e),
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    pub(crate) async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let value = self.inner.cache.get(key).await;
        if value.is_some() {
            debug!(?key, "Cache hit");
        }
        value
    }

    pub(crate) async fn cache(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    /// Invalidate all cached shops and products.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
