//! HTTP client for the Tryla REST backend.
//!
//! Every request goes through [`ApiClient`], which owns the concerns that
//! would otherwise be repeated at each call site:
//!
//! - Bearer-token attachment from the injected [`SessionHandle`]
//! - 401 handling: clear the session and navigate to `/login`
//! - Error-message extraction from non-success JSON bodies
//! - Coalesced, cached catalog reads via `moka` (5 minute TTL by default)

mod cache;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::future::Cache;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::notify::{Route, UiSink};
use crate::session::SessionHandle;

pub(crate) use cache::{CacheKey, CacheValue};

/// Longest slice of a response body copied into logs.
const LOG_BODY_LIMIT: usize = 500;

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// No `Authorization` header.
    Public,
    /// Requires a session; fails with `NotAuthenticated` before sending
    /// anything when there is none.
    Bearer,
}

/// Client for the Tryla REST backend.
///
/// Cheaply cloneable; clones share the HTTP connection pool, session, sink
/// and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionHandle,
    sink: Arc<dyn UiSink>,
    cache: Cache<(u64, CacheKey), CacheValue>,
    /// Bumped on every invalidation. Part of the cache key, so reads after a
    /// mutation never join a load that started before it.
    generation: AtomicU64,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        session: SessionHandle,
        sink: Arc<dyn UiSink>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.clone(),
                session,
                sink,
                cache,
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    /// The sink receiving toasts and navigation requests.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn UiSink> {
        &self.inner.sink
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build the URL for an endpoint from path segments.
    ///
    /// Segments are percent-encoded, so ids cannot escape their position.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check that the backend answers at all. Any HTTP status counts.
    ///
    /// # Errors
    ///
    /// Returns an error if no response arrives.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self.inner.http.get(self.inner.base_url.clone()).send().await?;
        debug!(status = %response.status(), "backend reachable");
        Ok(())
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Send a request and decode a JSON response body.
    pub(crate) async fn send_json<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        auth: Auth,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.send(method, segments, auth, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&text),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is not needed.
    pub(crate) async fn send_unit<B>(
        &self,
        method: Method,
        segments: &[&str],
        auth: Auth,
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, segments, auth, body).await.map(drop)
    }

    /// Send a request and return the raw success body.
    #[instrument(skip(self, body), fields(path = %segments.join("/")))]
    async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        auth: Auth,
        body: Option<&B>,
    ) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let mut request = self.inner.http.request(method.clone(), url);

        let sent_token = if auth == Auth::Bearer {
            let token = self
                .inner
                .session
                .token()
                .await
                .ok_or(ApiError::NotAuthenticated)?;
            request = request.bearer_auth(token.expose_secret());
            Some(token)
        } else {
            None
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(%method, %status, "backend responded");

        if status.is_success() {
            return Ok(text);
        }

        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = &sent_token {
                self.expire_session(token).await;
                return Err(ApiError::Unauthorized);
            }
        }

        let message = error_message(&text)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        tracing::warn!(
            %method,
            %status,
            body = %truncate(&text),
            "backend returned non-success status"
        );
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(message));
        }
        Err(ApiError::Status { status, message })
    }

    /// Clear the rejected session and send the user to the login page.
    ///
    /// A rejection for a token that has since been replaced by a new login
    /// leaves the new session alone.
    async fn expire_session(&self, token: &SecretString) {
        match self.inner.session.end_if_current(token).await {
            Ok(false) => {
                debug!("stale bearer token rejected, keeping newer session");
                return;
            }
            Ok(true) => tracing::warn!("bearer token rejected, clearing session"),
            Err(e) => tracing::error!(error = %e, "failed to clear stored session"),
        }
        self.inner.sink.navigate(Route::Login);
    }

    // =========================================================================
    // Catalog cache
    // =========================================================================

    /// Read through the catalog cache.
    ///
    /// Concurrent callers asking for the same key share one in-flight request.
    /// Failures are not cached.
    pub(crate) async fn cached<F>(&self, key: CacheKey, load: F) -> Result<CacheValue, ApiError>
    where
        F: Future<Output = Result<CacheValue, ApiError>>,
    {
        let generation = self.inner.generation.load(Ordering::Acquire);
        self.inner
            .cache
            .try_get_with((generation, key), load)
            .await
            .map_err(ApiError::from)
    }

    /// Drop every cached catalog response (after an admin mutation).
    ///
    /// Loads still in flight finish under the old generation and are never
    /// read again.
    pub(crate) fn invalidate_catalog(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, "invalidating catalog cache");
        self.inner.cache.invalidate_all();
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map(ToString::to_string)
}

fn truncate(text: &str) -> String {
    text.chars().take(LOG_BODY_LIMIT).collect()
}
