//! `Gateway` - HTTP request gateway implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;

use super::auth::{AuthHooks, AuthUpdate, RefreshHandler, TokenProvider};
use super::backoff::{CallState, RetryPolicy, Sleeper, TokioSleeper};
use super::error::{ApiError, ErrorKind, Outcome};
use super::options::{Method, RequestOptions};

/// Default base URL for TMDB API v3.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Centralized HTTP gateway for the catalog API.
///
/// Owns the base URL, default headers, timeout and auth hooks. Holds no
/// per-call state: concurrent calls are independent and never coalesced.
pub struct Gateway {
    /// HTTP client.
    http_client: Client,
    /// Base URL (always ends with `/`).
    base_url: Url,
    /// Headers sent with every request, before per-call overrides.
    default_headers: Vec<(String, String)>,
    /// Query parameters sent with every request.
    default_query: Vec<(String, String)>,
    /// Gateway-wide timeout.
    timeout: Duration,
    /// Current auth snapshot.
    hooks: RwLock<Arc<AuthHooks>>,
    /// Backoff delay function.
    sleeper: Arc<dyn Sleeper>,
}

/// Builder for `Gateway`.
#[allow(clippy::module_name_repetitions)]
pub struct GatewayBuilder {
    base_url: Option<Url>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Vec<(String, String)>,
    default_query: Vec<(String, String)>,
    hooks: AuthHooks,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl GatewayBuilder {
    /// Creates a new builder.
    fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            user_agent: None,
            default_headers: vec![(
                String::from(CONTENT_TYPE.as_str()),
                String::from("application/json"),
            )],
            default_query: Vec::new(),
            hooks: AuthHooks::default(),
            sleeper: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the request timeout (default: 15s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Adds a default header; later entries win over earlier ones.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query parameter sent with every request.
    #[must_use]
    pub fn default_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_query.push((name.into(), value.into()));
        self
    }

    /// Sets the bearer token provider.
    #[must_use]
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.hooks.token_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the 401 refresh handler.
    #[must_use]
    pub fn refresh_handler(mut self, handler: impl RefreshHandler + 'static) -> Self {
        self.hooks.refresh_handler = Some(Arc::new(handler));
        self
    }

    /// Replaces the backoff delay function.
    #[must_use]
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Builds the gateway.
    ///
    /// # Errors
    ///
    /// - The default base URL fails to parse.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<Gateway> {
        let mut base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let user_agent = self.user_agent.unwrap_or_else(|| {
            String::from(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        });
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Gateway {
            http_client,
            base_url,
            default_headers: self.default_headers,
            default_query: self.default_query,
            timeout,
            hooks: RwLock::new(Arc::new(self.hooks)),
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
        })
    }
}

impl fmt::Debug for GatewayBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// One logical call, built once and re-sent on every attempt.
struct RequestDescriptor {
    method: Method,
    url: Url,
    body: Option<Vec<u8>>,
    options: RequestOptions,
}

impl Gateway {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Gateway-wide request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current auth snapshot.
    pub async fn auth_hooks(&self) -> Arc<AuthHooks> {
        Arc::clone(&*self.hooks.read().await)
    }

    /// Swaps the token provider and/or refresh handler.
    ///
    /// Takes effect from the next attempt; returns the new effective snapshot.
    pub async fn reconfigure(&self, update: AuthUpdate) -> Arc<AuthHooks> {
        let mut guard = self.hooks.write().await;
        let next = Arc::new(update.apply(&guard));
        *guard = Arc::clone(&next);
        tracing::debug!(hooks = ?next, "gateway auth reconfigured");
        next
    }

    /// Executes one logical call with auth, retry and error normalization.
    ///
    /// `body` is ignored for GET and DELETE.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ApiError`] when the call fails and
    /// `options.throw_on_error` is set. Otherwise failures are returned as
    /// [`Outcome::Rejected`] and this never errors.
    pub async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<Outcome<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let throw_on_error = options.throw_on_error;
        match self.run(method, path, body, options).await {
            Ok(value) => Ok(Outcome::Resolved(value)),
            Err(err) if throw_on_error => Err(err),
            Err(err) => Ok(Outcome::Rejected(err)),
        }
    }

    /// Sends a GET request with extra query parameters.
    ///
    /// # Errors
    ///
    /// See [`Gateway::execute`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        options: RequestOptions,
    ) -> Result<Outcome<T>, ApiError> {
        self.execute::<T, ()>(Method::Get, path, None, options.with_params(params))
            .await
    }

    /// Sends a DELETE request with extra query parameters.
    ///
    /// # Errors
    ///
    /// See [`Gateway::execute`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        options: RequestOptions,
    ) -> Result<Outcome<T>, ApiError> {
        self.execute::<T, ()>(Method::Delete, path, None, options.with_params(params))
            .await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::execute`].
    pub async fn post<T, B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<Outcome<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::Post, path, Some(body), options).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::execute`].
    pub async fn put<T, B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<Outcome<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::Put, path, Some(body), options).await
    }

    /// Sends a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Gateway::execute`].
    pub async fn patch<T, B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<Outcome<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::Patch, path, Some(body), options).await
    }

    /// Drives the per-call state machine to a terminal state.
    #[instrument(skip_all, fields(method = method.as_str(), path = %path))]
    async fn run<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let descriptor = self.describe(method, path, body, options)?;
        let policy = RetryPolicy::new(descriptor.options.retry, descriptor.options.retry_delay);
        let mut refreshed = false;
        let mut state = CallState::start();

        loop {
            state = match state {
                CallState::Pending { attempt } => {
                    let attempt = attempt.saturating_add(1);
                    tracing::debug!(attempt, "dispatching request");
                    let result = self.dispatch(&descriptor, &mut refreshed).await;
                    CallState::settle(attempt, result, &policy)
                }
                CallState::Retrying { attempt, delay } => {
                    let backoff = self.sleeper.sleep(delay);
                    match descriptor.options.cancel.as_ref() {
                        Some(token) => {
                            tokio::select! {
                                biased;
                                () = token.cancelled() => CallState::Failed(ApiError::cancelled()),
                                () = backoff => CallState::Pending { attempt },
                            }
                        }
                        None => {
                            backoff.await;
                            CallState::Pending { attempt }
                        }
                    }
                }
                CallState::Resolved(value) => return Ok(value),
                CallState::Failed(err) => {
                    tracing::debug!(kind = %err.kind(), status = ?err.status(), "request failed");
                    return Err(err);
                }
            };
        }
    }

    /// Builds the descriptor: resolves the URL and serializes the body once.
    fn describe<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<RequestDescriptor, ApiError> {
        let url = resolve_url(&self.base_url, path)?;
        let body = match body {
            Some(b) if method.carries_body() => Some(serde_json::to_vec(b).map_err(|e| {
                ApiError::new(ErrorKind::InvalidRequest, "failed to serialize request body")
                    .with_source(e)
            })?),
            _ => None,
        };
        Ok(RequestDescriptor {
            method,
            url,
            body,
            options,
        })
    }

    /// Sends one attempt, with single-shot recovery on HTTP 401.
    ///
    /// The recovery re-issue replaces the attempt's result and does not
    /// count against the retry budget.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
        refreshed: &mut bool,
    ) -> Result<T, ApiError> {
        let err = match self.send_once(descriptor).await {
            Err(err) if err.is_unauthorized() && !*refreshed => err,
            other => return other,
        };

        let hooks = self.auth_hooks().await;
        let Some(handler) = hooks.refresh_handler.as_ref() else {
            return Err(err);
        };
        *refreshed = true;

        match handler.refresh().await {
            Ok(()) => {
                tracing::debug!("credentials refreshed; re-issuing request");
                self.send_once(descriptor).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "credential refresh failed");
                Err(err)
            }
        }
    }

    /// Resolves a fresh token and sends a single request.
    async fn send_once<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ApiError> {
        let cancel = descriptor.options.cancel.as_ref();
        if cancel.is_some_and(tokio_util::sync::CancellationToken::is_cancelled) {
            return Err(ApiError::cancelled());
        }

        let token = self.auth_hooks().await.resolve_token().await;
        let request = self.build_request(descriptor, token.as_deref())?;
        tracing::debug!(url = %request.url(), "API request");

        let exchange = self.exchange(request);
        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(ApiError::cancelled()),
                    result = exchange => result,
                }
            }
            None => exchange.await,
        }
    }

    /// Merges defaults, transport overrides, per-call headers and auth.
    fn build_request(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&str>,
    ) -> Result<reqwest::Request, ApiError> {
        let options = &descriptor.options;

        let mut headers = HeaderMap::new();
        for (name, value) in self
            .default_headers
            .iter()
            .chain(&options.transport.headers)
            .chain(&options.headers)
        {
            headers.insert(header_name(name)?, header_value(value)?);
        }
        if let Some(token) = token {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
        }

        let mut builder = self
            .http_client
            .request(descriptor.method.into(), descriptor.url.clone())
            .headers(headers);
        if !self.default_query.is_empty() {
            builder = builder.query(&self.default_query);
        }
        if !options.transport.query.is_empty() {
            builder = builder.query(&options.transport.query);
        }
        if let Some(timeout) = options.transport.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(ref body) = descriptor.body {
            builder = builder.body(body.clone());
        }

        builder.build().map_err(|e| {
            ApiError::new(ErrorKind::InvalidRequest, format!("failed to build request: {e}"))
                .with_source(e)
        })
    }

    /// Sends the request and normalizes the response.
    async fn exchange<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T, ApiError> {
        let response = self.http_client.execute(request).await.map_err(|e| {
            ApiError::new(ErrorKind::Network, format!("request failed: {e}")).with_source(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ApiError::new(ErrorKind::Network, "failed to read response body")
                .with_status(status.as_u16())
                .with_source(e)
        })?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }

        decode_body(&body)
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("default_query", &self.default_query)
            .finish_non_exhaustive()
    }
}

/// Resolves `path` under `base`; a leading `/` stays under the base path.
fn resolve_url(base: &Url, path: &str) -> Result<Url, ApiError> {
    let relative = path.trim_start_matches('/');
    let url = base.join(relative).map_err(|e| {
        ApiError::new(ErrorKind::InvalidRequest, format!("failed to join URL path: {path}"))
            .with_source(e)
    })?;
    if !url.as_str().starts_with(base.as_str()) {
        return Err(ApiError::new(
            ErrorKind::InvalidRequest,
            format!("path escapes the base URL: {path}"),
        ));
    }
    Ok(url)
}

/// Decodes a success body; an empty body decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| {
        ApiError::new(ErrorKind::Decode, format!("failed to decode JSON response: {e}"))
            .with_source(e)
    })
}

fn header_name(name: &str) -> Result<HeaderName, ApiError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        ApiError::new(ErrorKind::InvalidRequest, format!("invalid header name: {name}"))
            .with_source(e)
    })
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| {
        ApiError::new(ErrorKind::InvalidRequest, "invalid header value").with_source(e)
    })
}
