//! Bearer token providers and 401 refresh handlers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;

/// Supplies a bearer token before each attempt.
///
/// Returning `Ok(None)` or an empty string sends the request without an
/// `Authorization` header. Errors are logged and treated the same way.
pub trait TokenProvider: Send + Sync {
    /// Resolves the current token.
    fn token(&self) -> BoxFuture<'_, Result<Option<String>>>;
}

impl<F, Fut> TokenProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    fn token(&self) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(self())
    }
}

/// Invoked once per call when a request comes back with HTTP 401.
pub trait RefreshHandler: Send + Sync {
    /// Refreshes credentials so the next token resolution succeeds.
    fn refresh(&self) -> BoxFuture<'_, Result<()>>;
}

impl<F, Fut> RefreshHandler for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn refresh(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self())
    }
}

/// A fixed token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps a raw token (without the `Bearer ` prefix).
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken").field(&"<redacted>").finish()
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move { Ok(Some(self.0.clone())) })
    }
}

/// Reads the token from an environment variable at request time.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Environment variable holding the TMDB read access token.
    pub const DEFAULT_VAR: &'static str = "TMDB_READ_ACCESS_TOKEN";

    /// Reads from `var`.
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VAR)
    }
}

impl TokenProvider for EnvToken {
    fn token(&self) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move { Ok(std::env::var(&self.var).ok()) })
    }
}

/// Snapshot of the auth hooks used by a gateway.
///
/// Replaced wholesale by [`Gateway::reconfigure`](super::Gateway::reconfigure);
/// a request reads the current snapshot at the start of every attempt.
#[derive(Clone, Default)]
pub struct AuthHooks {
    /// Token provider, if any.
    pub token_provider: Option<Arc<dyn TokenProvider>>,
    /// 401 refresh handler, if any.
    pub refresh_handler: Option<Arc<dyn RefreshHandler>>,
}

impl AuthHooks {
    /// Resolves a token from the provider.
    ///
    /// Provider failures are swallowed so the request proceeds unauthenticated.
    pub(crate) async fn resolve_token(&self) -> Option<String> {
        let provider = self.token_provider.as_ref()?;
        match provider.token().await {
            Ok(Some(token)) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "token provider failed; sending request without Authorization");
                None
            }
        }
    }
}

impl fmt::Debug for AuthHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHooks")
            .field("token_provider", &self.token_provider.is_some())
            .field("refresh_handler", &self.refresh_handler.is_some())
            .finish()
    }
}

/// Changes applied by [`Gateway::reconfigure`](super::Gateway::reconfigure).
///
/// `None` leaves a hook untouched, `Some(None)` removes it.
#[derive(Default)]
pub struct AuthUpdate {
    /// New token provider.
    pub token_provider: Option<Option<Arc<dyn TokenProvider>>>,
    /// New refresh handler.
    pub refresh_handler: Option<Option<Arc<dyn RefreshHandler>>>,
}

impl AuthUpdate {
    /// Replaces the token provider.
    #[must_use]
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Some(Arc::new(provider)));
        self
    }

    /// Removes the token provider.
    #[must_use]
    pub fn clear_token_provider(mut self) -> Self {
        self.token_provider = Some(None);
        self
    }

    /// Replaces the refresh handler.
    #[must_use]
    pub fn refresh_handler(mut self, handler: impl RefreshHandler + 'static) -> Self {
        self.refresh_handler = Some(Some(Arc::new(handler)));
        self
    }

    /// Removes the refresh handler.
    #[must_use]
    pub fn clear_refresh_handler(mut self) -> Self {
        self.refresh_handler = Some(None);
        self
    }

    /// Applies the update on top of `current`.
    pub(crate) fn apply(self, current: &AuthHooks) -> AuthHooks {
        AuthHooks {
            token_provider: self
                .token_provider
                .unwrap_or_else(|| current.token_provider.clone()),
            refresh_handler: self
                .refresh_handler
                .unwrap_or_else(|| current.refresh_handler.clone()),
        }
    }
}

impl fmt::Debug for AuthUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthUpdate")
            .field("token_provider", &self.token_provider.as_ref().map(Option::is_some))
            .field("refresh_handler", &self.refresh_handler.as_ref().map(Option::is_some))
            .finish()
    }
}
