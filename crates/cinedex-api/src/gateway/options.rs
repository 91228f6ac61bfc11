//! Per-call request options.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(300);

/// HTTP verbs accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
}

impl Method {
    /// Whether a request body is sent for this verb.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        !matches!(self, Self::Get | Self::Delete)
    }

    /// Canonical upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
        }
    }
}

/// Transport-level overrides merged with the gateway's computed config.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Query parameters appended after the gateway defaults.
    pub query: Vec<(String, String)>,
    /// Headers applied over the gateway defaults.
    pub headers: Vec<(String, String)>,
    /// Overrides the gateway-wide timeout for this call.
    pub timeout: Option<Duration>,
}

/// Options recognized by [`Gateway::execute`](super::Gateway::execute).
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Cancellation signal observed before and during each attempt.
    pub cancel: Option<CancellationToken>,
    /// Per-call headers, applied over defaults and transport headers.
    pub headers: Vec<(String, String)>,
    /// Transport-level overrides.
    pub transport: TransportConfig,
    /// Number of retries on retryable failures.
    pub retry: u32,
    /// Base delay; retry `n` waits `retry_delay * 2^(n-1)`.
    pub retry_delay: Duration,
    /// Return failures as `Err` (default) instead of [`Outcome::Rejected`](super::Outcome::Rejected).
    pub throw_on_error: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            cancel: None,
            headers: Vec::new(),
            transport: TransportConfig::default(),
            retry: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            throw_on_error: true,
        }
    }
}

impl RequestOptions {
    /// Creates options with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry count.
    #[must_use]
    pub const fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the backoff base delay.
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Selects raise (`true`) or resolve-with-error (`false`).
    #[must_use]
    pub const fn throw_on_error(mut self, throw: bool) -> Self {
        self.throw_on_error = throw;
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Adds a per-call header override.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query parameter to the transport config.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.transport.query.push((name.into(), value.into()));
        self
    }

    /// Overrides the timeout for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = Some(timeout);
        self
    }

    /// Merges query parameters from a convenience call into the transport config.
    pub(crate) fn with_params(mut self, params: &[(&str, String)]) -> Self {
        self.transport.query.extend(
            params
                .iter()
                .map(|(name, value)| (String::from(*name), value.clone())),
        );
        self
    }
}
