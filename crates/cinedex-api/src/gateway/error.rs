//! Normalized gateway errors.

use std::error::Error as StdError;
use std::fmt;

use serde::Deserialize;

/// Boxed underlying failure kept for diagnostics.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller cancelled the call.
    Cancelled,
    /// No response was received (DNS, connect, timeout, broken body stream).
    Network,
    /// HTTP 5xx or 429.
    Server,
    /// Any other non-2xx status.
    Client,
    /// A successful response whose body did not decode into the expected type.
    Decode,
    /// The request could not be built; nothing was sent.
    InvalidRequest,
}

impl ErrorKind {
    /// Classifies a non-success HTTP status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        if status == 429 || (status >= 500 && status < 600) {
            Self::Server
        } else {
            Self::Client
        }
    }

    /// Whether failures of this kind may be retried.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cancelled => "cancelled",
            Self::Network => "network",
            Self::Server => "server",
            Self::Client => "client",
            Self::Decode => "decode",
            Self::InvalidRequest => "invalid request",
        };
        f.write_str(name)
    }
}

/// Uniform failure value produced for every unsuccessful gateway call.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
#[allow(clippy::module_name_repetitions)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    data: Option<serde_json::Value>,
    #[source]
    source: Option<BoxError>,
}

impl ApiError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            data: None,
            source: None,
        }
    }

    /// Error for a call aborted through its cancellation token.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "request cancelled")
    }

    /// Builds an error from a non-success response.
    ///
    /// `body` is kept as JSON when it parses, otherwise as a JSON string.
    /// TMDB error envelopes contribute their `status_message` to the message.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let data = if body.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<serde_json::Value>(body)
                    .unwrap_or_else(|_| serde_json::Value::String(String::from(body))),
            )
        };

        let envelope = data
            .as_ref()
            .and_then(|v| TmdbErrorResponse::deserialize(v).ok());
        let message = envelope.map_or_else(
            || format!("request failed with status code {status}"),
            |e| {
                format!(
                    "request failed with status code {status}: code={}, message={}",
                    e.status_code, e.status_message
                )
            },
        );

        Self {
            kind: ErrorKind::from_status(status),
            message,
            status: Some(status),
            data,
            source: None,
        }
    }

    /// Attaches the HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches the underlying failure.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Raw response payload, when one was received.
    #[must_use]
    pub const fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Whether the retry policy may re-attempt after this failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Whether this is a 401 response eligible for token refresh.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// TMDB error envelope (`{"status_code":7,"status_message":"...","success":false}`).
#[derive(Debug, Deserialize)]
struct TmdbErrorResponse {
    status_code: i64,
    status_message: String,
}

/// Result of a call whose failures are resolved rather than raised.
///
/// Returned by the gateway in both modes: with `throw_on_error` set a
/// failure is an `Err(ApiError)`, without it a failure arrives as
/// [`Outcome::Rejected`].
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    /// The call succeeded.
    Resolved(T),
    /// The call failed and the caller asked not to raise.
    Rejected(ApiError),
}

impl<T> Outcome<T> {
    /// Converts into a plain `Result`.
    ///
    /// # Errors
    ///
    /// Returns the carried [`ApiError`] for [`Outcome::Rejected`].
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Self::Resolved(value) => Ok(value),
            Self::Rejected(err) => Err(err),
        }
    }

    /// Whether the call succeeded.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Borrows the failure, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<&ApiError> {
        match self {
            Self::Resolved(_) => None,
            Self::Rejected(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_status_classification() {
        // Arrange & Act & Assert
        assert_eq!(ErrorKind::from_status(500), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(599), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Client);
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Client);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::Client);
        assert_eq!(ErrorKind::from_status(600), ErrorKind::Client);
    }

    #[test]
    fn test_retryable_kinds() {
        // Arrange & Act & Assert
        assert!(ErrorKind::Network.is_retryable());
        assert!(ErrorKind::Server.is_retryable());
        assert!(!ErrorKind::Client.is_retryable());
        assert!(!ErrorKind::Cancelled.is_retryable());
        assert!(!ErrorKind::Decode.is_retryable());
        assert!(!ErrorKind::InvalidRequest.is_retryable());
    }

    #[test]
    fn test_from_response_parses_tmdb_envelope() {
        // Arrange
        let body = r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#;

        // Act
        let err = ApiError::from_response(401, body);

        // Assert
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("Invalid API key"));
        assert_eq!(err.data().unwrap()["status_code"], 7);
    }

    #[test]
    fn test_from_response_keeps_plain_body() {
        // Arrange & Act
        let err = ApiError::from_response(502, "Bad Gateway");

        // Assert
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "request failed with status code 502");
        assert_eq!(
            err.data(),
            Some(&serde_json::Value::String(String::from("Bad Gateway")))
        );
    }

    #[test]
    fn test_from_response_empty_body_has_no_data() {
        // Arrange & Act
        let err = ApiError::from_response(404, "");

        // Assert
        assert!(err.data().is_none());
    }

    #[test]
    fn test_cancelled_has_no_status() {
        // Arrange & Act
        let err = ApiError::cancelled();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(err.status().is_none());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_source_is_exposed() {
        // Arrange
        let io = std::io::Error::other("connection reset");

        // Act
        let err = ApiError::new(ErrorKind::Network, "request failed").with_source(io);

        // Assert
        let source = StdError::source(&err).unwrap();
        assert_eq!(source.to_string(), "connection reset");
    }

    #[test]
    fn test_outcome_into_result() {
        // Arrange
        let ok: Outcome<u32> = Outcome::Resolved(1);
        let rejected: Outcome<u32> = Outcome::Rejected(ApiError::cancelled());

        // Act & Assert
        assert!(ok.is_resolved());
        assert_eq!(ok.into_result().unwrap(), 1);
        assert!(rejected.rejection().is_some());
        assert_eq!(
            rejected.into_result().unwrap_err().kind(),
            ErrorKind::Cancelled
        );
    }
}
