//! HTTP request gateway module.
//!
//! Every call to the catalog API goes through [`Gateway`], which resolves a
//! bearer token per attempt, retries transient failures with exponential
//! backoff, recovers once from HTTP 401 and reports failures as [`ApiError`].

mod auth;
mod backoff;
mod client;
mod error;
mod options;

pub use auth::{AuthHooks, AuthUpdate, EnvToken, RefreshHandler, StaticToken, TokenProvider};
pub use backoff::{RetryPolicy, Sleeper, TokioSleeper};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Gateway, GatewayBuilder};
pub use error::{ApiError, BoxError, ErrorKind, Outcome};
pub use options::{DEFAULT_RETRY_DELAY, Method, RequestOptions, TransportConfig};
pub use tokio_util::sync::CancellationToken;
