//! Error taxonomy for the HTTP client.

use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while executing a request.
#[derive(Error, Debug)]
pub enum HttpClientError {
    /// The transport failed before producing a response. The underlying
    /// cause is carried opaquely and never reinterpreted.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response body grew past the request's maximum response size.
    /// The transfer is aborted as soon as the cap is crossed.
    #[error("response larger than the maximum of {limit} bytes")]
    ResponseTooLarge { limit: u64 },

    /// The response status code was outside the request's valid set.
    #[error("bad response status code: {0}")]
    BadResponseStatusCode(StatusCode),

    /// The per-host circuit breaker is open for this host. The client
    /// never raises this itself; callers consulting
    /// `should_circuit_break` surface it from their own loops.
    #[error("circuit breaker triggered for host '{host}'")]
    CircuitBreakerTriggered { host: String },

    /// An authorization provider produced a credential that is not a
    /// valid header value.
    #[error("invalid authorization header value")]
    InvalidAuthorizationHeader(#[from] http::header::InvalidHeaderValue),

    /// The underlying transport client could not be constructed.
    #[error("failed to construct HTTP client: {0}")]
    Construction(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HttpClientError {
    /// Wrap an arbitrary transport failure.
    #[must_use]
    pub fn transport(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(error))
    }
}
