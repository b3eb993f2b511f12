//! The transport seam between the client and the network.
//!
//! The client owns policy (admission, merging, breaker bookkeeping,
//! status validation); a [`Transport`] owns exactly one HTTP exchange.
//! Production code uses [`ReqwestTransport`]; tests inject mocks.

use crate::error::HttpClientError;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use std::time::Duration;

/// Streaming progress callback: bytes received so far and the expected
/// total when the transport knows it. Returning an error aborts the
/// transfer immediately. Handlers may borrow caller state for the
/// duration of the request.
pub type ProgressHandler<'a> =
    dyn Fn(u64, Option<u64>) -> Result<(), HttpClientError> + Send + Sync + 'a;

/// Performs one HTTP exchange with an already-merged request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: Request,
        progress: Option<&ProgressHandler<'_>>,
    ) -> Result<Response, HttpClientError>;
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The default transport, a shared `reqwest` client with a request
/// timeout. Wall-clock bounds live here; the client above imposes none.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the transport with the default sixty-second request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::Construction`] when the underlying
    /// client cannot be built.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Build the transport with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::Construction`] when the underlying
    /// client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| HttpClientError::Construction(Box::new(error)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: Request,
        progress: Option<&ProgressHandler<'_>>,
    ) -> Result<Response, HttpClientError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let mut upstream = builder.send().await.map_err(HttpClientError::transport)?;
        let status = upstream.status();
        let headers = upstream.headers().clone();
        let expected = upstream.content_length();

        // Stream the body so oversized responses are cut off mid-transfer
        // instead of after the fact.
        let mut body = Vec::new();
        while let Some(chunk) = upstream.chunk().await.map_err(HttpClientError::transport)? {
            body.extend_from_slice(&chunk);
            if let Some(progress) = progress {
                progress(body.len() as u64, expected)?;
            }
        }

        let body = if body.is_empty() { None } else { Some(body) };
        Ok(Response::new(status, headers, body))
    }
}
