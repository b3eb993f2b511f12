//! Responses.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// One HTTP response as the transport produced it.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Option<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A bare response with the given status, no headers, no body.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), None)
    }

    /// A 200 response carrying `body`.
    #[must_use]
    pub fn okay(body: Option<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), body)
    }

    /// Decode the body as JSON. A missing body decodes like an empty
    /// document and fails accordingly.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when the body is absent
    /// or not valid JSON for `T`.
    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.body.as_deref().unwrap_or_default())
    }
}
