//! Requests and per-request options.

use crate::breaker::CircuitBreakerStrategy;
use crate::client::AuthorizationProvider;
use crate::retry::RetryStrategy;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use url::Url;

/// One HTTP request as the caller describes it.
///
/// The client never mutates the value it is given; `execute` works on a
/// merged copy that folds in the configuration's defaults.
#[derive(Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub options: Options,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            options: Options::default(),
        }
    }

    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    #[must_use]
    pub fn head(url: Url) -> Self {
        Self::new(Method::HEAD, url)
    }

    #[must_use]
    pub fn put(url: Url, body: Vec<u8>) -> Self {
        Self::new(Method::PUT, url).with_body(body)
    }

    #[must_use]
    pub fn post(url: Url, body: Vec<u8>) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    #[must_use]
    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Set one header, replacing any existing value under the same name.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge a whole header map into the request.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }
}

/// Per-request knobs, each overriding the configuration where set.
#[derive(Clone)]
pub struct Options {
    /// Retry strategy consulted by `should_retry`; overrides the
    /// configuration default when set.
    pub retry_strategy: Option<RetryStrategy>,
    /// Circuit-breaker strategy for error bookkeeping and
    /// `should_circuit_break`; overrides the configuration default.
    pub circuit_breaker_strategy: Option<CircuitBreakerStrategy>,
    /// Abort the transfer once the received body exceeds this many bytes.
    pub maximum_response_size: Option<u64>,
    /// When set, any response status outside this list fails the request.
    pub valid_response_codes: Option<Vec<StatusCode>>,
    /// Add a `User-Agent` header when the request carries none. On by
    /// default.
    pub add_user_agent: bool,
    /// Authorization provider for this request alone; overrides the
    /// configuration's provider.
    pub authorization_provider: Option<AuthorizationProvider>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            retry_strategy: None,
            circuit_breaker_strategy: None,
            maximum_response_size: None,
            valid_response_codes: None,
            add_user_agent: true,
            authorization_provider: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://registry.tephra.dev/packages").unwrap()
    }

    #[test]
    fn method_constructors_set_the_method() {
        assert_eq!(Request::get(url()).method, Method::GET);
        assert_eq!(Request::head(url()).method, Method::HEAD);
        assert_eq!(Request::delete(url()).method, Method::DELETE);

        let post = Request::post(url(), b"payload".to_vec());
        assert_eq!(post.method, Method::POST);
        assert_eq!(post.body.as_deref(), Some(b"payload".as_slice()));
    }

    #[test]
    fn builders_accumulate() {
        let request = Request::get(url())
            .with_header(http::header::ACCEPT, HeaderValue::from_static("application/json"))
            .with_body(b"x".to_vec());
        assert_eq!(
            request.headers.get(http::header::ACCEPT).unwrap(),
            "application/json"
        );
        assert!(request.body.is_some());
    }

    #[test]
    fn options_default_to_user_agent_on_and_nothing_else() {
        let options = Options::default();
        assert!(options.add_user_agent);
        assert!(options.retry_strategy.is_none());
        assert!(options.circuit_breaker_strategy.is_none());
        assert!(options.maximum_response_size.is_none());
        assert!(options.valid_response_codes.is_none());
        assert!(options.authorization_provider.is_none());
    }
}
