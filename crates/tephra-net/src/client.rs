//! The resilient HTTP client.
//!
//! [`HttpClient`] wraps a [`Transport`] with the policy the package
//! toolchain needs when it hammers registries and artifact hosts:
//! - a concurrency ceiling enforced by a token bucket
//! - configuration defaults merged into every request
//! - `User-Agent` and `Authorization` injection
//! - a response-size cap enforced mid-transfer
//! - server-error bookkeeping behind [`should_retry`] and
//!   [`should_circuit_break`]
//!
//! `execute` makes exactly one attempt. Retry loops belong to the caller,
//! which asks `should_retry` for a backoff delay and `should_circuit_break`
//! before dispatching to a host at all.
//!
//! [`should_retry`]: HttpClient::should_retry
//! [`should_circuit_break`]: HttpClient::should_circuit_break

use crate::breaker::{CircuitBreakerStrategy, HostErrorTracker};
use crate::error::HttpClientError;
use crate::request::Request;
use crate::response::Response;
use crate::retry::RetryStrategy;
use crate::token_bucket::TokenBucket;
use crate::transport::{ProgressHandler, ReqwestTransport, Transport};
use http::header::{AUTHORIZATION, USER_AGENT};
use http::{HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Supplies an `Authorization` header value for a URL, or `None` when the
/// URL gets no credential.
pub type AuthorizationProvider = Arc<dyn Fn(&Url) -> Option<String> + Send + Sync>;

/// Client-wide defaults merged into every request.
#[derive(Clone, Default)]
pub struct Configuration {
    /// Headers appended to every request that does not already carry them.
    pub request_headers: HeaderMap,
    /// Fallback authorization provider for requests without their own.
    pub authorization_provider: Option<AuthorizationProvider>,
    /// Admission ceiling. When unset, `max(4, available parallelism)`.
    pub max_concurrent_requests: Option<usize>,
    /// Default retry strategy consulted by `should_retry`.
    pub retry_strategy: Option<RetryStrategy>,
    /// Default circuit-breaker strategy for server-error bookkeeping.
    pub circuit_breaker_strategy: Option<CircuitBreakerStrategy>,
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(4, |parallelism| parallelism.get().max(4))
}

struct ClientInner {
    configuration: Configuration,
    transport: Box<dyn Transport>,
    token_bucket: TokenBucket,
    host_errors: HostErrorTracker,
}

/// The client. Cloning is cheap; clones share the admission bucket and
/// the host error log.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

impl HttpClient {
    /// A client over the default `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::Construction`] when the transport cannot
    /// be built.
    pub fn new(configuration: Configuration) -> Result<Self, HttpClientError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(configuration, transport))
    }

    /// A client over a caller-supplied transport.
    #[must_use]
    pub fn with_transport<T>(configuration: Configuration, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        let tokens = configuration
            .max_concurrent_requests
            .unwrap_or_else(default_concurrency);
        Self {
            inner: Arc::new(ClientInner {
                token_bucket: TokenBucket::new(tokens),
                host_errors: HostErrorTracker::new(),
                transport: Box::new(transport),
                configuration,
            }),
        }
    }

    /// Execute one request: merge in the configuration's defaults, wait
    /// for an admission token, send, record circuit-breaker bookkeeping,
    /// validate the status code.
    ///
    /// Exactly one attempt is made.
    ///
    /// # Errors
    ///
    /// Transport failures, an oversized response, or a status code outside
    /// the request's valid set.
    pub async fn execute(&self, request: Request) -> Result<Response, HttpClientError> {
        self.perform(request, None).await
    }

    /// Like [`execute`](Self::execute), reporting download progress.
    ///
    /// The callback sees bytes received so far and the expected total when
    /// known; returning an error aborts the transfer. The response-size
    /// cap is checked before the callback runs.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus whatever error the progress
    /// callback returns.
    pub async fn execute_with_progress<F>(
        &self,
        request: Request,
        progress: F,
    ) -> Result<Response, HttpClientError>
    where
        F: Fn(u64, Option<u64>) -> Result<(), HttpClientError> + Send + Sync,
    {
        let progress: &ProgressHandler<'_> = &progress;
        self.perform(request, Some(progress)).await
    }

    async fn perform(
        &self,
        request: Request,
        progress: Option<&ProgressHandler<'_>>,
    ) -> Result<Response, HttpClientError> {
        let request = self.prepare(request)?;

        let cap = request.options.maximum_response_size;
        let guard = move |received: u64, total: Option<u64>| -> Result<(), HttpClientError> {
            if let Some(limit) = cap {
                if received > limit {
                    return Err(HttpClientError::ResponseTooLarge { limit });
                }
            }
            match progress {
                Some(callback) => callback(received, total),
                None => Ok(()),
            }
        };

        let _token = self.inner.token_bucket.acquire().await;
        let response = self
            .inner
            .transport
            .send(request.clone(), Some(&guard))
            .await?;

        self.record_server_error(&request, &response);

        if let Some(valid) = &request.options.valid_response_codes {
            if !valid.contains(&response.status) {
                return Err(HttpClientError::BadResponseStatusCode(response.status));
            }
        }
        Ok(response)
    }

    /// Whether the caller's loop should retry `request` after `response`,
    /// and how long to wait first. `attempt` counts prior attempts,
    /// zero-based.
    ///
    /// Only server errors (status 500 or above, nonstandard codes
    /// included) are worth retrying, and only when a strategy is in
    /// effect (the request's override, else the configuration default).
    #[must_use]
    pub fn should_retry(
        &self,
        response: &Response,
        request: &Request,
        attempt: u32,
    ) -> Option<Duration> {
        let strategy = request
            .options
            .retry_strategy
            .or(self.inner.configuration.retry_strategy)?;
        if response.status.as_u16() < 500 {
            return None;
        }
        strategy.delay(attempt)
    }

    /// Whether the caller should skip `request` because its host crossed
    /// the circuit-breaker threshold recently.
    ///
    /// Advisory only: `execute` dispatches regardless. Callers that honor
    /// it surface [`HttpClientError::CircuitBreakerTriggered`].
    #[must_use]
    pub fn should_circuit_break(&self, request: &Request) -> bool {
        let Some(strategy) = self.effective_breaker_strategy(request) else {
            return false;
        };
        let Some(host) = request.url.host_str() else {
            return false;
        };
        self.inner.host_errors.should_break(host, strategy)
    }

    /// GET with default headers and options.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute).
    pub async fn get(&self, url: Url) -> Result<Response, HttpClientError> {
        self.execute(Request::get(url)).await
    }

    /// HEAD with default headers and options.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute).
    pub async fn head(&self, url: Url) -> Result<Response, HttpClientError> {
        self.execute(Request::head(url)).await
    }

    /// PUT with default headers and options.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute).
    pub async fn put(&self, url: Url, body: Vec<u8>) -> Result<Response, HttpClientError> {
        self.execute(Request::put(url, body)).await
    }

    /// POST with default headers and options.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute).
    pub async fn post(&self, url: Url, body: Vec<u8>) -> Result<Response, HttpClientError> {
        self.execute(Request::post(url, body)).await
    }

    /// DELETE with default headers and options.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute).
    pub async fn delete(&self, url: Url) -> Result<Response, HttpClientError> {
        self.execute(Request::delete(url)).await
    }

    /// Fold the configuration into a caller request: inherit the
    /// authorization provider, append default headers, inject `User-Agent`
    /// and `Authorization` where absent. The caller's value is never
    /// touched; `execute` works on the merged copy.
    fn prepare(&self, mut request: Request) -> Result<Request, HttpClientError> {
        if request.options.authorization_provider.is_none() {
            request.options.authorization_provider = self
                .inner
                .configuration
                .authorization_provider
                .clone();
        }

        for (name, value) in &self.inner.configuration.request_headers {
            let present = request
                .headers
                .get_all(name)
                .iter()
                .any(|existing| existing == value);
            if !present {
                request.headers.append(name.clone(), value.clone());
            }
        }

        if request.options.add_user_agent && !request.headers.contains_key(USER_AGENT) {
            request.headers.insert(
                USER_AGENT,
                HeaderValue::from_static(concat!("tephra/", env!("CARGO_PKG_VERSION"))),
            );
        }

        if !request.headers.contains_key(AUTHORIZATION) {
            if let Some(provider) = &request.options.authorization_provider {
                if let Some(credential) = provider(&request.url) {
                    request
                        .headers
                        .insert(AUTHORIZATION, HeaderValue::from_str(&credential)?);
                }
            }
        }

        Ok(request)
    }

    fn record_server_error(&self, request: &Request, response: &Response) {
        if response.status.as_u16() < 500 {
            return;
        }
        if self.effective_breaker_strategy(request).is_none() {
            return;
        }
        if let Some(host) = request.url.host_str() {
            self.inner.host_errors.record(host);
        }
    }

    fn effective_breaker_strategy(&self, request: &Request) -> Option<CircuitBreakerStrategy> {
        request
            .options
            .circuit_breaker_strategy
            .or(self.inner.configuration.circuit_breaker_strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::header::ACCEPT;
    use http::{Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    /// Serves a fixed status and remembers the merged request it saw.
    struct CaptureTransport {
        status: StatusCode,
        seen: Arc<Mutex<Option<Request>>>,
    }

    impl CaptureTransport {
        fn client(
            status: StatusCode,
            configuration: Configuration,
        ) -> (HttpClient, Arc<Mutex<Option<Request>>>) {
            let seen = Arc::new(Mutex::new(None));
            let transport = Self {
                status,
                seen: Arc::clone(&seen),
            };
            (HttpClient::with_transport(configuration, transport), seen)
        }
    }

    #[async_trait]
    impl Transport for CaptureTransport {
        async fn send(
            &self,
            request: Request,
            _progress: Option<&ProgressHandler<'_>>,
        ) -> Result<Response, HttpClientError> {
            *self.seen.lock().unwrap() = Some(request);
            Ok(Response::from_status(self.status))
        }
    }

    /// Feeds progress callbacks as if a body were streaming in.
    struct StreamingTransport {
        total: u64,
        step: u64,
    }

    #[async_trait]
    impl Transport for StreamingTransport {
        async fn send(
            &self,
            _request: Request,
            progress: Option<&ProgressHandler<'_>>,
        ) -> Result<Response, HttpClientError> {
            let mut received = 0;
            while received < self.total {
                received = (received + self.step).min(self.total);
                if let Some(progress) = progress {
                    progress(received, Some(self.total))?;
                }
            }
            Ok(Response::okay(Some(vec![0u8; self.total as usize])))
        }
    }

    #[tokio::test]
    async fn default_headers_are_appended() {
        let mut configuration = Configuration::default();
        configuration
            .request_headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        let (client, seen) = CaptureTransport::client(StatusCode::OK, configuration);

        client
            .execute(Request::get(url("https://registry.tephra.dev/a")))
            .await
            .unwrap();

        let sent = seen.lock().unwrap().take().unwrap();
        assert_eq!(sent.headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn matching_caller_headers_are_not_duplicated() {
        let mut configuration = Configuration::default();
        configuration
            .request_headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        let (client, seen) = CaptureTransport::client(StatusCode::OK, configuration);

        let request = Request::get(url("https://registry.tephra.dev/a"))
            .with_header(ACCEPT, HeaderValue::from_static("application/json"));
        client.execute(request).await.unwrap();

        let sent = seen.lock().unwrap().take().unwrap();
        assert_eq!(sent.headers.get_all(ACCEPT).iter().count(), 1);
    }

    #[tokio::test]
    async fn user_agent_is_injected_when_absent() {
        let (client, seen) = CaptureTransport::client(StatusCode::OK, Configuration::default());
        client
            .execute(Request::get(url("https://registry.tephra.dev/a")))
            .await
            .unwrap();

        let sent = seen.lock().unwrap().take().unwrap();
        assert_eq!(
            sent.headers.get(USER_AGENT).unwrap().to_str().unwrap(),
            format!("tephra/{}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[tokio::test]
    async fn explicit_user_agent_is_left_alone() {
        let (client, seen) = CaptureTransport::client(StatusCode::OK, Configuration::default());
        let request = Request::get(url("https://registry.tephra.dev/a"))
            .with_header(USER_AGENT, HeaderValue::from_static("tephra-ci/1"));
        client.execute(request).await.unwrap();

        let sent = seen.lock().unwrap().take().unwrap();
        assert_eq!(sent.headers.get(USER_AGENT).unwrap(), "tephra-ci/1");
    }

    #[tokio::test]
    async fn user_agent_can_be_disabled() {
        let (client, seen) = CaptureTransport::client(StatusCode::OK, Configuration::default());
        let mut request = Request::get(url("https://registry.tephra.dev/a"));
        request.options.add_user_agent = false;
        client.execute(request).await.unwrap();

        let sent = seen.lock().unwrap().take().unwrap();
        assert!(sent.headers.get(USER_AGENT).is_none());
    }

    #[tokio::test]
    async fn configuration_provider_supplies_authorization() {
        let configuration = Configuration {
            authorization_provider: Some(Arc::new(|url: &Url| {
                (url.host_str() == Some("registry.tephra.dev"))
                    .then(|| "Bearer token-a".to_owned())
            })),
            ..Configuration::default()
        };
        let (client, seen) = CaptureTransport::client(StatusCode::OK, configuration);

        client
            .execute(Request::get(url("https://registry.tephra.dev/a")))
            .await
            .unwrap();
        let sent = seen.lock().unwrap().take().unwrap();
        assert_eq!(sent.headers.get(AUTHORIZATION).unwrap(), "Bearer token-a");

        client
            .execute(Request::get(url("https://mirror.tephra.dev/a")))
            .await
            .unwrap();
        let sent = seen.lock().unwrap().take().unwrap();
        assert!(sent.headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn request_provider_overrides_the_configuration() {
        let configuration = Configuration {
            authorization_provider: Some(Arc::new(|_: &Url| Some("Bearer config".to_owned()))),
            ..Configuration::default()
        };
        let (client, seen) = CaptureTransport::client(StatusCode::OK, configuration);

        let mut request = Request::get(url("https://registry.tephra.dev/a"));
        request.options.authorization_provider =
            Some(Arc::new(|_: &Url| Some("Bearer request".to_owned())));
        client.execute(request).await.unwrap();

        let sent = seen.lock().unwrap().take().unwrap();
        assert_eq!(sent.headers.get(AUTHORIZATION).unwrap(), "Bearer request");
    }

    #[tokio::test]
    async fn existing_authorization_is_not_replaced() {
        let configuration = Configuration {
            authorization_provider: Some(Arc::new(|_: &Url| Some("Bearer config".to_owned()))),
            ..Configuration::default()
        };
        let (client, seen) = CaptureTransport::client(StatusCode::OK, configuration);

        let request = Request::get(url("https://registry.tephra.dev/a"))
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer caller"));
        client.execute(request).await.unwrap();

        let sent = seen.lock().unwrap().take().unwrap();
        assert_eq!(sent.headers.get(AUTHORIZATION).unwrap(), "Bearer caller");
    }

    #[tokio::test]
    async fn responses_outside_the_valid_set_fail() {
        let (client, _) =
            CaptureTransport::client(StatusCode::NOT_FOUND, Configuration::default());
        let mut request = Request::get(url("https://registry.tephra.dev/a"));
        request.options.valid_response_codes = Some(vec![StatusCode::OK]);

        let err = client.execute(request).await.unwrap_err();
        assert!(matches!(
            err,
            HttpClientError::BadResponseStatusCode(code) if code == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn any_status_passes_without_a_valid_set() {
        let (client, _) =
            CaptureTransport::client(StatusCode::NOT_FOUND, Configuration::default());
        let response = client
            .execute(Request::get(url("https://registry.tephra.dev/a")))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_responses_abort_mid_transfer() {
        let client = HttpClient::with_transport(
            Configuration::default(),
            StreamingTransport {
                total: 1000,
                step: 100,
            },
        );
        let mut request = Request::get(url("https://artifacts.tephra.dev/pkg.tar"));
        request.options.maximum_response_size = Some(250);

        let err = client.execute(request).await.unwrap_err();
        assert!(matches!(err, HttpClientError::ResponseTooLarge { limit: 250 }));
    }

    #[tokio::test]
    async fn size_cap_is_checked_before_caller_progress() {
        let client = HttpClient::with_transport(
            Configuration::default(),
            StreamingTransport {
                total: 300,
                step: 100,
            },
        );
        let mut request = Request::get(url("https://artifacts.tephra.dev/pkg.tar"));
        request.options.maximum_response_size = Some(150);

        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let err = client
            .execute_with_progress(request, move |received, _total| {
                sink.lock().unwrap().push(received);
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, HttpClientError::ResponseTooLarge { limit: 150 }));
        assert_eq!(*observed.lock().unwrap(), vec![100]);
    }

    #[tokio::test]
    async fn progress_reports_reach_the_caller() {
        let client = HttpClient::with_transport(
            Configuration::default(),
            StreamingTransport {
                total: 300,
                step: 100,
            },
        );

        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let response = client
            .execute_with_progress(
                Request::get(url("https://artifacts.tephra.dev/pkg.tar")),
                move |received, total| {
                    sink.lock().unwrap().push((received, total));
                    Ok(())
                },
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            *observed.lock().unwrap(),
            vec![(100, Some(300)), (200, Some(300)), (300, Some(300))]
        );
    }

    #[tokio::test]
    async fn progress_closures_may_borrow_caller_state() {
        let client = HttpClient::with_transport(
            Configuration::default(),
            StreamingTransport {
                total: 200,
                step: 100,
            },
        );

        let observed = Mutex::new(Vec::new());
        let response = client
            .execute_with_progress(
                Request::get(url("https://artifacts.tephra.dev/pkg.tar")),
                |received, _total| {
                    observed.lock().unwrap().push(received);
                    Ok(())
                },
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(*observed.lock().unwrap(), vec![100, 200]);
    }

    fn retrying_configuration() -> Configuration {
        Configuration {
            retry_strategy: Some(RetryStrategy::ExponentialBackoff {
                max_attempts: 3,
                base_delay: Duration::from_millis(100),
            }),
            ..Configuration::default()
        }
    }

    #[tokio::test]
    async fn server_errors_are_worth_retrying() {
        let (client, _) =
            CaptureTransport::client(StatusCode::SERVICE_UNAVAILABLE, retrying_configuration());
        let request = Request::get(url("https://registry.tephra.dev/a"));
        let response = client.execute(request.clone()).await.unwrap();

        let delay = client.should_retry(&response, &request, 0).unwrap();
        assert!(delay >= Duration::from_millis(101));
        assert!(delay <= Duration::from_millis(110));
        assert_eq!(client.should_retry(&response, &request, 2), None);
    }

    #[tokio::test]
    async fn non_server_errors_are_not_retried() {
        let (client, _) = CaptureTransport::client(StatusCode::OK, retrying_configuration());
        let request = Request::get(url("https://registry.tephra.dev/a"));
        let response = client.execute(request.clone()).await.unwrap();
        assert_eq!(client.should_retry(&response, &request, 0), None);

        let not_found = Response::from_status(StatusCode::NOT_FOUND);
        assert_eq!(client.should_retry(&not_found, &request, 0), None);
    }

    #[tokio::test]
    async fn no_strategy_means_no_retry() {
        let (client, _) =
            CaptureTransport::client(StatusCode::SERVICE_UNAVAILABLE, Configuration::default());
        let request = Request::get(url("https://registry.tephra.dev/a"));
        let response = client.execute(request.clone()).await.unwrap();
        assert_eq!(client.should_retry(&response, &request, 0), None);
    }

    #[tokio::test]
    async fn request_strategy_overrides_the_default() {
        let (client, _) =
            CaptureTransport::client(StatusCode::SERVICE_UNAVAILABLE, retrying_configuration());
        let mut request = Request::get(url("https://registry.tephra.dev/a"));
        request.options.retry_strategy = Some(RetryStrategy::ExponentialBackoff {
            max_attempts: 1,
            base_delay: Duration::from_millis(100),
        });
        let response = client.execute(request.clone()).await.unwrap();

        // One total attempt allowed, so the first retry decision is no.
        assert_eq!(client.should_retry(&response, &request, 0), None);
    }

    fn breaker_configuration() -> Configuration {
        Configuration {
            circuit_breaker_strategy: Some(CircuitBreakerStrategy::HostErrors {
                max_errors: 1,
                age: Duration::from_secs(300),
            }),
            ..Configuration::default()
        }
    }

    #[tokio::test]
    async fn one_server_error_trips_the_host_breaker() {
        let (client, _) =
            CaptureTransport::client(StatusCode::SERVICE_UNAVAILABLE, breaker_configuration());
        let request = Request::get(url("https://registry.tephra.dev/a"));
        assert!(!client.should_circuit_break(&request));

        client.execute(request).await.unwrap();

        let next = Request::get(url("https://registry.tephra.dev/b"));
        assert!(client.should_circuit_break(&next));
        let elsewhere = Request::get(url("https://mirror.tephra.dev/a"));
        assert!(!client.should_circuit_break(&elsewhere));
    }

    #[tokio::test]
    async fn errors_are_not_recorded_without_a_strategy() {
        let (client, _) =
            CaptureTransport::client(StatusCode::SERVICE_UNAVAILABLE, Configuration::default());
        client
            .execute(Request::get(url("https://registry.tephra.dev/a")))
            .await
            .unwrap();

        // Even a later request carrying a strategy sees a clean host.
        let mut guarded = Request::get(url("https://registry.tephra.dev/b"));
        guarded.options.circuit_breaker_strategy = Some(CircuitBreakerStrategy::HostErrors {
            max_errors: 1,
            age: Duration::from_secs(300),
        });
        assert!(!client.should_circuit_break(&guarded));
    }

    #[tokio::test]
    async fn nonstandard_codes_past_599_count_as_server_errors() {
        let configuration = Configuration {
            circuit_breaker_strategy: Some(CircuitBreakerStrategy::HostErrors {
                max_errors: 1,
                age: Duration::from_secs(300),
            }),
            ..retrying_configuration()
        };
        let (client, _) =
            CaptureTransport::client(StatusCode::from_u16(600).unwrap(), configuration);
        let request = Request::get(url("https://registry.tephra.dev/a"));
        let response = client.execute(request.clone()).await.unwrap();

        assert!(client.should_retry(&response, &request, 0).is_some());
        assert!(client.should_circuit_break(&request));
    }

    /// Tracks how many sends overlap.
    struct ConcurrencyProbe {
        current: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Transport for ConcurrencyProbe {
        async fn send(
            &self,
            _request: Request,
            _progress: Option<&ProgressHandler<'_>>,
        ) -> Result<Response, HttpClientError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(Response::from_status(StatusCode::OK))
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrency_stays_under_the_ceiling() {
        let peak = Arc::new(AtomicUsize::new(0));
        let probe = ConcurrencyProbe {
            current: Arc::new(AtomicUsize::new(0)),
            peak: Arc::clone(&peak),
        };
        let configuration = Configuration {
            max_concurrent_requests: Some(2),
            ..Configuration::default()
        };
        let client = HttpClient::with_transport(configuration, probe);

        let mut handles = Vec::new();
        for i in 0..8 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                let target = url(&format!("https://registry.tephra.dev/{i}"));
                client.execute(Request::get(target)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn wrappers_set_method_and_body() {
        let (client, seen) = CaptureTransport::client(StatusCode::OK, Configuration::default());
        let target = url("https://registry.tephra.dev/a");

        client.head(target.clone()).await.unwrap();
        assert_eq!(seen.lock().unwrap().take().unwrap().method, Method::HEAD);

        client.get(target.clone()).await.unwrap();
        assert_eq!(seen.lock().unwrap().take().unwrap().method, Method::GET);

        client.delete(target.clone()).await.unwrap();
        assert_eq!(seen.lock().unwrap().take().unwrap().method, Method::DELETE);

        client.post(target.clone(), b"create".to_vec()).await.unwrap();
        let sent = seen.lock().unwrap().take().unwrap();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.body.as_deref(), Some(b"create".as_slice()));

        client.put(target, b"update".to_vec()).await.unwrap();
        assert_eq!(seen.lock().unwrap().take().unwrap().method, Method::PUT);
    }

    #[test]
    fn default_ceiling_is_at_least_four() {
        assert!(default_concurrency() >= 4);
    }
}
