//! Resilient HTTP client for the Tephra package toolchain.
//!
//! This crate provides:
//! - An async HTTP client with a concurrency ceiling, default-header and
//!   authorization merging, and response-size capping
//! - Retry decisions with exponential backoff and jitter
//! - Per-host circuit breaking based on recent server errors
//! - A token bucket with FIFO waiting and RAII release
//! - A transport trait so tests and other backends can replace `reqwest`
//!
//! The client makes exactly one attempt per `execute` call; retry and
//! circuit-breaker decisions are exposed for the caller's fetch loop to
//! honor. Manifest downloads, registry metadata queries, and artifact
//! fetches all go through this one client.

mod breaker;
mod client;
mod error;
mod request;
mod response;
mod retry;
mod token_bucket;
mod transport;

pub use breaker::CircuitBreakerStrategy;
pub use client::{AuthorizationProvider, Configuration, HttpClient};
pub use error::HttpClientError;
pub use request::{Options, Request};
pub use response::Response;
pub use retry::RetryStrategy;
pub use token_bucket::{Token, TokenBucket};
pub use transport::{ProgressHandler, ReqwestTransport, Transport};
