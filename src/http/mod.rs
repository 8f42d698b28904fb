//! HTTP client module
//!
//! Thin transport used by the GraphQL layer.
//!
//! # Features
//!
//! - **Default Headers**: Auth header applied on every request
//! - **Timeouts**: Per-client request timeout
//! - **Throttling**: Optional token bucket limiter using governor
//!
//! Retries are deliberately absent here: the harvester is the only place
//! that decides whether a failed request is tried again.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub(crate) use client::status_body;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
