//! HTTP client with default headers and throttling
//!
//! Provides the transport for upstream calls:
//! - JSON POST bodies
//! - Default headers (auth) on every request
//! - Optional client-side request throttling
//! - Error text capture for non-success statuses

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::Result;
use reqwest::{Client, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("grid-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client for upstream calls
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// POST a JSON body and return the raw response, whatever its status
    pub async fn post(&self, url: &str, body: &Value) -> Result<Response> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self.client.post(url);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.json(body).send().await?;
        debug!("POST {} -> {}", url, response.status().as_u16());
        Ok(response)
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Header values carry credentials; only the names are shown.
        let header_names: Vec<&str> = self
            .config
            .default_headers
            .keys()
            .map(String::as_str)
            .collect();
        f.debug_struct("HttpClient")
            .field("timeout", &self.config.timeout)
            .field("headers", &header_names)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Body text for an error status, falling back to the reason phrase
pub(crate) fn status_body(status: reqwest::StatusCode, text: String) -> String {
    if text.trim().is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        text
    }
}
