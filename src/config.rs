//! Configuration
//!
//! Settings are read once at startup, from command-line flags that fall back
//! to the environment, and handed to the components as plain values. Nothing
//! below the CLI reads the environment.

use crate::error::{Error, Result};
use crate::graphql::GraphQlClient;
use crate::harvest::{HarvestConfig, RetryPolicy};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::types::{BackoffType, OptionStringExt};
use clap::Args;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Header used when none is configured
pub const DEFAULT_AUTH_HEADER: &str = "x-api-key";

/// Endpoint the proxy falls back to when none is configured
pub const DEFAULT_CENTRAL_DATA_URL: &str = "https://api-op.grid.gg/central-data/graphql";

/// Largest page the upstream serves
pub const UPSTREAM_MAX_PAGE_SIZE: u32 = 50;

// ============================================================================
// Arguments
// ============================================================================

/// Upstream connection flags
#[derive(Args, Debug, Clone)]
pub struct UpstreamArgs {
    /// GraphQL endpoint URL
    #[arg(long, env = "GRID_SERIES_STATE_URL")]
    pub endpoint: Option<String>,

    /// Name of the authentication header
    #[arg(long, env = "GRID_AUTH_HEADER_NAME", default_value = DEFAULT_AUTH_HEADER)]
    pub auth_header_name: String,

    /// Value of the authentication header
    #[arg(long, env = "GRID_AUTH_HEADER_VALUE", hide_env_values = true)]
    pub auth_header_value: Option<String>,

    /// API key sent as a bearer token when no header value is set
    #[arg(long, env = "GRID_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "GRID_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Client-side cap on requests per second
    #[arg(long, env = "GRID_MAX_RPS")]
    pub max_requests_per_second: Option<u32>,
}

impl Default for UpstreamArgs {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth_header_name: DEFAULT_AUTH_HEADER.to_string(),
            auth_header_value: None,
            api_key: None,
            timeout_secs: 30,
            max_requests_per_second: None,
        }
    }
}

impl UpstreamArgs {
    /// Use the public central-data endpoint when none was given
    #[must_use]
    pub fn with_default_endpoint(mut self) -> Self {
        if self.endpoint.clone().none_if_empty().is_none() {
            self.endpoint = Some(DEFAULT_CENTRAL_DATA_URL.to_string());
        }
        self
    }
}

/// Harvest pacing flags
#[derive(Args, Debug, Clone)]
pub struct HarvestArgs {
    /// Items per page (the upstream serves at most 50)
    #[arg(long, env = "GRID_PAGE_SIZE", default_value_t = UPSTREAM_MAX_PAGE_SIZE)]
    pub page_size: u32,

    /// Pause between pages in milliseconds
    #[arg(long, env = "GRID_DELAY_MS", default_value_t = 800)]
    pub delay_ms: u64,

    /// Wait after a rate-limit response in milliseconds
    #[arg(long, env = "RATE_LIMIT_DELAY_MS", default_value_t = 8000)]
    pub rate_limit_delay_ms: u64,

    /// Consecutive rate-limit retries allowed per page (unset or 0 = no limit)
    #[arg(long, env = "RATE_LIMIT_MAX_RETRIES")]
    pub max_rate_limit_retries: Option<u32>,

    /// How the rate-limit wait grows with consecutive retries
    #[arg(long, value_enum, default_value = "constant")]
    pub backoff: BackoffType,

    /// Cap for a single rate-limit wait in milliseconds
    #[arg(long, default_value_t = 300_000)]
    pub max_backoff_ms: u64,
}

impl Default for HarvestArgs {
    fn default() -> Self {
        Self {
            page_size: UPSTREAM_MAX_PAGE_SIZE,
            delay_ms: 800,
            rate_limit_delay_ms: 8000,
            max_rate_limit_retries: None,
            backoff: BackoffType::Constant,
            max_backoff_ms: 300_000,
        }
    }
}

impl HarvestArgs {
    /// Build the harvest configuration
    pub fn to_config(&self) -> Result<HarvestConfig> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }

        let retry = RetryPolicy::constant(Duration::from_millis(self.rate_limit_delay_ms))
            .with_backoff(self.backoff, Duration::from_millis(self.max_backoff_ms))
            .with_max_retries(self.max_rate_limit_retries.filter(|&n| n > 0));

        Ok(HarvestConfig::new()
            .with_page_size(self.page_size)
            .with_page_delay(Duration::from_millis(self.delay_ms))
            .with_retry(retry))
    }
}

// ============================================================================
// Settings
// ============================================================================

/// The single authentication header sent upstream
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
    /// Header name
    pub name: String,
    /// Header value
    pub value: String,
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeader")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Validated upstream settings
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// GraphQL endpoint
    pub endpoint: Url,
    /// Authentication header
    pub auth: AuthHeader,
    /// Request timeout
    pub timeout: Duration,
    /// Optional client-side throttle
    pub max_requests_per_second: Option<u32>,
}

impl UpstreamSettings {
    /// Validate flags; a missing endpoint or credential is fatal
    pub fn from_args(args: &UpstreamArgs) -> Result<Self> {
        let endpoint = args
            .endpoint
            .clone()
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("GRID_SERIES_STATE_URL"))?;
        let endpoint = Url::parse(endpoint.trim())?;

        let auth = resolve_auth(args)?;

        Ok(Self {
            endpoint,
            auth,
            timeout: Duration::from_secs(args.timeout_secs),
            max_requests_per_second: args.max_requests_per_second.filter(|&n| n > 0),
        })
    }

    /// HTTP transport carrying the auth header
    pub fn http_client(&self) -> Result<HttpClient> {
        let mut builder = HttpClientConfig::builder()
            .timeout(self.timeout)
            .header(self.auth.name.as_str(), self.auth.value.as_str());
        if let Some(rps) = self.max_requests_per_second {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }
        HttpClient::with_config(builder.build())
    }

    /// GraphQL client for the configured endpoint
    pub fn graphql_client(&self) -> Result<GraphQlClient> {
        Ok(GraphQlClient::new(self.endpoint.as_str(), self.http_client()?))
    }
}

/// Everything a harvest run needs
#[derive(Debug, Clone)]
pub struct Settings {
    /// Upstream connection
    pub upstream: UpstreamSettings,
    /// Paging and retry behavior
    pub harvest: HarvestConfig,
}

impl Settings {
    /// Validate both argument groups
    pub fn from_args(upstream: &UpstreamArgs, harvest: &HarvestArgs) -> Result<Self> {
        Ok(Self {
            upstream: UpstreamSettings::from_args(upstream)?,
            harvest: harvest.to_config()?,
        })
    }
}

/// Header value wins; a bare API key becomes a bearer token
fn resolve_auth(args: &UpstreamArgs) -> Result<AuthHeader> {
    let name = args
        .auth_header_name
        .clone()
        .none_if_empty()
        .unwrap_or_else(|| DEFAULT_AUTH_HEADER.to_string());

    if let Some(value) = args.auth_header_value.clone().none_if_empty() {
        return Ok(AuthHeader { name, value });
    }

    if let Some(key) = args.api_key.clone().none_if_empty() {
        return Ok(AuthHeader {
            name: "authorization".to_string(),
            value: format!("Bearer {key}"),
        });
    }

    Err(Error::missing_field("GRID_AUTH_HEADER_VALUE"))
}
