//! Harvest types
//!
//! Configuration, run state and terminal output of a harvest.

use crate::types::{BackoffType, Cursor, Item};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::time::Duration;

/// Retry behaviour for rate-limited fetches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Base wait before retrying a rate-limited fetch
    pub delay: Duration,
    /// How the wait grows with consecutive retries at one cursor
    pub backoff: BackoffType,
    /// Upper bound for a single wait
    pub max_delay: Duration,
    /// Consecutive retries allowed at one cursor (None = unbounded)
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(8000),
            backoff: BackoffType::Constant,
            max_delay: Duration::from_secs(300),
            max_retries: None,
        }
    }
}

impl RetryPolicy {
    /// Constant delay, no ceiling
    pub fn constant(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Set the retry ceiling
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff shape and its cap
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType, max_delay: Duration) -> Self {
        self.backoff = backoff;
        self.max_delay = max_delay;
        self
    }

    /// Whether the `attempt`-th consecutive retry (1-based) is allowed
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_retries.map_or(true, |max| attempt <= max)
    }

    /// Wait before the `attempt`-th consecutive retry (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let step = attempt.saturating_sub(1);
        let delay = match self.backoff {
            BackoffType::Constant => self.delay,
            BackoffType::Linear => self.delay.saturating_mul(step + 1),
            BackoffType::Exponential => self.delay.saturating_mul(2u32.saturating_pow(step)),
        };

        std::cmp::min(delay, self.max_delay)
    }
}

/// Configuration for a harvest run
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Items requested per page (reported only; the fetcher applies it)
    pub page_size: u32,
    /// Politeness pause between successful pages
    pub page_delay: Duration,
    /// Rate-limit handling
    pub retry: RetryPolicy,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            page_delay: Duration::from_millis(800),
            retry: RetryPolicy::default(),
        }
    }
}

impl HarvestConfig {
    /// Create a new harvest config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the pause between pages
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Harvest state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarvestPhase {
    /// A page request is about to be, or has just been, made
    Fetching,
    /// Waiting out a rate limit before retrying the same cursor
    Backoff,
    /// Every page has been collected
    Done,
    /// Aborted without a result
    Failed,
}

impl HarvestPhase {
    /// Whether no further transitions can happen
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Mutable state of a running harvest
#[derive(Debug, Clone)]
pub struct HarvestState {
    /// Position in the remote collection (None = start)
    pub cursor: Option<Cursor>,
    /// Everything collected so far, in upstream order
    pub items: Vec<Item>,
    /// 1-based number of the page being fetched; diagnostics only
    pub page: u32,
    /// Current phase
    pub phase: HarvestPhase,
}

impl Default for HarvestState {
    fn default() -> Self {
        Self {
            cursor: None,
            items: Vec::new(),
            page: 1,
            phase: HarvestPhase::Fetching,
        }
    }
}

impl HarvestState {
    /// Fresh state at the start of the collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page's items in order
    pub fn append(&mut self, items: Vec<Item>) {
        self.items.extend(items);
    }

    /// Move to the next page
    pub fn advance(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
        self.page += 1;
    }

    /// Items collected so far
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Finalize into a result stamped with the current time
    pub fn finish(self, stats: HarvestStats) -> HarvestResult {
        HarvestResult::new(Utc::now(), self.items, stats)
    }
}

/// Counters describing how a harvest went
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    /// Successful page fetches
    pub pages_fetched: u32,
    /// All fetch attempts, including rate-limited ones
    pub fetch_attempts: u32,
    /// Rate-limit waits taken
    pub rate_limit_retries: u32,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Exported snapshot of a completed harvest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestResult {
    /// When the harvest completed
    #[serde(serialize_with = "serialize_iso_millis")]
    pub exported_at: DateTime<Utc>,
    /// Number of items (always `items.len()`)
    pub count: usize,
    /// Every record, in upstream order
    pub items: Vec<Item>,
    /// Run diagnostics; not part of the exported document
    #[serde(skip)]
    pub stats: HarvestStats,
}

impl HarvestResult {
    /// Build a result; `count` is derived from `items`
    pub fn new(exported_at: DateTime<Utc>, items: Vec<Item>, stats: HarvestStats) -> Self {
        Self {
            exported_at,
            count: items.len(),
            items,
            stats,
        }
    }
}

fn serialize_iso_millis<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
