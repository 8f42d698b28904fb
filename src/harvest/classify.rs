//! Failure classification
//!
//! The only place that decides whether a failed page fetch is worth
//! retrying. Matching is by substring over the upstream error text.

use crate::error::Error;

/// Upstream code returned when requests arrive too quickly
pub const SLOW_DOWN_CODE: &str = "ENHANCE_YOUR_CALM";

/// Lowercase markers that identify a rate-limited failure
const RATE_LIMIT_MARKERS: [&str; 3] = ["enhance_your_calm", "rate limit", "unavailable"];

/// What to do about a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Wait and retry the same cursor
    RateLimited,
    /// Abort the harvest
    Fatal,
}

impl ErrorClass {
    /// Whether the failure should be retried
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Classify raw upstream error text (case-insensitive)
pub fn classify(error_text: &str) -> ErrorClass {
    let lowered = error_text.to_lowercase();
    if RATE_LIMIT_MARKERS.iter().any(|m| lowered.contains(m)) {
        ErrorClass::RateLimited
    } else {
        ErrorClass::Fatal
    }
}

/// Classify a fetch failure.
///
/// Only errors that came back from the upstream call are matched against the
/// markers; local failures (bad config, broken pagination contract, IO) are
/// always fatal.
pub fn classify_error(error: &Error) -> ErrorClass {
    if error.is_upstream() {
        classify(&error.to_string())
    } else {
        ErrorClass::Fatal
    }
}
