//! Progress reporting
//!
//! Reporters observe a harvest; they never influence its control flow.

use super::types::HarvestPhase;
use crate::types::Cursor;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something that happened during a harvest
#[derive(Debug, Clone, PartialEq)]
pub enum HarvestEvent {
    /// About to request a page
    Fetching {
        /// Page number (diagnostic)
        page: u32,
        /// Cursor being requested
        cursor: Option<Cursor>,
    },
    /// A page was fetched and appended
    PageFetched {
        /// Page number (diagnostic)
        page: u32,
        /// Items on this page
        received: usize,
        /// Items collected so far
        total: usize,
    },
    /// The upstream asked us to slow down
    RateLimited {
        /// Page number (diagnostic)
        page: u32,
        /// Consecutive retry number at this cursor (1-based)
        attempt: u32,
        /// How long we are about to wait
        wait: Duration,
    },
    /// The last page was collected
    Completed {
        /// Successful page fetches
        pages: u32,
        /// Items collected
        total: usize,
    },
    /// The harvest was aborted
    Failed {
        /// Page number being attempted
        page: u32,
        /// Error description
        error: String,
    },
}

impl HarvestEvent {
    /// Phase the harvest is in when this event is reported
    pub fn phase(&self) -> HarvestPhase {
        match self {
            Self::Fetching { .. } | Self::PageFetched { .. } => HarvestPhase::Fetching,
            Self::RateLimited { .. } => HarvestPhase::Backoff,
            Self::Completed { .. } => HarvestPhase::Done,
            Self::Failed { .. } => HarvestPhase::Failed,
        }
    }
}

/// Receives harvest events
pub trait ProgressReporter: Send + Sync {
    /// Handle one event
    fn report(&self, event: HarvestEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _event: HarvestEvent) {}
}

/// Logs events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::Fetching { page, cursor } => {
                debug!(
                    "Fetching page {} (after={})",
                    page,
                    crate::types::display_cursor(cursor.as_ref())
                );
            }
            HarvestEvent::PageFetched {
                page,
                received,
                total,
            } => {
                info!("Page {page}: +{received} items (total so far: {total})");
            }
            HarvestEvent::RateLimited {
                page,
                attempt,
                wait,
            } => {
                warn!(
                    "Rate limited on page {page} (retry {attempt}), waiting {}ms then retrying same cursor",
                    wait.as_millis()
                );
            }
            HarvestEvent::Completed { pages, total } => {
                info!("No more pages: {total} items in {pages} pages");
            }
            HarvestEvent::Failed { page, error } => {
                tracing::error!("Harvest failed on page {page}: {error}");
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<HarvestEvent>>,
}

impl RecordingReporter {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<HarvestEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// One phase per fetch attempt, backoff wait and terminal event, in order
    pub fn phases(&self) -> Vec<HarvestPhase> {
        self.events()
            .iter()
            .filter(|e| !matches!(e, HarvestEvent::PageFetched { .. }))
            .map(HarvestEvent::phase)
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, event: HarvestEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
