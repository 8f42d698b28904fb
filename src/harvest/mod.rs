//! Harvest module
//!
//! Drives a [`PageFetcher`] over an entire remote collection.
//!
//! # Overview
//!
//! The harvester is a strictly sequential loop with four phases:
//!
//! ```text
//!            ok, hasNext            rate limited
//!          ┌────────────┐        ┌──────────────┐
//!          ▼            │        │              ▼
//!     ┌──────────┐──────┘        │        ┌──────────┐
//!     │ FETCHING │───────────────┘        │ BACKOFF  │
//!     └──────────┘◄───────────────────────└──────────┘
//!       │      │        wait elapsed (same cursor)
//!  ok,  │      │ fatal / retries exhausted / cancelled
//!  last ▼      ▼
//!   ┌──────┐ ┌────────┐
//!   │ DONE │ │ FAILED │
//!   └──────┘ └────────┘
//! ```
//!
//! The cursor only advances after a successful page, so a retried page is
//! requested with exactly the cursor that failed and every record is
//! appended once. The page counter is reported for diagnostics and plays no
//! part in deciding what to fetch.

mod classify;
mod progress;
mod types;

pub use classify::{classify, classify_error, ErrorClass, SLOW_DOWN_CODE};
pub use progress::{
    HarvestEvent, ProgressReporter, RecordingReporter, SilentReporter, TracingReporter,
};
pub use types::{
    HarvestConfig, HarvestPhase, HarvestResult, HarvestState, HarvestStats, RetryPolicy,
};

use crate::error::{Error, Result};
use crate::pagination::PageFetcher;
use crate::types::display_cursor;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Enumerates a paginated collection exactly once
pub struct Harvester<F> {
    fetcher: F,
    config: HarvestConfig,
}

impl<F: PageFetcher> Harvester<F> {
    /// Create a harvester over `fetcher`
    pub fn new(fetcher: F, config: HarvestConfig) -> Self {
        Self { fetcher, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Get the page fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Harvest the whole collection, logging progress through `tracing`
    pub async fn harvest(&self) -> Result<HarvestResult> {
        self.harvest_with_progress(&TracingReporter, CancellationToken::new())
            .await
    }

    /// Same as [`harvest`](Self::harvest), but stops with [`Error::Cancelled`]
    /// once `cancel` fires
    pub async fn harvest_with_cancel(&self, cancel: CancellationToken) -> Result<HarvestResult> {
        self.harvest_with_progress(&TracingReporter, cancel).await
    }

    /// Harvest the whole collection, reporting every transition to `reporter`.
    ///
    /// Cancellation is checked before each fetch and raced against both timed
    /// waits. On any failure no result is produced.
    pub async fn harvest_with_progress<R: ProgressReporter>(
        &self,
        reporter: &R,
        cancel: CancellationToken,
    ) -> Result<HarvestResult> {
        let started = Instant::now();
        let mut state = HarvestState::new();
        let mut stats = HarvestStats::default();
        // Consecutive rate-limit retries at the current cursor
        let mut retries_here: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(fail(reporter, &mut state, Error::Cancelled));
            }

            state.phase = HarvestPhase::Fetching;
            reporter.report(HarvestEvent::Fetching {
                page: state.page,
                cursor: state.cursor.clone(),
            });
            stats.fetch_attempts += 1;

            match self.fetcher.fetch_page(state.cursor.as_ref()).await {
                Ok(page) => {
                    retries_here = 0;
                    stats.pages_fetched += 1;

                    let received = page.items.len();
                    state.append(page.items);
                    reporter.report(HarvestEvent::PageFetched {
                        page: state.page,
                        received,
                        total: state.total(),
                    });

                    if !page.has_next {
                        break;
                    }

                    let Some(next) = page.next_cursor else {
                        let err = Error::pagination(format!(
                            "page {} reported more pages without a cursor",
                            state.page
                        ));
                        return Err(fail(reporter, &mut state, err));
                    };
                    state.advance(next);

                    if let Err(err) = pause(self.config.page_delay, &cancel).await {
                        return Err(fail(reporter, &mut state, err));
                    }
                }
                Err(err) => match classify_error(&err) {
                    ErrorClass::RateLimited => {
                        retries_here += 1;
                        if !self.config.retry.allows(retries_here) {
                            let exhausted = Error::RetriesExhausted {
                                cursor: display_cursor(state.cursor.as_ref()).to_string(),
                                attempts: retries_here,
                                last_error: err.to_string(),
                            };
                            return Err(fail(reporter, &mut state, exhausted));
                        }

                        let wait = self.config.retry.delay_for(retries_here);
                        stats.rate_limit_retries += 1;
                        state.phase = HarvestPhase::Backoff;
                        reporter.report(HarvestEvent::RateLimited {
                            page: state.page,
                            attempt: retries_here,
                            wait,
                        });

                        if let Err(err) = pause(wait, &cancel).await {
                            return Err(fail(reporter, &mut state, err));
                        }
                    }
                    ErrorClass::Fatal => return Err(fail(reporter, &mut state, err)),
                },
            }
        }

        state.phase = HarvestPhase::Done;
        stats.duration_ms = started.elapsed().as_millis() as u64;
        reporter.report(HarvestEvent::Completed {
            pages: stats.pages_fetched,
            total: state.total(),
        });

        Ok(state.finish(stats))
    }
}

/// Enter FAILED and hand the error back for propagation
fn fail<R: ProgressReporter>(reporter: &R, state: &mut HarvestState, err: Error) -> Error {
    state.phase = HarvestPhase::Failed;
    reporter.report(HarvestEvent::Failed {
        page: state.page,
        error: err.to_string(),
    });
    err
}

/// Sleep for `wait` unless cancelled first
async fn pause(wait: Duration, cancel: &CancellationToken) -> Result<()> {
    if wait.is_zero() {
        return if cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        };
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        () = tokio::time::sleep(wait) => Ok(()),
    }
}
