// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # grid-harvest
//!
//! Exports the complete GRID tournament catalogue into a single JSON
//! snapshot, surviving rate limiting along the way.
//!
//! ## Features
//!
//! - **Cursor pagination**: Walks a Relay-style GraphQL connection to its end
//! - **Rate-limit recovery**: Waits and retries the same cursor, never skipping
//!   or duplicating a page
//! - **Atomic snapshots**: The output file appears only after a complete run
//! - **Snapshot tools**: List by year or name, export a year as CSV
//! - **Proxy**: Small HTTP server exposing upcoming matches as flat JSON
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use grid_harvest::{
//!     GraphQlClient, GraphQlPageFetcher, HarvestConfig, Harvester, HttpClient, HttpClientConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> grid_harvest::Result<()> {
//!     let http = HttpClient::with_config(
//!         HttpClientConfig::builder().header("x-api-key", "...").build(),
//!     )?;
//!     let client = GraphQlClient::new("https://api.grid.gg/central-data/graphql", http);
//!     let harvester = Harvester::new(
//!         GraphQlPageFetcher::tournaments(client, 50),
//!         HarvestConfig::default(),
//!     );
//!
//!     let result = harvester.harvest().await?;
//!     grid_harvest::output::write_snapshot("tournaments.json", &result).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         CLI / Proxy                         │
//! │  harvest    list    export-csv    serve (/health, /matches) │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌────────────┬────────────────┴──┬───────────────┬────────────┐
//! │  Harvest   │   Pagination      │   GraphQL     │   Output   │
//! ├────────────┼───────────────────┼───────────────┼────────────┤
//! │ State loop │ PageFetcher trait │ Envelopes     │ Snapshot   │
//! │ Classify   │ Tournaments query │ errors → Err  │ CSV        │
//! │ Backoff    │ Cursor contract   │ Auth ping     │            │
//! └────────────┴───────────────────┴───────────────┴────────────┘
//!                               │
//!                      HTTP (reqwest, governor)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP transport with optional rate limiting
pub mod http;

/// GraphQL envelopes and client
pub mod graphql;

/// Page fetching
pub mod pagination;

/// Harvest state machine
pub mod harvest;

/// Snapshot and CSV output
pub mod output;

/// Snapshot queries
pub mod query;

/// Settings from flags and environment
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use graphql::GraphQlClient;
pub use harvest::{HarvestConfig, HarvestResult, Harvester, RetryPolicy};
pub use http::{HttpClient, HttpClientConfig};
pub use pagination::{GraphQlPageFetcher, Page, PageFetcher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
