//! Pagination module
//!
//! # Overview
//!
//! A [`PageFetcher`] turns an optional [`Cursor`](crate::types::Cursor) into
//! one [`Page`] of items. It performs exactly one upstream call per
//! invocation and never retries; driving the cursor forward and deciding
//! what to do with failures belongs to the harvester.

mod fetcher;
mod types;

pub use fetcher::{GraphQlPageFetcher, TOURNAMENTS_QUERY};
pub use types::{Page, PageFetcher};
