//! Output module
//!
//! Handles the exported snapshot document and files derived from it.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing a completed harvest as JSON, atomically
//! - Loading a previously written snapshot
//! - Exporting snapshot rows as CSV

mod csv;
mod snapshot;

pub use self::csv::{csv_escape, to_csv, write_csv, CSV_HEADER};
pub use snapshot::{load_snapshot, write_snapshot, DEFAULT_SNAPSHOT_FILE};
