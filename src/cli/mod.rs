//! CLI module
//!
//! Command-line interface for harvesting and inspecting snapshots.
//!
//! # Commands
//!
//! - `harvest` - Fetch every tournament and write the snapshot
//! - `list` - Print snapshot tournaments by year or name
//! - `export-csv` - Write one year of tournaments as CSV
//! - `serve` - Start the upcoming-matches HTTP proxy

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{run_harvest, Runner};
pub use server::{router, serve, ServerConfig, UpcomingMatch, UPCOMING_QUERY};
