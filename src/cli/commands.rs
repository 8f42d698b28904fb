//! CLI commands and argument parsing

use crate::config::{HarvestArgs, UpstreamArgs};
use crate::output::DEFAULT_SNAPSHOT_FILE;
use crate::query::DEFAULT_LIST_LIMIT;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Harvest the GRID tournament catalogue into a local snapshot
#[derive(Parser, Debug)]
#[command(name = "grid-harvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every tournament and write the snapshot
    Harvest {
        #[command(flatten)]
        upstream: UpstreamArgs,

        #[command(flatten)]
        harvest: HarvestArgs,

        /// Snapshot file to write
        #[arg(short, long, default_value = DEFAULT_SNAPSHOT_FILE)]
        output: PathBuf,
    },

    /// List snapshot tournaments by year or by name
    List {
        /// Four-digit year contained in the tournament name
        #[arg(long, conflicts_with = "name", required_unless_present = "name")]
        year: Option<String>,

        /// Case-insensitive name fragment
        #[arg(long)]
        name: Option<String>,

        /// Snapshot file to read
        #[arg(short, long, default_value = DEFAULT_SNAPSHOT_FILE)]
        input: PathBuf,

        /// Maximum rows to print
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Export the tournaments of one year as CSV
    ExportCsv {
        /// Four-digit year contained in the tournament name
        #[arg(long)]
        year: String,

        /// Snapshot file to read
        #[arg(short, long, default_value = DEFAULT_SNAPSHOT_FILE)]
        input: PathBuf,

        /// CSV file to write (default: tournaments_<year>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Start the HTTP proxy for upcoming matches
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "10000")]
        port: u16,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `id  name` lines after a count line
    Text,
    /// One JSON row per line
    Json,
}
