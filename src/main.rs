// Allow common clippy pedantic lints
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]

//! grid-harvest CLI
//!
//! Harvests the tournament catalogue and serves upcoming matches

use clap::Parser;
use grid_harvest::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
