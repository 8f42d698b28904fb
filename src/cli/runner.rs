//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::server::{serve, ServerConfig};
use crate::config::{HarvestArgs, Settings, UpstreamArgs, UpstreamSettings};
use crate::error::Result;
use crate::harvest::{HarvestResult, Harvester};
use crate::output::{load_snapshot, write_csv, write_snapshot};
use crate::pagination::GraphQlPageFetcher;
use crate::query::{self, TournamentRow};
use crate::types::Item;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Harvest {
                upstream,
                harvest,
                output,
            } => self.harvest(upstream, harvest, output).await,
            Commands::List {
                year,
                name,
                input,
                limit,
                format,
            } => {
                self.list(year.as_deref(), name.as_deref(), input, *limit, *format)
                    .await
            }
            Commands::ExportCsv { year, input, out } => {
                self.export_csv(year, input, out.as_deref()).await
            }
            Commands::Serve { port, upstream } => {
                let settings = UpstreamSettings::from_args(&upstream.clone().with_default_endpoint())?;
                serve(ServerConfig::new(settings)?, *port).await
            }
        }
    }

    /// Run a full harvest and write the snapshot on success
    async fn harvest(
        &self,
        upstream: &UpstreamArgs,
        harvest: &HarvestArgs,
        output: &Path,
    ) -> Result<()> {
        let settings = Settings::from_args(upstream, harvest)?;
        let result = run_harvest(&settings).await?;

        write_snapshot(output, &result).await?;
        info!(
            "Harvest finished: {} items in {} pages ({} rate-limit retries, {}ms)",
            result.count,
            result.stats.pages_fetched,
            result.stats.rate_limit_retries,
            result.stats.duration_ms
        );
        println!("Saved {} tournaments to {}", result.count, output.display());
        Ok(())
    }

    /// Print matching rows from a snapshot
    async fn list(
        &self,
        year: Option<&str>,
        name: Option<&str>,
        input: &Path,
        limit: usize,
        format: OutputFormat,
    ) -> Result<()> {
        let filter = match (year, name) {
            (Some(year), _) => ListFilter::Year(query::parse_year(year)?),
            (None, name) => ListFilter::Name(name.unwrap_or_default()),
        };
        let snapshot = load_snapshot(input).await?;
        let rows = filter.select(&snapshot.items);

        match format {
            OutputFormat::Text => {
                println!("{}", filter.heading(rows.len()));
                for line in listing_lines(&rows, limit) {
                    println!("{line}");
                }
            }
            OutputFormat::Json => {
                for row in rows.iter().take(limit) {
                    println!("{}", serde_json::to_string(row)?);
                }
            }
        }
        Ok(())
    }

    /// Write the rows of one year as CSV
    async fn export_csv(&self, year: &str, input: &Path, out: Option<&Path>) -> Result<()> {
        let year = query::parse_year(year)?;
        let snapshot = load_snapshot(input).await?;
        let rows = query::by_year(&snapshot.items, year);

        let path = out.map_or_else(|| default_csv_path(year), Path::to_path_buf);
        write_csv(&path, &rows).await?;
        println!("Wrote {} with {} rows", path.display(), rows.len());
        Ok(())
    }
}

/// Harvest with Ctrl-C wired to cancellation
pub async fn run_harvest(settings: &Settings) -> Result<HarvestResult> {
    info!(
        "Harvesting from {} (page size {}, page delay {}ms, rate-limit delay {}ms)",
        settings.upstream.endpoint,
        settings.harvest.page_size,
        settings.harvest.page_delay.as_millis(),
        settings.harvest.retry.delay.as_millis()
    );

    let client = settings.upstream.graphql_client()?;
    let fetcher = GraphQlPageFetcher::tournaments(client, settings.harvest.page_size);
    let harvester = Harvester::new(fetcher, settings.harvest.clone());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = harvester.harvest_with_cancel(cancel).await;
    signal.abort();
    result
}

/// Which snapshot rows `list` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFilter<'a> {
    /// Validated four-digit year contained in the name
    Year(&'a str),
    /// Name fragment, case-insensitive
    Name(&'a str),
}

impl ListFilter<'_> {
    fn select(&self, items: &[Item]) -> Vec<TournamentRow> {
        match self {
            Self::Year(year) => query::by_year(items, year),
            Self::Name(needle) => query::by_name(items, needle),
        }
    }

    /// Count line printed above the rows
    fn heading(&self, count: usize) -> String {
        match self {
            Self::Year(year) => format!("Found {count} tournaments in {year}"),
            Self::Name(needle) => {
                format!("Found {count} tournaments containing \"{}\"", needle.to_lowercase())
            }
        }
    }
}

/// `id  name` lines, capped at `limit`
fn listing_lines(rows: &[TournamentRow], limit: usize) -> Vec<String> {
    rows.iter()
        .take(limit)
        .map(|row| format!("{}  {}", row.id, row.name))
        .collect()
}

fn default_csv_path(year: &str) -> PathBuf {
    PathBuf::from(format!("tournaments_{year}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, name: &str) -> TournamentRow {
        TournamentRow {
            id: id.to_string(),
            name: name.to_string(),
            name_shortened: String::new(),
        }
    }

    #[test]
    fn test_listing_lines_respects_limit() {
        let rows = vec![row("1", "A 2023"), row("2", "B 2023"), row("3", "C 2023")];
        assert_eq!(listing_lines(&rows, 2), vec!["1  A 2023", "2  B 2023"]);
        assert_eq!(listing_lines(&rows, 50).len(), 3);
    }

    fn snapshot_items() -> Vec<Item> {
        vec![
            serde_json::json!({"id": "1", "name": "LCK Spring 2023"}),
            serde_json::json!({"id": "2", "name": "VCT Masters 2024"}),
            serde_json::json!({"id": "3", "name": "lck Summer 2024"}),
        ]
    }

    #[test]
    fn test_year_filter_heading_and_rows() {
        let filter = ListFilter::Year("2024");
        let rows = filter.select(&snapshot_items());

        assert_eq!(filter.heading(rows.len()), "Found 2 tournaments in 2024");
        assert_eq!(
            listing_lines(&rows, 50),
            vec!["2  VCT Masters 2024", "3  lck Summer 2024"]
        );
    }

    #[test]
    fn test_name_filter_heading_and_rows() {
        let filter = ListFilter::Name("LCK");
        let rows = filter.select(&snapshot_items());

        assert_eq!(filter.heading(rows.len()), "Found 2 tournaments containing \"lck\"");
        assert_eq!(
            listing_lines(&rows, 50),
            vec!["1  LCK Spring 2023", "3  lck Summer 2024"]
        );
    }

    #[test]
    fn test_heading_counts_all_matches_not_printed_rows() {
        let filter = ListFilter::Name("");
        let rows = filter.select(&snapshot_items());

        assert_eq!(filter.heading(rows.len()), "Found 3 tournaments containing \"\"");
        assert_eq!(listing_lines(&rows, 1).len(), 1);
    }

    #[test]
    fn test_default_csv_path() {
        assert_eq!(default_csv_path("2023"), PathBuf::from("tournaments_2023.csv"));
    }
}
