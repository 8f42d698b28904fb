//! CSV export of snapshot rows

use crate::error::{Error, Result};
use crate::query::TournamentRow;
use std::path::Path;

/// Header line of the exported CSV
pub const CSV_HEADER: &str = "id,name,nameShortened";

/// Quote a field, doubling any embedded quotes
pub fn csv_escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render rows as CSV (header included, no trailing newline)
pub fn to_csv(rows: &[TournamentRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(rows.iter().map(|row| {
        format!(
            "{},{},{}",
            row.id,
            csv_escape(&row.name),
            csv_escape(&row.name_shortened)
        )
    }));
    lines.join("\n")
}

/// Write rows to `path` as CSV
pub async fn write_csv(path: impl AsRef<Path>, rows: &[TournamentRow]) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, to_csv(rows))
        .await
        .map_err(|e| Error::output(format!("Failed to write {}: {e}", path.display())))
}
