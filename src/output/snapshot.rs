//! Snapshot file writer and loader

use crate::error::{Error, Result, ResultExt};
use crate::harvest::HarvestResult;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name used when no output path is given
pub const DEFAULT_SNAPSHOT_FILE: &str = "tournaments.json";

/// Write `result` as pretty JSON to `path`.
///
/// The document goes to a sibling temp file first and is renamed into place,
/// so a failed write never leaves a truncated snapshot behind.
pub async fn write_snapshot(path: impl AsRef<Path>, result: &HarvestResult) -> Result<()> {
    let path = path.as_ref();
    let contents = serde_json::to_string_pretty(result)?;

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, &contents)
        .await
        .map_err(|e| Error::output(format!("Failed to write {}: {e}", temp_path.display())))?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(Error::output(format!(
            "Failed to move snapshot into {}: {e}",
            path.display()
        )));
    }

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Load a snapshot written by [`write_snapshot`]
pub async fn load_snapshot(path: impl AsRef<Path>) -> Result<HarvestResult> {
    let path = path.as_ref();
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let mut snapshot: HarvestResult = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    // count always mirrors items
    snapshot.count = snapshot.items.len();
    Ok(snapshot)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
