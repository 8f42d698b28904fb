//! Snapshot queries
//!
//! Listing helpers over an exported snapshot. Items stay opaque JSON; only
//! `id`, `name` and `nameShortened` are read, and missing fields read as
//! empty strings.

use crate::error::{Error, Result};
use crate::types::Item;
use serde::Serialize;
use serde_json::Value;

/// Number of matches printed by default
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// The fields downstream tools care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRow {
    pub id: String,
    pub name: String,
    pub name_shortened: String,
}

impl TournamentRow {
    /// Project an item onto its listing fields
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: field_text(item, "id"),
            name: field_text(item, "name"),
            name_shortened: field_text(item, "nameShortened"),
        }
    }
}

fn field_text(item: &Item, field: &str) -> String {
    match item.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Validate a four-digit year argument
pub fn parse_year(year: &str) -> Result<&str> {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        Ok(year)
    } else {
        Err(Error::invalid_value(
            "year",
            format!("expected a four-digit year such as 2023, got '{year}'"),
        ))
    }
}

/// Items whose name contains `year` (names are the only dated field in a snapshot)
pub fn by_year(items: &[Item], year: &str) -> Vec<TournamentRow> {
    items
        .iter()
        .map(TournamentRow::from_item)
        .filter(|row| row.name.contains(year))
        .collect()
}

/// Items whose name contains `needle`, ignoring case
pub fn by_name(items: &[Item], needle: &str) -> Vec<TournamentRow> {
    let needle = needle.to_lowercase();
    items
        .iter()
        .map(TournamentRow::from_item)
        .filter(|row| row.name.to_lowercase().contains(&needle))
        .collect()
}
