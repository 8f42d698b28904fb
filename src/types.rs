//! Common types used throughout grid-harvest
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// A harvested record. Opaque to the harvester: it is counted and appended,
/// never interpreted.
pub type Item = JsonValue;

// ============================================================================
// Cursor
// ============================================================================

/// Server-issued continuation token.
///
/// Only ever produced from an upstream response and handed back verbatim.
/// Cursors are never parsed or compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token received from the upstream
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for placing back into a request
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render an optional cursor for log lines (`null` for the start of the collection)
pub fn display_cursor(cursor: Option<&Cursor>) -> &str {
    cursor.map_or("null", Cursor::as_str)
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff between rate-limit retries
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    #[default]
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.trim().is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
