//! GraphQL envelope types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a GraphQL POST
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    /// Query document
    pub query: String,
    /// Query variables
    #[serde(skip_serializing_if = "Value::is_null")]
    pub variables: Value,
}

impl GraphQlRequest {
    /// Create a request without variables
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Value::Null,
        }
    }

    /// Set the variables object
    #[must_use]
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }
}

/// Top-level GraphQL response
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse {
    /// Result data, absent when the whole request failed
    #[serde(default)]
    pub data: Option<Value>,
    /// Errors, kept as raw JSON so their text survives untouched
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

impl GraphQlResponse {
    /// The `errors` array when it is present and non-empty
    pub fn errors(&self) -> Option<&[Value]> {
        self.errors.as_deref().filter(|e| !e.is_empty())
    }
}

/// Relay-style connection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    /// Size of the whole collection, when the upstream reports it
    #[serde(default)]
    pub total_count: Option<u64>,
    /// Continuation metadata
    #[serde(default)]
    pub page_info: PageInfo,
    /// Page contents
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<N>>,
}

impl<N> Connection<N> {
    /// Consume the connection, keeping only the nodes in upstream order
    pub fn into_nodes(self) -> Vec<N> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

/// Relay `pageInfo`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether another page follows
    #[serde(default)]
    pub has_next_page: bool,
    /// Cursor of the last edge on this page
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// Relay edge
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<N> {
    /// Per-edge cursor
    #[serde(default)]
    pub cursor: Option<String>,
    /// The record
    pub node: N,
}
