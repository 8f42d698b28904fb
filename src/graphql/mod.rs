//! GraphQL module
//!
//! Request/response envelopes for the upstream GraphQL API and a client that
//! turns `errors` arrays and failed statuses into [`Error`](crate::Error)
//! values carrying the raw upstream text.

mod client;
mod types;

pub use client::{AuthPing, GraphQlClient};
pub use types::{Connection, Edge, GraphQlRequest, GraphQlResponse, PageInfo};

#[cfg(test)]
mod tests;
