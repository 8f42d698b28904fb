//! GraphQL-backed page fetcher

use super::types::{Page, PageFetcher};
use crate::error::{Error, Result};
use crate::graphql::{Connection, GraphQlClient, GraphQlRequest};
use crate::types::{Cursor, Item, OptionStringExt};
use async_trait::async_trait;
use serde_json::json;

/// Tournaments listing, one Relay page at a time
pub const TOURNAMENTS_QUERY: &str = r"
    query TournamentsPage($first: Int!, $after: Cursor) {
      tournaments(first: $first, after: $after) {
        totalCount
        pageInfo { hasNextPage endCursor }
        edges {
          cursor
          node {
            id
            name
            nameShortened
          }
        }
      }
    }
";

/// Fetches pages of a Relay connection with `first`/`after` variables
#[derive(Debug, Clone)]
pub struct GraphQlPageFetcher {
    client: GraphQlClient,
    page_size: u32,
    query: String,
    connection_field: String,
}

impl GraphQlPageFetcher {
    /// Fetcher for the tournaments collection
    pub fn tournaments(client: GraphQlClient, page_size: u32) -> Self {
        Self::new(client, page_size, TOURNAMENTS_QUERY, "tournaments")
    }

    /// Fetcher for any connection whose query takes `$first` and `$after`
    pub fn new(
        client: GraphQlClient,
        page_size: u32,
        query: impl Into<String>,
        connection_field: impl Into<String>,
    ) -> Self {
        Self {
            client,
            page_size,
            query: query.into(),
            connection_field: connection_field.into(),
        }
    }

    /// Requested page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn request(&self, cursor: Option<&Cursor>) -> GraphQlRequest {
        GraphQlRequest::new(self.query.as_str()).with_variables(json!({
            "first": self.page_size,
            "after": cursor.map(Cursor::as_str),
        }))
    }
}

#[async_trait]
impl PageFetcher for GraphQlPageFetcher {
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page> {
        let connection: Connection<Item> = self
            .client
            .query_field(&self.request(cursor), &self.connection_field)
            .await?;
        page_from_connection(connection)
    }
}

/// Convert a Relay connection into a [`Page`].
///
/// `hasNextPage` without an `endCursor` is rejected: following it would
/// restart from the beginning of the collection.
pub(crate) fn page_from_connection(connection: Connection<Item>) -> Result<Page> {
    let has_next = connection.page_info.has_next_page;
    let end_cursor = connection.page_info.end_cursor.clone().none_if_empty();
    let items = connection.into_nodes();

    if !has_next {
        return Ok(Page::last(items));
    }

    match end_cursor {
        Some(token) => Ok(Page::more(items, Cursor::new(token))),
        None => Err(Error::pagination(
            "upstream reported hasNextPage without an endCursor",
        )),
    }
}
