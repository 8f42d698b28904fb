//! Pagination types and traits

use crate::error::Result;
use crate::types::{Cursor, Item};
use async_trait::async_trait;

/// One batch of items plus continuation metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Items in upstream order
    pub items: Vec<Item>,
    /// Whether the upstream reports more pages
    pub has_next: bool,
    /// Cursor to request the following page; present whenever `has_next` is
    pub next_cursor: Option<Cursor>,
}

impl Page {
    /// A page that is followed by another one
    pub fn more(items: Vec<Item>, next_cursor: Cursor) -> Self {
        Self {
            items,
            has_next: true,
            next_cursor: Some(next_cursor),
        }
    }

    /// The final page of the collection
    pub fn last(items: Vec<Item>) -> Self {
        Self {
            items,
            has_next: false,
            next_cursor: None,
        }
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fetches a single page of a remote collection
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page that starts after `cursor` (`None` = start of collection)
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<F> {
    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page> {
        (**self).fetch_page(cursor).await
    }
}
