//! Page walker for the movie catalog search endpoint
//!
//! Drains a page-number paginated resource:
//! - Page 1 is fetched first and its `total_pages` is authoritative
//! - Pages 2..=total_pages are fetched with bounded concurrency
//! - A failing page after page 1 is logged and dropped
//! - Non-positive `total_pages` is treated as a single page

use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_PAGE_CONCURRENCY;
use crate::fetcher::{FetcherResult, PageSource};
use crate::metrics::record_page_dropped;
use crate::Page;

/// Lazy, one-shot stream of successfully fetched pages
pub type PageStream = Pin<Box<dyn Stream<Item = Page> + Send>>;

/// An in-progress walk
pub struct PageWalk {
    /// Number of pages the walk will request, page 1 included
    pub total_pages: u32,
    /// Page 1 followed by the surviving pages in ascending order
    pub pages: PageStream,
}

/// Counts reported once a walk has been drained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    /// Pages requested, page 1 included
    pub requested: u32,
    /// Pages that arrived
    pub fetched: u32,
}

impl WalkSummary {
    /// Pages lost to failures
    pub fn dropped(&self) -> u32 {
        self.requested.saturating_sub(self.fetched)
    }

    /// Whether every requested page arrived
    pub fn is_complete(&self) -> bool {
        self.dropped() == 0
    }
}

/// Walks every page of the search endpoint
#[derive(Debug, Clone, Copy)]
pub struct PageWalker {
    concurrency: usize,
}

impl Default for PageWalker {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_CONCURRENCY)
    }
}

impl PageWalker {
    /// Create a walker fetching up to `concurrency` pages at once (minimum 1)
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Configured fan-out
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Start a walk
    ///
    /// # Errors
    /// Returns the page 1 failure; later page failures never surface here
    pub async fn walk(&self, source: Arc<dyn PageSource>) -> FetcherResult<PageWalk> {
        let first = source.fetch_page(1).await?;
        info!("Movies found in first page: {}", first.data.len());

        let total_pages = first.effective_total_pages();

        if total_pages == 1 {
            debug!("Single page result, nothing more to fetch");
            return Ok(PageWalk {
                total_pages,
                pages: Box::pin(stream::iter([first])),
            });
        }

        debug!(
            "Fetching pages 2..={} with concurrency {}",
            total_pages, self.concurrency
        );

        let remaining = stream::iter(2..=total_pages)
            .map(move |page| {
                let source = Arc::clone(&source);
                async move { (page, source.fetch_page(page).await) }
            })
            .buffered(self.concurrency)
            .filter_map(|(page, result)| async move {
                match result {
                    Ok(fetched) => {
                        debug!("Fetched page {}", page);
                        Some(fetched)
                    }
                    Err(e) => {
                        warn!("Failed to fetch page {}: {}", page, e);
                        record_page_dropped(e.kind().as_str());
                        None
                    }
                }
            });

        Ok(PageWalk {
            total_pages,
            pages: Box::pin(stream::iter([first]).chain(remaining)),
        })
    }
}
