//! Director threshold query
//!
//! [`DirectorQuery`] composes the [`PageWalker`] with [`DirectorCounts`]:
//!
//! 1. A negative threshold returns an empty result without any upstream call
//! 2. Page 1 is fetched; its failure fails the query
//! 3. Remaining pages are reduced into per-page counts and merged
//! 4. The merged counts are filtered by the threshold
//!
//! Failures are translated into [`QueryError`], the taxonomy exposed to callers.

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::aggregate::DirectorCounts;
use crate::fetcher::pagination::{PageWalker, WalkSummary};
use crate::fetcher::{FetcherError, PageSource};
use crate::metrics::record_query;

/// Query errors
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Upstream rejected the request (4xx)
    #[error("external API rejected the request: {0}")]
    UpstreamRejected(String),

    /// Upstream kept failing with 5xx
    #[error("external API has internal errors: {0}")]
    UpstreamFaulted(String),

    /// Upstream could not be reached
    #[error("external service unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Anything else
    #[error("unexpected error processing directors: {source}")]
    Internal {
        /// Original cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl QueryError {
    /// Wrap an unexpected failure
    pub fn internal(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        QueryError::Internal {
            source: source.into(),
        }
    }

    /// HTTP status presented to API callers
    pub fn http_status(&self) -> u16 {
        match self {
            QueryError::UpstreamRejected(_) => 400,
            QueryError::UpstreamFaulted(_) => 502,
            QueryError::UpstreamUnreachable(_) => 503,
            QueryError::Internal { .. } => 500,
        }
    }

    /// Short title presented to API callers
    pub fn title(&self) -> &'static str {
        match self {
            QueryError::UpstreamRejected(_) => "External API rejected the request",
            QueryError::UpstreamFaulted(_) => "External API has internal errors",
            QueryError::UpstreamUnreachable(_) => "External service unreachable",
            QueryError::Internal { .. } => "Unexpected error",
        }
    }

    /// Label used in metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            QueryError::UpstreamRejected(_) => "upstream_rejected",
            QueryError::UpstreamFaulted(_) => "upstream_faulted",
            QueryError::UpstreamUnreachable(_) => "upstream_unreachable",
            QueryError::Internal { .. } => "internal_error",
        }
    }
}

impl From<FetcherError> for QueryError {
    fn from(err: FetcherError) -> Self {
        match err {
            FetcherError::Client { body, .. } => {
                QueryError::UpstreamRejected(format!("Client error calling Movie API: {body}"))
            }
            FetcherError::Server { body, .. } => {
                QueryError::UpstreamFaulted(format!("Server error calling Movie API: {body}"))
            }
            FetcherError::Transport(message) => QueryError::UpstreamUnreachable(message),
            other @ FetcherError::Decode(_) => QueryError::internal(other),
        }
    }
}

/// Finds directors with more movies than a threshold
pub struct DirectorQuery {
    source: Arc<dyn PageSource>,
    walker: PageWalker,
    timeout: Option<Duration>,
}

impl DirectorQuery {
    /// Create a query over `source` with the default walker and no timeout
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            walker: PageWalker::default(),
            timeout: None,
        }
    }

    /// Use a specific walker
    pub fn with_walker(mut self, walker: PageWalker) -> Self {
        self.walker = walker;
        self
    }

    /// Abort the whole walk after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Directors with strictly more than `threshold` movies, sorted by name
    ///
    /// A negative threshold returns an empty list without contacting the upstream.
    ///
    /// # Errors
    /// Returns the classified failure of page 1 (or of the timeout)
    pub async fn find_directors_above_threshold(
        &self,
        threshold: i64,
    ) -> Result<Vec<String>, QueryError> {
        info!("Finding directors with threshold {}", threshold);

        if threshold < 0 {
            record_query("short_circuit", 0);
            return Ok(Vec::new());
        }

        let counts = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.collect_counts()).await {
                Ok(result) => result,
                Err(_) => Err(QueryError::UpstreamUnreachable(format!(
                    "query timed out after {}ms",
                    limit.as_millis()
                ))),
            },
            None => self.collect_counts().await,
        };

        let counts = match counts {
            Ok(counts) => counts,
            Err(e) => {
                error!("Director query failed: {}", e);
                record_query(e.outcome(), 0);
                return Err(e);
            }
        };

        info!("Director movie counts collected: {:?}", counts.snapshot());
        let result = counts.above(threshold);
        info!(
            "Found {} directors above threshold {}: {:?}",
            result.len(),
            threshold,
            result
        );
        record_query("success", result.len());
        Ok(result)
    }

    /// Walk every page and merge per-page counts
    async fn collect_counts(&self) -> Result<DirectorCounts, QueryError> {
        let walk = self.walker.walk(Arc::clone(&self.source)).await?;

        let mut summary = WalkSummary {
            requested: walk.total_pages,
            fetched: 0,
        };
        let mut counts = DirectorCounts::new();
        let mut pages = walk.pages;

        while let Some(page) = pages.next().await {
            summary.fetched += 1;
            counts.merge(DirectorCounts::from_page(&page));
        }

        if summary.is_complete() {
            info!("Fetched all {} pages", summary.requested);
        } else {
            warn!(
                "Fetched {}/{} pages; {} dropped after retries",
                summary.fetched,
                summary.requested,
                summary.dropped()
            );
        }

        Ok(counts)
    }
}
