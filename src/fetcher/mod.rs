//! Page fetchers for the movie catalog API

use crate::Page;
use async_trait::async_trait;

pub mod movie_http;
pub mod pagination;
pub mod retry_formatter;

pub use movie_http::MovieApiClient;
pub use pagination::{PageStream, PageWalk, PageWalker};

/// Fetcher errors, classified right after the HTTP call
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Upstream rejected the request (4xx)
    #[error("client error {status} calling movie API: {body}")]
    Client {
        /// HTTP status code
        status: u16,
        /// Response body, or a placeholder when empty
        body: String,
    },

    /// Upstream failed to serve the request (5xx)
    #[error("server error {status} calling movie API: {body}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body, or a placeholder when empty
        body: String,
    },

    /// Connection refused, premature close or timeout
    #[error("network error: {0}")]
    Transport(String),

    /// 2xx response whose body does not match the page shape
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetcherError {
    /// Taxonomy tag for this error
    pub fn kind(&self) -> FailureKind {
        match self {
            FetcherError::Client { .. } => FailureKind::Client,
            FetcherError::Server { .. } => FailureKind::Server,
            FetcherError::Transport(_) => FailureKind::Transport,
            FetcherError::Decode(_) => FailureKind::Decode,
        }
    }
}

/// Classification of a failed page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// 4xx
    Client,
    /// 5xx
    Server,
    /// Network level failure
    Transport,
    /// Upstream contract violation
    Decode,
}

impl FailureKind {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Server | FailureKind::Transport)
    }

    /// Short label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Client => "client_error",
            FailureKind::Server => "server_error",
            FailureKind::Transport => "transport_error",
            FailureKind::Decode => "decode_error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Source of catalog pages
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page
    ///
    /// # Arguments
    /// * `page` - 1-based page number
    ///
    /// # Errors
    /// Returns the classified failure once the source's own retry policy is exhausted
    async fn fetch_page(&self, page: u32) -> FetcherResult<Page>;
}
