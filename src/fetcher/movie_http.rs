//! HTTP client for the movie catalog search endpoint
//!
//! Provides the single-page fetch used by the walker with:
//! - Response classification into the fetcher error taxonomy
//! - Retry logic with exponential backoff for 5xx and transport failures
//! - A cap on the response body held in memory

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::{calculate_backoff, ConfigError, MovieApiConfig};
use crate::fetcher::retry_formatter::{describe_transport_error, RetryContext};
use crate::fetcher::{FetcherError, FetcherResult, PageSource};
use crate::metrics::{record_retry_backoff, HttpRequestMetrics};
use crate::Page;

/// Placeholder used when a 4xx response has no body
const EMPTY_CLIENT_ERROR_BODY: &str = "Client error";

/// Placeholder used when a 5xx response has no body
const EMPTY_SERVER_ERROR_BODY: &str = "Server error";

/// Client for `GET <base_url><search_path>?page=<n>`
#[derive(Debug, Clone)]
pub struct MovieApiClient {
    client: Client,
    search_url: Url,
    max_retries: u32,
    retry_backoff: Duration,
    max_body_bytes: usize,
    log_requests: bool,
}

impl MovieApiClient {
    /// Create a client with its own reqwest client built from `config`
    pub fn new(config: &MovieApiConfig) -> Result<Self, ConfigError> {
        let client = config.build_http_client()?;
        Self::with_client(client, config)
    }

    /// Create a client reusing an existing reqwest client
    ///
    /// Timeouts configured on `client` take precedence over those in `config`.
    pub fn with_client(client: Client, config: &MovieApiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let search_url = config.search_url()?;
        debug!("Movie API client configured for {}", search_url);

        Ok(Self {
            client,
            search_url,
            max_retries: config.retry_max_attempts,
            retry_backoff: config.retry_backoff,
            max_body_bytes: config.max_in_memory_size,
            log_requests: config.logging_enabled,
        })
    }

    /// Search endpoint this client calls
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Retries performed after the first attempt
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetch one page, retrying transient failures
    ///
    /// Retries on:
    /// - 5xx server errors
    /// - Network errors (connect failure, timeout, premature close)
    ///
    /// Does not retry on:
    /// - 4xx client errors
    /// - Bodies that fail to decode
    pub async fn get_page(&self, page: u32) -> FetcherResult<Page> {
        let max_attempts = self.max_retries.saturating_add(1);
        let mut retry = 0;
        let mut last_kind = None;

        loop {
            let attempt = retry + 1;
            match self.fetch_once(page, attempt).await {
                Ok(result) => {
                    if let Some(kind) = last_kind {
                        let context = RetryContext::new(
                            attempt,
                            max_attempts,
                            kind,
                            page,
                            "",
                            self.search_url.as_str(),
                        );
                        info!("{}", context.format_success());
                    }
                    return Ok(result);
                }
                Err(err) => {
                    let kind = err.kind();
                    let context = RetryContext::new(
                        attempt,
                        max_attempts,
                        kind,
                        page,
                        err.to_string(),
                        self.search_url.as_str(),
                    );

                    if !kind.is_retryable() {
                        error!("Movie API error on page {}: {}", page, err);
                        return Err(err);
                    }

                    if retry >= self.max_retries {
                        error!("{}", context.format_failure());
                        return Err(err);
                    }

                    let backoff = calculate_backoff(self.retry_backoff, retry);
                    warn!("{}", context.with_backoff(backoff).format_retry());
                    record_retry_backoff(backoff, attempt);
                    tokio::time::sleep(backoff).await;
                    last_kind = Some(kind);
                    retry += 1;
                }
            }
        }
    }

    /// Execute a single request and classify the outcome
    async fn fetch_once(&self, page: u32, attempt: u32) -> FetcherResult<Page> {
        let request_metrics = HttpRequestMetrics::start(page, attempt);

        if self.log_requests {
            debug!(
                correlation_id = %request_metrics.correlation_id(),
                "Movie API request: GET {}?page={}",
                self.search_url,
                page
            );
        }

        let response = match self
            .client
            .get(self.search_url.clone())
            .query(&[("page", page)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                request_metrics.record_transport_error();
                return Err(FetcherError::Transport(format!(
                    "{}: {}",
                    describe_transport_error(&e),
                    e
                )));
            }
        };

        let status = response.status();
        request_metrics.record_complete(status.as_u16());

        if self.log_requests {
            debug!(
                correlation_id = %request_metrics.correlation_id(),
                "Movie API response status: {}", status
            );
        }

        if status.is_client_error() {
            let body = self.error_body(response, EMPTY_CLIENT_ERROR_BODY).await;
            return Err(FetcherError::Client {
                status: status.as_u16(),
                body,
            });
        }

        if status.is_server_error() {
            let body = self.error_body(response, EMPTY_SERVER_ERROR_BODY).await;
            return Err(FetcherError::Server {
                status: status.as_u16(),
                body,
            });
        }

        if !status.is_success() {
            return Err(FetcherError::Decode(format!(
                "unexpected status {status} from movie API"
            )));
        }

        let bytes = self.read_body(response).await?;
        let parsed: Page = serde_json::from_slice(&bytes).map_err(|e| {
            FetcherError::Decode(format!("failed to deserialize page {page}: {e}"))
        })?;

        debug!(
            "Response received: page={}, total_pages={}, movies={}",
            parsed.page,
            parsed.total_pages,
            parsed.data.len()
        );
        Ok(parsed)
    }

    /// Read the body chunk by chunk, refusing anything above `max_body_bytes`
    async fn read_body(&self, mut response: Response) -> FetcherResult<Vec<u8>> {
        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(self.body_too_large());
            }
        }

        let mut body = Vec::new();
        loop {
            let chunk = response.chunk().await.map_err(|e| {
                FetcherError::Transport(format!("{}: {}", describe_transport_error(&e), e))
            })?;
            let Some(chunk) = chunk else {
                break;
            };
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(self.body_too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    /// Error body text under the same size cap, or `placeholder` when it is
    /// empty, oversized or unreadable
    async fn error_body(&self, response: Response, placeholder: &str) -> String {
        let status = response.status();
        match self.read_body(response).await {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                if text.trim().is_empty() {
                    return placeholder.to_string();
                }
                error!("{} error body from movie API: {}", status, text);
                text
            }
            Err(e) => {
                warn!("Discarding {} error body: {}", status, e);
                placeholder.to_string()
            }
        }
    }

    fn body_too_large(&self) -> FetcherError {
        FetcherError::Decode(format!(
            "response body exceeds {} bytes",
            self.max_body_bytes
        ))
    }
}

#[async_trait]
impl PageSource for MovieApiClient {
    async fn fetch_page(&self, page: u32) -> FetcherResult<Page> {
        self.get_page(page).await
    }
}
