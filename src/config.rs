//! Movie API configuration and retry constants

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://challenge.iscompany.com";

/// Default search endpoint path
pub const DEFAULT_SEARCH_PATH: &str = "/api/movies/search";

/// Default connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Default overall response timeout in milliseconds
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 10_000;

/// Default read (idle) timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;

/// Default maximum response body size held in memory (2 MiB)
pub const DEFAULT_MAX_IN_MEMORY_SIZE: usize = 2 * 1024 * 1024;

/// Default number of retries after the first attempt
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// Default base backoff in milliseconds
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Default number of pages fetched concurrently after page 1
pub const DEFAULT_PAGE_CONCURRENCY: usize = 4;

/// Upper bound for page fan-out
pub const MAX_PAGE_CONCURRENCY: usize = 32;

/// Maximum backoff delay in milliseconds.
/// Caps exponential growth so a large retry budget never sleeps for minutes.
pub const MAX_BACKOFF_MS: u64 = 30_000;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Base URL could not be parsed
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Offending value
        url: String,
        /// Parser message
        reason: String,
    },

    /// Search path is not absolute
    #[error("search path must start with '/', got '{0}'")]
    InvalidSearchPath(String),

    /// A numeric setting is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP client construction failed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Settings for talking to the upstream movie API
#[derive(Debug, Clone)]
pub struct MovieApiConfig {
    /// Scheme, host and optional path prefix (e.g. `https://example.com`)
    pub base_url: String,
    /// Search endpoint appended to `base_url`
    pub search_path: String,
    /// Time allowed to establish a TCP/TLS connection
    pub connect_timeout: Duration,
    /// Time allowed for a whole request, including the body
    pub response_timeout: Duration,
    /// Time allowed between reads of the response
    pub read_timeout: Duration,
    /// Largest response body accepted, in bytes
    pub max_in_memory_size: usize,
    /// Retries after the first attempt for 5xx and transport failures
    pub retry_max_attempts: u32,
    /// Base delay for exponential backoff
    pub retry_backoff: Duration,
    /// Log every request and response status at debug level
    pub logging_enabled: bool,
    /// Pages fetched concurrently after page 1
    pub page_concurrency: usize,
}

impl Default for MovieApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            response_timeout: Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            max_in_memory_size: DEFAULT_MAX_IN_MEMORY_SIZE,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            logging_enabled: false,
            page_concurrency: DEFAULT_PAGE_CONCURRENCY,
        }
    }
}

impl MovieApiConfig {
    /// Config pointing at `base_url` with every other setting at its default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Check that the settings describe a usable upstream
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search_url()?;

        if self.max_in_memory_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_in_memory_size",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.page_concurrency == 0 || self.page_concurrency > MAX_PAGE_CONCURRENCY {
            return Err(ConfigError::InvalidValue {
                field: "page_concurrency",
                reason: format!(
                    "must be between 1 and {MAX_PAGE_CONCURRENCY}, got {}",
                    self.page_concurrency
                ),
            });
        }

        Ok(())
    }

    /// Full URL of the search endpoint, without the page parameter
    pub fn search_url(&self) -> Result<Url, ConfigError> {
        if !self.search_path.starts_with('/') {
            return Err(ConfigError::InvalidSearchPath(self.search_path.clone()));
        }

        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), self.search_path);
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }

    /// Build a reqwest client carrying the configured timeouts
    pub fn build_http_client(&self) -> Result<Client, ConfigError> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.response_timeout)
            .read_timeout(self.read_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}

/// Calculate exponential backoff delay for the given retry (0-based)
pub fn calculate_backoff(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retry))
        .min(Duration::from_millis(MAX_BACKOFF_MS))
}
