//! Upstream API flags shared by every subcommand

use clap::Args;
use std::time::Duration;

use crate::config::{
    MovieApiConfig, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_MAX_IN_MEMORY_SIZE,
    DEFAULT_PAGE_CONCURRENCY, DEFAULT_READ_TIMEOUT_MS, DEFAULT_RESPONSE_TIMEOUT_MS,
    DEFAULT_RETRY_BACKOFF_MS, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_SEARCH_PATH,
    MAX_PAGE_CONCURRENCY,
};

use super::CliError;

/// Parse and validate concurrency value
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_PAGE_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_PAGE_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Movie API connection settings
#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// Base URL of the movie API
    #[arg(long, env = "MOVIE_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Search endpoint path appended to the base URL
    #[arg(long, env = "MOVIE_API_SEARCH_PATH", default_value = DEFAULT_SEARCH_PATH)]
    pub search_path: String,

    /// TCP/TLS connect timeout in milliseconds
    #[arg(long, env = "MOVIE_API_CONNECT_TIMEOUT_MS", default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in milliseconds
    #[arg(long, env = "MOVIE_API_RESPONSE_TIMEOUT_MS", default_value_t = DEFAULT_RESPONSE_TIMEOUT_MS)]
    pub response_timeout_ms: u64,

    /// Idle read timeout in milliseconds
    #[arg(long, env = "MOVIE_API_READ_TIMEOUT_MS", default_value_t = DEFAULT_READ_TIMEOUT_MS)]
    pub read_timeout_ms: u64,

    /// Largest accepted response body in bytes
    #[arg(long, env = "MOVIE_API_MAX_IN_MEMORY_SIZE", default_value_t = DEFAULT_MAX_IN_MEMORY_SIZE)]
    pub max_in_memory_size: usize,

    /// Retries after the first attempt for 5xx and network failures (range: 0-20)
    #[arg(
        long,
        env = "MOVIE_API_RETRY_MAX_ATTEMPTS",
        default_value_t = DEFAULT_RETRY_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(0..=20)
    )]
    pub retry_max_attempts: u32,

    /// Base backoff between retries in milliseconds (doubles every retry)
    #[arg(long, env = "MOVIE_API_RETRY_BACKOFF_MS", default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,

    /// Log every upstream request and response status
    #[arg(long, env = "MOVIE_API_LOG_REQUESTS", default_value_t = false)]
    pub log_requests: bool,

    /// Pages fetched concurrently after the first one (max: 32)
    #[arg(long, env = "MOVIE_API_CONCURRENCY", default_value_t = DEFAULT_PAGE_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,
}

impl ApiArgs {
    /// Build a validated configuration from the flags
    pub fn to_config(&self) -> Result<MovieApiConfig, CliError> {
        let config = MovieApiConfig {
            base_url: self.base_url.clone(),
            search_path: self.search_path.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            response_timeout: Duration::from_millis(self.response_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            max_in_memory_size: self.max_in_memory_size,
            retry_max_attempts: self.retry_max_attempts,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            logging_enabled: self.log_requests,
            page_concurrency: self.concurrency,
        };
        config.validate()?;
        Ok(config)
    }
}
