//! Observability metrics for the director query pipeline
//!
//! ## Architecture
//!
//! - Uses `metrics` crate for low-overhead metric collection
//! - Optional Prometheus exporter for a scrape endpoint
//! - Without an installed recorder every call is a no-op

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Set once the exporter has been installed
static METRICS_INITIALIZED: OnceCell<SocketAddr> = OnceCell::new();

/// Correlation ID generator for request tracing
static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Initialize metrics system with Prometheus exporter
///
/// Idempotent: a second call is ignored.
///
/// # Arguments
/// * `addr` - Socket address to bind Prometheus scrape endpoint (e.g., "0.0.0.0:9090")
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    if let Some(existing) = METRICS_INITIALIZED.get() {
        debug!("Metrics already initialized on {}, skipping", existing);
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "movie_api_requests_total",
        Unit::Count,
        "Total number of HTTP requests made to the movie API"
    );
    describe_histogram!(
        "movie_api_request_duration_seconds",
        Unit::Seconds,
        "Movie API request duration in seconds"
    );
    describe_counter!(
        "movie_api_retries_total",
        Unit::Count,
        "Total number of retry attempts"
    );
    describe_counter!(
        "pages_dropped_total",
        Unit::Count,
        "Pages skipped after exhausting retries"
    );
    describe_counter!(
        "director_queries_total",
        Unit::Count,
        "Director threshold queries by outcome"
    );

    let _ = METRICS_INITIALIZED.set(addr);
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Generate a new correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// Timing and outcome of one movie API request
pub struct HttpRequestMetrics {
    page: u32,
    attempt: u32,
    start_time: Instant,
    correlation_id: String,
}

impl HttpRequestMetrics {
    /// Start recording a new HTTP request
    pub fn start(page: u32, attempt: u32) -> Self {
        let correlation_id = generate_correlation_id();
        debug!(
            correlation_id = %correlation_id,
            page = page,
            attempt = attempt,
            "Starting movie API request"
        );

        Self {
            page,
            attempt,
            start_time: Instant::now(),
            correlation_id,
        }
    }

    /// Record a response with a status code
    pub fn record_complete(&self, status_code: u16) {
        self.record(status_code.to_string());
        debug!(
            correlation_id = %self.correlation_id,
            page = self.page,
            status = status_code,
            duration_ms = self.start_time.elapsed().as_millis(),
            "Movie API request completed"
        );
    }

    /// Record a network error (no status code)
    pub fn record_transport_error(&self) {
        self.record("network_error".to_string());
        warn!(
            correlation_id = %self.correlation_id,
            page = self.page,
            attempt = self.attempt,
            duration_ms = self.start_time.elapsed().as_millis(),
            "Movie API network error"
        );
    }

    /// Get the correlation ID for this request
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    fn record(&self, status: String) {
        counter!("movie_api_requests_total", "status" => status).increment(1);
        histogram!("movie_api_request_duration_seconds")
            .record(self.start_time.elapsed().as_secs_f64());
    }
}

/// Record retry backoff duration
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!("movie_api_retries_total", "attempt" => attempt.to_string()).increment(1);
    histogram!("retry_backoff_duration_seconds").record(duration.as_secs_f64());
}

/// Record a page dropped by the walker
pub fn record_page_dropped(reason: &'static str) {
    counter!("pages_dropped_total", "reason" => reason).increment(1);
}

/// Record the outcome of a director query
pub fn record_query(outcome: &'static str, directors: usize) {
    counter!("director_queries_total", "outcome" => outcome).increment(1);
    histogram!("director_query_result_size").record(directors as f64);
}
