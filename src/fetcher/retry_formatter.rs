//! Retry message formatting for the movie API client.
//!
//! Keeps retry, recovery and final-failure log lines consistent so a flaky
//! upstream reads the same way in every log.

use reqwest::Error as ReqwestError;
use std::time::Duration;

use super::FailureKind;

/// Describe a transport-level reqwest error in a few words.
pub fn describe_transport_error(err: &ReqwestError) -> &'static str {
    if err.is_timeout() {
        "network timeout"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_body() || err.is_decode() {
        "connection closed while reading body"
    } else if err.is_request() {
        "request could not be sent"
    } else {
        "network error"
    }
}

/// Context for formatting retry messages.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Current attempt number (1-based)
    pub attempt: u32,
    /// Maximum number of attempts configured (first attempt included)
    pub max_attempts: u32,
    /// Classification of the error that triggered the retry
    pub kind: FailureKind,
    /// Backoff duration until next attempt
    pub backoff_duration: Duration,
    /// Page being fetched
    pub page: u32,
    /// Original error message for details
    pub error_message: String,
    /// URL that failed
    pub endpoint: String,
}

impl RetryContext {
    /// Convenience constructor used by the retry loop.
    pub fn new(
        attempt: u32,
        max_attempts: u32,
        kind: FailureKind,
        page: u32,
        error_message: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            attempt,
            max_attempts,
            kind,
            backoff_duration: Duration::ZERO,
            page,
            error_message: error_message.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Set the delay before the next attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff_duration = backoff;
        self
    }

    /// Format standardized retry message with attempt counters.
    pub fn format_retry(&self) -> String {
        format!(
            "Retrying page {} (attempt {}/{}) after {} - waiting {:.1} seconds...",
            self.page,
            self.attempt,
            self.max_attempts,
            describe_kind(self.kind),
            self.backoff_duration.as_secs_f64()
        )
    }

    /// Format recovery message when a retried attempt eventually works.
    pub fn format_success(&self) -> String {
        format!(
            "Page {} fetched on attempt {}/{}",
            self.page, self.attempt, self.max_attempts
        )
    }

    /// Format final failure summary.
    pub fn format_failure(&self) -> String {
        [
            format!(
                "[FAILED] Page {} failed after {} attempts",
                self.page, self.attempt
            ),
            format!("  Last error: {}", self.error_message),
            format!("  Endpoint: {}", self.endpoint),
            format!("  Suggestion: {}", suggestion(self.kind)),
        ]
        .join("\n")
    }
}

fn describe_kind(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Client => "client error",
        FailureKind::Server => "server error",
        FailureKind::Transport => "network error",
        FailureKind::Decode => "malformed response",
    }
}

fn suggestion(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Client => "Review the request parameters and search path",
        FailureKind::Server => "Movie API may be experiencing issues, try again later",
        FailureKind::Transport => "Check network connectivity and the configured timeouts",
        FailureKind::Decode => "Movie API response no longer matches the expected page shape",
    }
}
