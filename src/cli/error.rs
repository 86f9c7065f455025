//! CLI error types and conversions

use crate::config::ConfigError;
use crate::query::QueryError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),

    /// Query error
    #[error("query error: {0}")]
    QueryError(#[from] QueryError),

    /// IO error (binding the listener, writing output)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Output serialization error
    #[error("output error: {0}")]
    OutputError(#[from] serde_json::Error),

    /// Interrupted by Ctrl+C before completion
    #[error("interrupted before completion")]
    Interrupted,
}
