//! Query command implementation

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::MovieApiConfig;
use crate::fetcher::movie_http::MovieApiClient;
use crate::fetcher::pagination::PageWalker;
use crate::query::DirectorQuery;
use crate::server::DirectorsResponse;
use crate::shutdown::SharedShutdown;

use super::{ApiArgs, CliError, ServeArgs};

/// Movie directors CLI
#[derive(Parser, Debug)]
#[command(name = "movie-directors")]
#[command(about = "Find directors with more movies than a threshold", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Expose Prometheus metrics on this address (e.g. 0.0.0.0:9090)
    #[arg(long, global = true, env = "METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Run a single query and print the result
    Query(QueryArgs),
}

/// Output format for the query command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One director per line
    Human,
    /// `{"directors": [...]}`
    Json,
}

/// Query command arguments
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Directors must have strictly more movies than this
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: i64,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output_format: OutputFormat,

    /// Abort the query after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Upstream API settings
    #[command(flatten)]
    pub api: ApiArgs,
}

/// Wire a [`DirectorQuery`] to the movie API described by `config`
pub fn build_query(
    config: &MovieApiConfig,
    timeout: Option<Duration>,
) -> Result<DirectorQuery, CliError> {
    let client = MovieApiClient::new(config)?;
    let query = DirectorQuery::new(Arc::new(client))
        .with_walker(PageWalker::new(config.page_concurrency));

    Ok(match timeout {
        Some(limit) => query.with_timeout(limit),
        None => query,
    })
}

impl QueryArgs {
    /// Execute the query command
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        let config = self.api.to_config()?;
        let query = build_query(&config, self.timeout_ms.map(Duration::from_millis))?;
        info!("Querying {} with threshold {}", config.base_url, self.threshold);

        let directors = tokio::select! {
            result = query.find_directors_above_threshold(self.threshold) => result?,
            _ = shutdown.wait_for_shutdown() => {
                warn!("Query cancelled by shutdown request");
                return Err(CliError::Interrupted);
            }
        };

        println!("{}", render(&directors, self.output_format, self.threshold)?);
        Ok(())
    }
}

fn render(
    directors: &[String],
    format: OutputFormat,
    threshold: i64,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&DirectorsResponse {
            directors: directors.to_vec(),
        })?),
        OutputFormat::Human if directors.is_empty() => {
            Ok(format!("No directors with more than {threshold} movies"))
        }
        OutputFormat::Human => Ok(directors.join("\n")),
    }
}
