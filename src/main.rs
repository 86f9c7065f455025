//! Main entry point for the movie-directors CLI

use anyhow::Context;
use clap::Parser;
use movie_directors::cli::{Cli, Commands};
use movie_directors::shutdown::ShutdownCoordinator;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("movie_directors=info,tower_http=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = movie_directors::metrics::init_metrics(addr) {
            error!("Metrics disabled: {}", e);
        }
    }

    let shutdown = ShutdownCoordinator::shared();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - shutting down...");
                shutdown.request_shutdown();
            }
        }
    });

    let result = match &cli.command {
        Commands::Serve(args) => args
            .execute(shutdown.clone())
            .await
            .context("serve command failed"),
        Commands::Query(args) => args
            .execute(shutdown.clone())
            .await
            .context("query command failed"),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
