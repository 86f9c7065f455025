//! Serve command implementation

use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::server;
use crate::shutdown::SharedShutdown;

use super::query::build_query;
use super::{ApiArgs, CliError};

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Abort a query after this many milliseconds
    #[arg(long, env = "QUERY_TIMEOUT_MS")]
    pub query_timeout_ms: Option<u64>,

    /// Upstream API settings
    #[command(flatten)]
    pub api: ApiArgs,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        let config = self.api.to_config()?;
        let query = build_query(&config, self.query_timeout_ms.map(Duration::from_millis))?;

        let listener = TcpListener::bind(self.listen).await?;
        server::serve(listener, server::router(Arc::new(query)), shutdown).await?;
        Ok(())
    }
}
