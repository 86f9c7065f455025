//! CLI command implementations

pub mod api;
pub mod error;
pub mod query;
pub mod serve;

pub use api::ApiArgs;
pub use error::CliError;
pub use query::{Cli, Commands, QueryArgs};
pub use serve::ServeArgs;
