//! # Movie Directors Library
//!
//! Answers "which directors have more than N movies?" against a paginated
//! third-party movie catalog API.
//!
//! ## Features
//!
//! - **Paginated Drain**: Fetches page 1, reads the declared page count, then fans out
//!   over the remaining pages with bounded concurrency
//! - **Retry Policy**: Exponential backoff for upstream 5xx and transport failures
//! - **Failure Isolation**: A page other than the first that keeps failing is dropped
//!   instead of failing the whole query
//! - **Error Taxonomy**: Upstream failures are classified once, at the HTTP boundary
//! - **HTTP API**: `GET /api/directors?threshold=N`
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use movie_directors::config::MovieApiConfig;
//! use movie_directors::fetcher::movie_http::MovieApiClient;
//! use movie_directors::query::DirectorQuery;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MovieApiConfig::default();
//! let client = MovieApiClient::new(&config)?;
//! let query = DirectorQuery::new(Arc::new(client));
//!
//! let directors = query.find_directors_above_threshold(4).await?;
//! println!("{directors:?}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - Page fetching, retry policy and the page walker
//! - [`aggregate`] - Director movie counting
//! - [`query`] - Query orchestration and outward error taxonomy
//! - [`server`] - HTTP routes
//! - [`config`] - Upstream API configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Director movie counting
pub mod aggregate;

/// CLI command implementations
pub mod cli;

/// Upstream API configuration
pub mod config;

/// Page fetching and walking
pub mod fetcher;

/// Observability metrics
pub mod metrics;

/// Query orchestration
pub mod query;

/// HTTP API
pub mod server;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

// Re-export commonly used types
pub use aggregate::DirectorCounts;
pub use query::{DirectorQuery, QueryError};

/// Error returned when a rating string is not one of the known ratings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rating: {0}")]
pub struct RatingParseError(pub String);

/// Motion picture rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Rating {
    /// General audiences
    G,
    /// Parental guidance suggested
    Pg,
    /// Parents strongly cautioned
    Pg13,
    /// Restricted
    R,
    /// Adults only
    Nc17,
    /// No rating assigned
    NotRated,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rating::G => "G",
            Rating::Pg => "PG",
            Rating::Pg13 => "PG-13",
            Rating::R => "R",
            Rating::Nc17 => "NC-17",
            Rating::NotRated => "NOT RATED",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Rating {
    type Err = RatingParseError;

    /// Case-insensitive; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "G" => Ok(Rating::G),
            "PG" => Ok(Rating::Pg),
            "PG_13" => Ok(Rating::Pg13),
            "R" => Ok(Rating::R),
            "NC_17" => Ok(Rating::Nc17),
            "NOT RATED" | "NOT_RATED" => Ok(Rating::NotRated),
            _ => Err(RatingParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Rating {
    type Error = RatingParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rating> for String {
    fn from(rating: Rating) -> Self {
        rating.to_string()
    }
}

/// One movie as returned by the catalog API
///
/// Only `director` is consumed by the aggregation; everything else is carried
/// through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    /// Movie title
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    /// Release year
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    /// Release date (e.g. "17 Jan 2003")
    #[serde(rename = "Released", default)]
    pub released: Option<String>,
    /// Runtime (e.g. "116 min")
    #[serde(rename = "Runtime", default)]
    pub runtime: Option<String>,
    /// Comma separated genres
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    /// Rating; an unknown value fails decoding
    #[serde(rename = "Rated", default)]
    pub rated: Option<Rating>,
    /// Director name
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    /// Writers
    #[serde(rename = "Writer", default)]
    pub writer: Option<String>,
    /// Main actors
    #[serde(rename = "Actors", default)]
    pub actors: Option<String>,
}

impl MovieRecord {
    /// Build a record that only carries a director
    pub fn directed_by(director: impl Into<String>) -> Self {
        Self {
            director: Some(director.into()),
            ..Self::default()
        }
    }

    /// Director name, if present and non-empty
    pub fn director_name(&self) -> Option<&str> {
        self.director.as_deref().filter(|name| !name.is_empty())
    }
}

/// One page of the catalog search endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// 1-based page number
    #[serde(default)]
    pub page: i64,
    /// Records per page
    #[serde(default)]
    pub per_page: i64,
    /// Total number of records across all pages
    #[serde(default)]
    pub total: i64,
    /// Declared number of pages (only trusted on the first page)
    #[serde(default)]
    pub total_pages: i64,
    /// Records on this page; `null` entries are skipped
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<MovieRecord>,
}

impl Page {
    /// Build a page with the given metadata and records
    pub fn new(page: i64, total_pages: i64, data: Vec<MovieRecord>) -> Self {
        Self {
            page,
            per_page: data.len() as i64,
            total: data.len() as i64,
            total_pages,
            data,
        }
    }

    /// Declared page count clamped to at least one page
    pub fn effective_total_pages(&self) -> u32 {
        self.total_pages.clamp(1, i64::from(u32::MAX)) as u32
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<MovieRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Option::<Vec<Option<MovieRecord>>>::deserialize(deserializer)?;
    Ok(records.into_iter().flatten().flatten().collect())
}
