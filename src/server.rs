//! HTTP API
//!
//! - `GET /api/directors?threshold=<n>` → `{"directors": [...]}`
//! - `GET /health` → `{"status": "ok"}`
//!
//! Errors are returned as `{"title": ..., "detail": ...}`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::query::{DirectorQuery, QueryError};
use crate::shutdown::SharedShutdown;

/// Successful response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorsResponse {
    /// Director names sorted ascending
    pub directors: Vec<String>,
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short summary
    pub title: String,
    /// Details, when available
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThresholdParams {
    threshold: i64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Build the Axum router
pub fn router(query: Arc<DirectorQuery>) -> Router {
    Router::new()
        .route("/api/directors", get(get_directors))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(query)
}

/// Serve `router` on `listener` until shutdown is requested
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: SharedShutdown,
) -> std::io::Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!("Director API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.wait_for_shutdown().await })
        .await?;

    info!("Director API stopped");
    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn get_directors(
    State(query): State<Arc<DirectorQuery>>,
    params: Result<Query<ThresholdParams>, QueryRejection>,
) -> Result<Json<DirectorsResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| bad_request(rejection.body_text()))?;

    if params.threshold < 0 {
        return Err(bad_request(
            "threshold: Threshold must be a positive integer".to_string(),
        ));
    }

    info!(
        "Received request for directors, threshold={}",
        params.threshold
    );

    query
        .find_directors_above_threshold(params.threshold)
        .await
        .map(|directors| Json(DirectorsResponse { directors }))
        .map_err(query_error_response)
}

fn bad_request(detail: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            title: "Invalid request parameter".to_string(),
            detail: Some(detail),
        }),
    )
}

fn query_error_response(e: QueryError) -> ApiError {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            title: e.title().to_string(),
            detail: Some(e.to_string()),
        }),
    )
}
