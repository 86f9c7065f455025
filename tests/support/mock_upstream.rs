//! Scripted movie API served on a local port

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use movie_directors::config::MovieApiConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Script: (page, 0-based attempt for that page) -> (status, body)
pub type Script = Arc<dyn Fn(u32, usize) -> (u16, String) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    script: Script,
    hits: Arc<Mutex<HashMap<u32, usize>>>,
}

/// Running mock upstream; aborted on drop
pub struct MockUpstream {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<u32, usize>>>,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start<F>(script: F) -> Self
    where
        F: Fn(u32, usize) -> (u16, String) + Send + Sync + 'static,
    {
        let hits = Arc::new(Mutex::new(HashMap::new()));
        let state = MockState {
            script: Arc::new(script),
            hits: Arc::clone(&hits),
        };

        let app = Router::new()
            .route("/api/movies/search", get(search))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
            handle,
        }
    }

    /// Requests received for `page`
    pub fn hits(&self, page: u32) -> usize {
        self.hits.lock().unwrap().get(&page).copied().unwrap_or(0)
    }

    /// Requests received for any page
    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    /// Client config with millisecond backoff so retries stay fast
    pub fn config(&self) -> MovieApiConfig {
        MovieApiConfig {
            retry_max_attempts: 2,
            retry_backoff: Duration::from_millis(1),
            response_timeout: Duration::from_secs(5),
            ..MovieApiConfig::with_base_url(self.base_url.clone())
        }
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn search(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(page) = params.get("page").and_then(|p| p.parse::<u32>().ok()) else {
        return (StatusCode::BAD_REQUEST, "missing page").into_response();
    };

    let attempt = {
        let mut hits = state.hits.lock().unwrap();
        let entry = hits.entry(page).or_insert(0);
        *entry += 1;
        *entry - 1
    };

    let (status, body) = (state.script)(page, attempt);
    let status = StatusCode::from_u16(status).unwrap();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// JSON body of one page with the given directors
pub fn page_body(page: u32, total_pages: i64, directors: &[Option<&str>]) -> String {
    let data: Vec<Value> = directors
        .iter()
        .map(|d| {
            json!({
                "Title": format!("Movie on page {page}"),
                "Year": "2010",
                "Rated": "PG-13",
                "Released": "01 Jan 2010",
                "Runtime": "100 min",
                "Genre": "Drama",
                "Director": d,
                "Writer": "Someone",
                "Actors": "Someone Else"
            })
        })
        .collect();

    json!({
        "page": page,
        "per_page": 10,
        "total": data.len(),
        "total_pages": total_pages,
        "data": data,
    })
    .to_string()
}
