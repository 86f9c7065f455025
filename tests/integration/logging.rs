//! Integration tests for logging and tracing

use movie_directors::DirectorQuery;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::support::fake_source::{FakeSource, Outcome};

/// Writer collecting formatted log lines in memory
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(filter: &str, json: bool) -> (Captured, tracing::subscriber::DefaultGuard) {
    let captured = Captured::default();
    let writer = captured.clone();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_ansi(false)
        .with_writer(move || writer.clone());

    let guard = if json {
        tracing::subscriber::set_default(builder.json().finish())
    } else {
        tracing::subscriber::set_default(builder.finish())
    };
    (captured, guard)
}

#[test]
fn test_default_filter_directives_parse() {
    assert!(EnvFilter::try_new("movie_directors=info,tower_http=info").is_ok());
    assert!(EnvFilter::try_new("movie_directors::fetcher=debug,movie_directors=info").is_ok());
    assert!(EnvFilter::try_new("movie_directors=loud").is_err());
}

#[tokio::test]
async fn test_dropped_pages_are_reported() {
    let (captured, _guard) = capture("movie_directors=info", false);

    let source = Arc::new(
        FakeSource::new()
            .page(1, 3, &[Some("A")])
            .outcome(2, Outcome::Server(500, "boom"))
            .page(3, 3, &[Some("B")]),
    );
    let result = DirectorQuery::new(source)
        .find_directors_above_threshold(0)
        .await
        .unwrap();

    assert_eq!(result, vec!["A", "B"]);
    let logs = captured.text();
    assert!(logs.contains("Failed to fetch page 2"), "logs were: {logs}");
    assert!(logs.contains("Fetched 2/3 pages"), "logs were: {logs}");
    assert!(logs.contains("Found 2 directors above threshold 0"));
}

#[tokio::test]
async fn test_complete_walk_is_reported() {
    let (captured, _guard) = capture("movie_directors=info", false);

    let source = Arc::new(FakeSource::new().page(1, 1, &[Some("A"), Some("A")]));
    DirectorQuery::new(source)
        .find_directors_above_threshold(1)
        .await
        .unwrap();

    let logs = captured.text();
    assert!(logs.contains("Fetched all 1 pages"), "logs were: {logs}");
    assert!(!logs.contains("dropped after retries"));
}

#[tokio::test]
async fn test_filter_hides_lower_levels() {
    let (captured, _guard) = capture("movie_directors=warn", false);

    let source = Arc::new(FakeSource::new().page(1, 1, &[Some("A")]));
    DirectorQuery::new(source)
        .find_directors_above_threshold(0)
        .await
        .unwrap();

    assert!(captured.text().is_empty());
}

#[test]
fn test_json_format_carries_structured_fields() {
    let (captured, _guard) = capture("integration_tests=info", true);

    info!(page = 7, kind = "server_error", "Retrying page");

    let logs = captured.text();
    let line = logs.lines().next().expect("one log line");
    let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(parsed["level"], "INFO");
    assert_eq!(parsed["fields"]["message"], "Retrying page");
    assert_eq!(parsed["fields"]["page"], 7);
    assert_eq!(parsed["fields"]["kind"], "server_error");
}
