//! Integration tests for DirectorQuery

use movie_directors::fetcher::movie_http::MovieApiClient;
use movie_directors::fetcher::pagination::PageWalker;
use movie_directors::query::{DirectorQuery, QueryError};
use std::sync::Arc;
use std::time::Duration;

use crate::support::fake_source::{FakeSource, Outcome};
use crate::support::mock_upstream::{page_body, MockUpstream};

fn query_over(source: Arc<FakeSource>) -> DirectorQuery {
    DirectorQuery::new(source)
}

#[tokio::test]
async fn test_negative_threshold_skips_upstream() {
    let source = Arc::new(FakeSource::new().page(1, 1, &[Some("A")]));
    let query = query_over(source.clone());

    for threshold in [-1, -2, i64::MIN] {
        let result = query.find_directors_above_threshold(threshold).await.unwrap();
        assert!(result.is_empty());
    }
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn test_single_page_threshold_one() {
    let source = Arc::new(FakeSource::new().page(1, 1, &[Some("A"), Some("A"), Some("B")]));

    let result = query_over(source)
        .find_directors_above_threshold(1)
        .await
        .unwrap();

    assert_eq!(result, vec!["A"]);
}

#[tokio::test]
async fn test_two_pages_threshold_zero() {
    let source = Arc::new(
        FakeSource::new()
            .page(1, 2, &[Some("X")])
            .page(2, 2, &[Some("Y")]),
    );

    let result = query_over(source.clone())
        .find_directors_above_threshold(0)
        .await
        .unwrap();

    assert_eq!(result, vec!["X", "Y"]);
    assert_eq!(source.calls(), vec![1, 2]);
}

#[tokio::test]
async fn test_counts_span_pages() {
    let source = Arc::new(
        FakeSource::new()
            .page(1, 3, &[Some("A"), None, Some("B")])
            .page(2, 3, &[Some("A"), Some("C")])
            .page(3, 3, &[Some("B"), Some("A"), None]),
    );

    let query = query_over(source).with_walker(PageWalker::new(2));

    assert_eq!(
        query.find_directors_above_threshold(1).await.unwrap(),
        vec!["A", "B"]
    );
    assert_eq!(query.find_directors_above_threshold(2).await.unwrap(), vec!["A"]);
    assert!(query.find_directors_above_threshold(3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_later_page_leaves_other_pages() {
    let source = Arc::new(
        FakeSource::new()
            .page(1, 3, &[Some("A")])
            .outcome(2, Outcome::Server(500, "boom"))
            .page(3, 3, &[Some("C")]),
    );

    let result = query_over(source)
        .find_directors_above_threshold(0)
        .await
        .unwrap();

    assert_eq!(result, vec!["A", "C"]);
}

#[tokio::test]
async fn test_first_page_failures_are_classified() {
    let cases = [
        (Outcome::Client(400, "bad"), "upstream_rejected", 400),
        (Outcome::Server(500, "down"), "upstream_faulted", 502),
        (Outcome::Transport("refused"), "upstream_unreachable", 503),
        (Outcome::Decode("garbage"), "internal_error", 500),
    ];

    for (outcome, expected, status) in cases {
        let source = Arc::new(FakeSource::new().outcome(1, outcome));
        let err = query_over(source)
            .find_directors_above_threshold(0)
            .await
            .unwrap_err();

        assert_eq!(err.outcome(), expected);
        assert_eq!(err.http_status(), status);
    }
}

#[tokio::test]
async fn test_internal_error_preserves_cause() {
    let source = Arc::new(FakeSource::new().outcome(1, Outcome::Decode("garbage")));
    let err = query_over(source)
        .find_directors_above_threshold(0)
        .await
        .unwrap_err();

    let cause = std::error::Error::source(&err).expect("cause should be kept");
    assert!(cause.to_string().contains("garbage"));
}

#[tokio::test]
async fn test_timeout_reports_unreachable() {
    let source = Arc::new(
        FakeSource::new()
            .page(1, 1, &[Some("A")])
            .delay(1, Duration::from_secs(5)),
    );

    let err = query_over(source)
        .with_timeout(Duration::from_millis(20))
        .find_directors_above_threshold(0)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::UpstreamUnreachable(_)));
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let upstream = MockUpstream::start(|page, attempt| match (page, attempt) {
        (1, _) => (200, page_body(1, 3, &[Some("Ang Lee"), Some("Woody Allen")])),
        (2, 0) => (500, String::new()),
        (2, _) => (200, page_body(2, 3, &[Some("Woody Allen"), None])),
        (3, _) => (200, page_body(3, 3, &[Some("Ang Lee"), Some("Woody Allen")])),
        _ => (404, String::new()),
    })
    .await;
    let client = MovieApiClient::new(&upstream.config()).unwrap();
    let query = DirectorQuery::new(Arc::new(client));

    let result = query.find_directors_above_threshold(1).await.unwrap();

    assert_eq!(result, vec!["Ang Lee", "Woody Allen"]);
    assert_eq!(upstream.hits(1), 1);
    assert_eq!(upstream.hits(2), 2);
    assert_eq!(upstream.hits(3), 1);
}

#[tokio::test]
async fn test_end_to_end_first_page_always_500() {
    let upstream = MockUpstream::start(|_, _| (500, "Internal Server Error".to_string())).await;
    let config = upstream.config();
    let client = MovieApiClient::new(&config).unwrap();

    let err = DirectorQuery::new(Arc::new(client))
        .find_directors_above_threshold(0)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::UpstreamFaulted(_)));
    assert_eq!(upstream.hits(1), config.retry_max_attempts as usize + 1);
    assert_eq!(upstream.total_hits(), upstream.hits(1));
}

#[tokio::test]
async fn test_end_to_end_first_page_400() {
    let upstream = MockUpstream::start(|_, _| (400, "invalid page".to_string())).await;
    let client = MovieApiClient::new(&upstream.config()).unwrap();

    let err = DirectorQuery::new(Arc::new(client))
        .find_directors_above_threshold(0)
        .await
        .unwrap_err();

    match err {
        QueryError::UpstreamRejected(detail) => assert!(detail.contains("invalid page")),
        other => panic!("expected UpstreamRejected, got {other:?}"),
    }
    assert_eq!(upstream.hits(1), 1);
}

#[tokio::test]
async fn test_null_records_do_not_fail_the_query() {
    let upstream = MockUpstream::start(|_, _| {
        (
            200,
            r#"{"page":1,"total_pages":1,"data":[null,{"Director":"A"}]}"#.to_string(),
        )
    })
    .await;
    let client = MovieApiClient::new(&upstream.config()).unwrap();

    let result = DirectorQuery::new(Arc::new(client))
        .find_directors_above_threshold(0)
        .await
        .unwrap();

    assert_eq!(result, vec!["A"]);
}

#[tokio::test]
async fn test_every_declared_page_is_counted() {
    let source = Arc::new(
        FakeSource::new()
            .page(1, 10_001, &[Some("A")])
            .page(10_001, 10_001, &[Some("Z")]),
    );

    let result = query_over(source.clone())
        .with_walker(PageWalker::new(32))
        .find_directors_above_threshold(0)
        .await
        .unwrap();

    assert_eq!(result, vec!["A", "Z"]);
    assert_eq!(source.call_count(), 10_001);
}
