// tests/http_fetch.rs
use std::sync::Arc;
use trends_mx::config::HttpConfig;
use trends_mx::error::ScrapeError;
use trends_mx::ingest::fetch::{HttpFetcher, PageSource};
use trends_mx::ingest::providers::xtrends::XTrendsProvider;
use trends_mx::ingest::types::TrendProvider;
use wiremock::matchers::{header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(&HttpConfig::default()).unwrap().without_jitter())
}

#[tokio::test]
async fn ok_body_is_returned() {
    let server = MockServer::start().await;
    let html = std::fs::read_to_string("tests/fixtures/xtrends_mexico.html").unwrap();
    Mock::given(method("GET"))
        .and(path("/mexico"))
        .and(headers("accept-language", vec!["es-MX", "es;q=0.9", "en;q=0.8"]))
        .respond_with(ResponseTemplate::new(200).set_body_string(html.clone()))
        .mount(&server)
        .await;

    let source = PageSource::http(format!("{}/mexico", server.uri()), fetcher());
    let provider = XTrendsProvider::new(source);
    let body = provider.fetch().await.unwrap();
    assert_eq!(body, html);
    assert_eq!(provider.extract_candidates(&body).unwrap().candidates.len(), 5);
}

#[tokio::test]
async fn forbidden_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = fetcher().get_text(&format!("{}/mexico", server.uri()), None).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Blocked { status: 403, .. }));
    assert_eq!(err.kind(), "blocked");
}

#[tokio::test]
async fn other_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = fetcher().get_text(&server.uri(), None).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Http { status: 500, .. }));
}

#[tokio::test]
async fn referer_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("referer", "https://www.twitter-trending.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let source = PageSource::http(server.uri(), fetcher()).with_referer("https://www.twitter-trending.com/");
    assert_eq!(source.load().await.unwrap(), "ok");
}
