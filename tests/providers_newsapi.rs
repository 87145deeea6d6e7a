// tests/providers_newsapi.rs
use grounding_retriever::retrieval::providers::newsapi::NewsApiAdapter;
use grounding_retriever::{FetchErrorKind, Query, SourceAdapter};
use std::fs;

#[tokio::test]
async fn parses_everything_fixture() {
    let body = fs::read_to_string("tests/fixtures/newsapi_articles.json").expect("fixture");
    let adapter = NewsApiAdapter::from_fixture(&body);
    let set = adapter.fetch(&Query::new("dollar")).await.expect("ok");

    assert_eq!(set.adapter, "newsapi");
    assert_eq!(set.len(), 2);
    assert!(set.records[0].title.contains("Dollar Slips"));
    assert_eq!(set.records[0].source, "Reuters");
    assert_eq!(set.records[1].source, "Bloomberg");
    assert!(set.records.iter().all(|r| r.published_at > 0));
}

#[tokio::test]
async fn invalid_key_envelope_maps_to_unauthorized() {
    let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
    let adapter = NewsApiAdapter::from_fixture(body);
    let err = adapter.fetch(&Query::new("dollar")).await.unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::Unauthorized);
}

#[tokio::test]
async fn rate_limited_envelope_maps_to_rate_limited() {
    let body = r#"{"status":"error","code":"rateLimited","message":"You have been rate limited."}"#;
    let adapter = NewsApiAdapter::from_fixture(body);
    let err = adapter.fetch(&Query::new("dollar")).await.unwrap_err();
    assert_eq!(err.kind(), FetchErrorKind::RateLimited);
}

#[tokio::test]
async fn empty_articles_is_success() {
    let adapter =
        NewsApiAdapter::from_fixture(r#"{"status":"ok","totalResults":0,"articles":[]}"#);
    let set = adapter.fetch(&Query::new("nothing")).await.expect("ok");
    assert!(set.is_empty());
}
