//! Integration tests for the HTTP surface.
//!
//! Covered:
//! - MISS → HIT for an identical request (via `X-Context-Cache` header)
//! - degraded retrieval still answers 200 with the marker block
//! - /grounding combines both chains and reports the summary

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt; // for oneshot

use grounding_retriever::retrieval::config::RetrievalConfig;
use grounding_retriever::{
    AppState, FetchError, Query, Record, ResultSet, Retriever, SourceAdapter, CACHE_HEADER,
    DEGRADED_MARKER,
};

struct CannedAdapter {
    name: &'static str,
    records: usize,
    unreachable: bool,
}

#[async_trait::async_trait]
impl SourceAdapter for CannedAdapter {
    async fn fetch(&self, _query: &Query) -> Result<ResultSet, FetchError> {
        if self.unreachable {
            return Err(FetchError::Unreachable("stub".into()));
        }
        let records = (0..self.records)
            .map(|i| Record {
                title: format!("{} item {}", self.name, i),
                description: "body".into(),
                published_at: 1_756_000_000,
                source: self.name.to_string(),
                url: format!("https://example.com/{}", i),
            })
            .collect();
        Ok(ResultSet::new(self.name, records))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn app_with(news: CannedAdapter, papers: CannedAdapter) -> Router {
    let cfg = RetrievalConfig::default_seed();
    let state = AppState {
        news: Arc::new(Retriever::new(&cfg, vec![Box::new(news)])),
        papers: Arc::new(Retriever::new(&cfg, vec![Box::new(papers)])),
    };
    grounding_retriever::create_router(state)
}

fn news_app(records: usize) -> Router {
    app_with(
        CannedAdapter {
            name: "newsapi",
            records,
            unreachable: false,
        },
        CannedAdapter {
            name: "arxiv",
            records: 0,
            unreachable: false,
        },
    )
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request build");
    app.clone().oneshot(req).await.expect("router response")
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn health_answers_ok() {
    let app = news_app(1);
    let resp = get(&app, "/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ok");
}

#[tokio::test]
async fn context_is_miss_then_hit_for_identical_request() {
    let app = news_app(2);

    let first = get(&app, "/context?q=fed%20rates").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers().get(CACHE_HEADER).unwrap(), "MISS");
    let first_body = body_string(first).await;
    assert!(first_body.contains("newsapi item 0"));

    let second = get(&app, "/context?q=fed%20rates").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers().get(CACHE_HEADER).unwrap(), "HIT");
    assert_eq!(body_string(second).await, first_body);
}

#[tokio::test]
async fn query_normalization_makes_spelling_variants_share_a_cache_entry() {
    let app = news_app(1);

    let first = get(&app, "/context?q=Interest%20%20Rates").await;
    assert_eq!(first.headers().get(CACHE_HEADER).unwrap(), "MISS");

    let second = get(&app, "/context?q=interest%20rates").await;
    assert_eq!(second.headers().get(CACHE_HEADER).unwrap(), "HIT");
}

#[tokio::test]
async fn degraded_retrieval_still_answers_200() {
    let app = app_with(
        CannedAdapter {
            name: "newsapi",
            records: 0,
            unreachable: true,
        },
        CannedAdapter {
            name: "arxiv",
            records: 0,
            unreachable: false,
        },
    );

    let resp = get(&app, "/context?q=anything").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(CACHE_HEADER).unwrap(), "MISS");
    let body = body_string(resp).await;
    assert!(body.contains(DEGRADED_MARKER));
}

#[tokio::test]
async fn grounding_combines_both_chains() {
    let app = app_with(
        CannedAdapter {
            name: "newsapi",
            records: 2,
            unreachable: false,
        },
        CannedAdapter {
            name: "arxiv",
            records: 1,
            unreachable: false,
        },
    );

    let resp = get(&app, "/grounding?q=llm%20markets").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let v: serde_json::Value =
        serde_json::from_str(&body_string(resp).await).expect("json body");
    assert_eq!(v["summary"]["is_grounded"], true);
    assert_eq!(v["summary"]["scientific_record_count"], 1);
    assert_eq!(v["summary"]["market_record_count"], 2);
    assert_eq!(v["summary"]["sources_used"].as_array().unwrap().len(), 2);

    let context = v["context"].as_str().unwrap();
    assert!(context.contains("SCIENTIFIC CONTEXT"));
    assert!(context.contains("newsapi item 0"));
}

#[tokio::test]
async fn grounding_with_failed_market_chain_still_reports_scientific() {
    let app = app_with(
        CannedAdapter {
            name: "newsapi",
            records: 0,
            unreachable: true,
        },
        CannedAdapter {
            name: "arxiv",
            records: 2,
            unreachable: false,
        },
    );

    let resp = get(&app, "/grounding?q=transformers").await;
    let v: serde_json::Value =
        serde_json::from_str(&body_string(resp).await).expect("json body");

    assert_eq!(v["summary"]["is_grounded"], true);
    assert_eq!(v["summary"]["market_enabled"], false);
    assert_eq!(v["summary"]["scientific_enabled"], true);

    let context = v["context"].as_str().unwrap();
    assert!(!context.contains(DEGRADED_MARKER), "degraded block must not leak into grounding");
}
