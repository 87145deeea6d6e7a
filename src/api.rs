use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query as QueryParams, State},
    http::{HeaderMap, HeaderValue},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::grounding::{assemble_grounding_context, grounding_summary, GroundingSummary};
use crate::retrieval::facade::Retriever;
use crate::retrieval::types::Query;

/// Diagnostic header telling callers whether the answer came from the cache.
pub const CACHE_HEADER: &str = "X-Context-Cache";

#[derive(Clone)]
pub struct AppState {
    /// Market-news chain (Alpha Vantage → NewsAPI).
    pub news: Arc<Retriever>,
    /// Scientific-paper chain (arXiv).
    pub papers: Arc<Retriever>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/context", get(market_context))
        .route("/grounding", get(grounding))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct ContextParams {
    q: String,
    /// Lookback window in hours.
    #[serde(default)]
    hours: Option<u64>,
    #[serde(default)]
    max: Option<usize>,
}

impl ContextParams {
    fn to_query(&self) -> Query {
        let mut q = Query::new(&self.q);
        if let Some(h) = self.hours {
            q = q.with_lookback(Duration::from_secs(h.saturating_mul(3600)));
        }
        if let Some(m) = self.max {
            q = q.with_max_results(m);
        }
        q
    }
}

/// Market-context text for the generation pipeline. Always 200: a total
/// retrieval failure returns the degraded block, never an error status.
async fn market_context(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ContextParams>,
) -> (HeaderMap, String) {
    let out = state.news.fetch(&params.to_query()).await;

    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_HEADER,
        if out.cache_hit {
            HeaderValue::from_static("HIT")
        } else {
            HeaderValue::from_static("MISS")
        },
    );
    (headers, out.text)
}

#[derive(serde::Serialize)]
struct GroundingResponse {
    context: String,
    summary: GroundingSummary,
}

/// Combined grounding: both chains queried, assembled with section labels,
/// plus the summary of what actually grounded the result.
async fn grounding(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ContextParams>,
) -> Json<GroundingResponse> {
    let query = params.to_query();
    let papers = state.papers.fetch(&query).await;
    let news = state.news.fetch(&query).await;

    // Only chains that actually produced records contribute sections; a
    // degraded or confirmed-empty chain adds nothing to the prompt.
    let scientific = if papers.degraded || papers.record_count == 0 {
        ""
    } else {
        papers.text.as_str()
    };
    let market = if news.degraded || news.record_count == 0 {
        ""
    } else {
        news.text.as_str()
    };

    let context = assemble_grounding_context(scientific, market);
    let summary = grounding_summary(Some(&papers), Some(&news));
    Json(GroundingResponse { context, summary })
}
