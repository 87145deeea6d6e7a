// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod grounding;
pub mod metrics;
pub mod retrieval;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState, CACHE_HEADER};
pub use crate::retrieval::facade::{RetrievedContext, Retriever};
pub use crate::retrieval::format::DEGRADED_MARKER;
pub use crate::retrieval::types::{
    AllSourcesExhausted, FetchError, FetchErrorKind, Query, Record, ResultSet, SourceAdapter,
};

use std::sync::Arc;

/// Build the full application router: load config, construct both retrieval
/// chains, wire the HTTP surface. Used by the Shuttle entrypoint and by
/// integration tests.
pub async fn app() -> anyhow::Result<axum::Router> {
    let cfg = retrieval::config::load_default()?;
    let (market, scientific) = retrieval::providers::build_chains(&cfg);

    let state = api::AppState {
        news: Arc::new(Retriever::new(&cfg, market)),
        papers: Arc::new(Retriever::new(&cfg, scientific)),
    };
    Ok(api::create_router(state))
}
