//! # Retrieval Facade
//! Public entry point: normalize → cache → fallback chain → cache + format.
//! Never errors toward the caller; total retrieval failure degrades to an
//! empty-context block with a diagnostic marker so generation can proceed
//! with reduced grounding instead of crashing.

use std::time::Instant;

use metrics::histogram;

use crate::retrieval::cache::{cache_key, now_unix, ContextCache};
use crate::retrieval::config::RetrievalConfig;
use crate::retrieval::fallback::FallbackCoordinator;
use crate::retrieval::format::{degraded_context, format_context};
use crate::retrieval::types::{Query, SourceAdapter};

/// What a `fetch` hands back. `text` is always present; `degraded` marks the
/// empty-context fallback block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedContext {
    pub text: String,
    pub cache_hit: bool,
    pub degraded: bool,
    /// Adapter that produced the records, when any did.
    pub source: Option<String>,
    pub record_count: usize,
}

pub struct Retriever {
    coordinator: FallbackCoordinator,
    cache: ContextCache,
    description_budget: usize,
}

impl Retriever {
    /// Each facade owns its cache outright; tests can run several instances
    /// without cross-contamination.
    pub fn new(cfg: &RetrievalConfig, adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        crate::retrieval::ensure_metrics_described();
        Self {
            coordinator: FallbackCoordinator::new(adapters, cfg.max_results),
            cache: ContextCache::new(cfg.cache_capacity, cfg.cache_ttl()),
            description_budget: cfg.description_budget,
        }
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.coordinator.adapter_names()
    }

    /// Resolve a query to a grounding-context text block. Cache hits skip
    /// the network entirely; only confirmed successes (including confirmed
    /// "no results") are cached — degraded results get a fresh chance at the
    /// providers on the next call.
    pub async fn fetch(&self, query: &Query) -> RetrievedContext {
        let t0 = Instant::now();
        let query = query.normalized();
        let key = cache_key(&query, now_unix());

        if let Some(set) = self.cache.get(&key) {
            let out = RetrievedContext {
                text: format_context(&set, self.description_budget),
                cache_hit: true,
                degraded: false,
                source: Some(set.adapter),
                record_count: set.records.len(),
            };
            histogram!("retrieval_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
            return out;
        }

        let out = match self.coordinator.retrieve(&query).await {
            Ok(set) => {
                self.cache.put(&key, set.clone());
                RetrievedContext {
                    text: format_context(&set, self.description_budget),
                    cache_hit: false,
                    degraded: false,
                    source: Some(set.adapter),
                    record_count: set.records.len(),
                }
            }
            Err(err) => {
                tracing::warn!(
                    failures = ?err.failures,
                    query = %query.text,
                    "retrieval degraded: all sources exhausted"
                );
                RetrievedContext {
                    text: degraded_context(&err),
                    cache_hit: false,
                    degraded: true,
                    source: None,
                    record_count: 0,
                }
            }
        };

        histogram!("retrieval_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        out
    }
}
