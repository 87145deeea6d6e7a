//! # Fallback Coordinator
//! Walks the priority-ordered adapter chain sequentially and returns the
//! first success. Empty-but-successful stops the chain: a confirmed
//! "no results" beats guessing from a lower-priority source. Sequential
//! (not speculative) on purpose: most calls cache-hit or succeed on the
//! first adapter, and parallel calls burn free-tier quota.

use metrics::counter;

use crate::retrieval::types::{AllSourcesExhausted, Query, ResultSet, SourceAdapter};

pub struct FallbackCoordinator {
    adapters: Vec<Box<dyn SourceAdapter>>,
    max_results: usize,
}

impl FallbackCoordinator {
    /// `adapters` must already be in priority order; the order is fixed for
    /// the coordinator's lifetime.
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, max_results: usize) -> Self {
        Self {
            adapters,
            max_results: max_results.max(1),
        }
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Try each adapter in order until one succeeds. No retries within a
    /// single adapter invocation; retry/backoff is an adapter-internal
    /// concern if it exists at all.
    pub async fn retrieve(&self, query: &Query) -> Result<ResultSet, AllSourcesExhausted> {
        crate::retrieval::ensure_metrics_described();

        let cap = query
            .max_results
            .map(|n| n.min(self.max_results))
            .unwrap_or(self.max_results);

        let mut failures = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            match adapter.fetch(query).await {
                Ok(mut set) => {
                    set.records.truncate(cap);
                    counter!("retrieval_records_total").increment(set.len() as u64);
                    tracing::debug!(
                        adapter = adapter.name(),
                        records = set.len(),
                        "adapter succeeded"
                    );
                    return Ok(set);
                }
                Err(e) => {
                    if e.is_config_problem() {
                        tracing::error!(
                            adapter = adapter.name(),
                            error = %e,
                            "adapter failed: configuration problem"
                        );
                        counter!("retrieval_adapter_config_errors_total").increment(1);
                    } else {
                        tracing::warn!(
                            adapter = adapter.name(),
                            error = %e,
                            "adapter failed, trying next source"
                        );
                        counter!("retrieval_adapter_errors_total").increment(1);
                    }
                    failures.push((adapter.name().to_string(), e.kind()));
                }
            }
        }

        counter!("retrieval_exhausted_total").increment(1);
        Err(AllSourcesExhausted { failures })
    }
}
