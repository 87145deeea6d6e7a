// src/retrieval/providers/mod.rs
pub mod alpha_vantage;
pub mod arxiv;
pub mod newsapi;

use crate::retrieval::config::{AdapterConfig, Chain, RetrievalConfig};
use crate::retrieval::types::SourceAdapter;

/// Build one adapter from its config. Credentials are resolved here, once,
/// from the env var the config references. Unknown names are skipped with a
/// warning so a typo in the config degrades one adapter, not the process.
pub fn build_adapter(cfg: &AdapterConfig, timeout: std::time::Duration) -> Option<Box<dyn SourceAdapter>> {
    let api_key = cfg
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .filter(|k| !k.is_empty());

    match cfg.name.as_str() {
        "alpha-vantage" => Some(Box::new(alpha_vantage::AlphaVantageAdapter::new(
            cfg.base_url.as_deref(),
            api_key,
            timeout,
        ))),
        "newsapi" => Some(Box::new(newsapi::NewsApiAdapter::new(
            cfg.base_url.as_deref(),
            api_key,
            timeout,
        ))),
        "arxiv" => Some(Box::new(arxiv::ArxivAdapter::new(
            cfg.base_url.as_deref(),
            timeout,
        ))),
        other => {
            tracing::warn!(adapter = other, "unknown adapter name in config, skipping");
            None
        }
    }
}

/// Build both retrieval chains in priority order.
pub fn build_chains(
    cfg: &RetrievalConfig,
) -> (Vec<Box<dyn SourceAdapter>>, Vec<Box<dyn SourceAdapter>>) {
    let timeout = cfg.http_timeout();
    let market = cfg
        .chain_adapters(Chain::Market)
        .into_iter()
        .filter_map(|a| build_adapter(a, timeout))
        .collect();
    let scientific = cfg
        .chain_adapters(Chain::Scientific)
        .into_iter()
        .filter_map(|a| build_adapter(a, timeout))
        .collect();
    (market, scientific)
}
