// src/retrieval/config.rs
//
// Settings loader for the retrieval subsystem. Loaded once at process start;
// read-only thereafter. Credentials are referenced by env-var name only and
// resolved at adapter construction, never stored in the config file.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "RETRIEVAL_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/retrieval.toml";

/// Which retrieval chain an adapter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// Financial news providers.
    Market,
    /// Scientific paper providers.
    Scientific,
}

/// Per-adapter settings. `api_key_env` names the environment variable
/// holding the credential; adapters without one (arXiv) leave it unset.
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    pub name: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_chain")]
    pub chain: Chain,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Cache entry lifetime in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Hard cap on records per ResultSet.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Maximum number of cached entries before FIFO eviction kicks in.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Character budget for each record description in the formatted block.
    #[serde(default = "default_description_budget")]
    pub description_budget: usize,
    /// Per-call HTTP timeout in seconds. An adapter that hangs is a bug.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,
}

fn default_cache_ttl_secs() -> u64 {
    3600
}
fn default_max_results() -> usize {
    5
}
fn default_cache_capacity() -> usize {
    128
}
fn default_description_budget() -> usize {
    200
}
fn default_http_timeout_secs() -> u64 {
    6
}
fn default_priority() -> u32 {
    100
}
fn default_chain() -> Chain {
    Chain::Market
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl RetrievalConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Adapter configs for one chain, in priority order.
    pub fn chain_adapters(&self, chain: Chain) -> Vec<&AdapterConfig> {
        self.adapters.iter().filter(|a| a.chain == chain).collect()
    }

    /// Built-in seed used when no config file is present: Alpha Vantage
    /// first, NewsAPI as fallback, arXiv for the scientific chain.
    pub fn default_seed() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            max_results: default_max_results(),
            cache_capacity: default_cache_capacity(),
            description_budget: default_description_budget(),
            http_timeout_secs: default_http_timeout_secs(),
            adapters: vec![
                AdapterConfig {
                    name: "alpha-vantage".into(),
                    base_url: None,
                    api_key_env: Some("FINANCE_ALPHA_VANTAGE_KEY".into()),
                    priority: 10,
                    chain: Chain::Market,
                },
                AdapterConfig {
                    name: "newsapi".into(),
                    base_url: None,
                    api_key_env: Some("NEWSAPI_KEY".into()),
                    priority: 20,
                    chain: Chain::Market,
                },
                AdapterConfig {
                    name: "arxiv".into(),
                    base_url: None,
                    api_key_env: None,
                    priority: 10,
                    chain: Chain::Scientific,
                },
            ],
        }
    }
}

/// Parse config from TOML text and fix the adapter order by priority.
/// The order is total and stable for the process lifetime.
pub fn parse_config(s: &str) -> Result<RetrievalConfig> {
    let mut cfg: RetrievalConfig = toml::from_str(s).context("parsing retrieval config toml")?;
    cfg.adapters.sort_by_key(|a| a.priority);
    Ok(cfg)
}

/// Load config from an explicit path.
pub fn load_from(path: &Path) -> Result<RetrievalConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading retrieval config from {}", path.display()))?;
    parse_config(&content)
}

/// Load config using env var + fallbacks:
/// 1) $RETRIEVAL_CONFIG_PATH (must exist if set)
/// 2) config/retrieval.toml
/// 3) built-in default seed
pub fn load_default() -> Result<RetrievalConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("RETRIEVAL_CONFIG_PATH points to non-existent path"));
    }
    let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_p.exists() {
        return load_from(&default_p);
    }
    Ok(RetrievalConfig::default_seed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config_and_sorts_by_priority() {
        let toml = r#"
            cache_ttl_secs = 900
            max_results = 3
            description_budget = 150

            [[adapters]]
            name = "newsapi"
            api_key_env = "NEWSAPI_KEY"
            priority = 20

            [[adapters]]
            name = "alpha-vantage"
            api_key_env = "FINANCE_ALPHA_VANTAGE_KEY"
            priority = 10

            [[adapters]]
            name = "arxiv"
            priority = 5
            chain = "scientific"
        "#;
        let cfg = parse_config(toml).unwrap();
        assert_eq!(cfg.cache_ttl_secs, 900);
        assert_eq!(cfg.max_results, 3);
        // Defaults fill the gaps.
        assert_eq!(cfg.cache_capacity, 128);
        assert_eq!(cfg.http_timeout_secs, 6);

        let names: Vec<_> = cfg.adapters.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["arxiv", "alpha-vantage", "newsapi"]);

        let market: Vec<_> = cfg
            .chain_adapters(Chain::Market)
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(market, vec!["alpha-vantage", "newsapi"]);
    }

    #[test]
    fn empty_config_gets_all_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.cache_ttl_secs, 3600);
        assert_eq!(cfg.max_results, 5);
        assert!(cfg.adapters.is_empty());
    }

    #[test]
    fn seed_has_market_chain_before_scientific_arxiv() {
        let cfg = RetrievalConfig::default_seed();
        let market = cfg.chain_adapters(Chain::Market);
        assert_eq!(market[0].name, "alpha-vantage");
        assert_eq!(market[1].name, "newsapi");
        let sci = cfg.chain_adapters(Chain::Scientific);
        assert_eq!(sci[0].name, "arxiv");
        assert!(sci[0].api_key_env.is_none());
    }

    #[test]
    fn bad_toml_is_an_error_not_a_silent_default() {
        assert!(parse_config("cache_ttl_secs = \"soon\"").is_err());
    }
}
