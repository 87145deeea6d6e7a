//! Grounding Retrieval Service — Binary Entrypoint
//! Boots the Axum HTTP server: retrieval chains, context cache, and the
//! Prometheus exposition endpoint.
//!
//! See `README.md` for quickstart and `config/retrieval.toml` for settings.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - RETRIEVAL_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("RETRIEVAL_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("grounding_retriever=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This makes the
    // provider API keys (FINANCE_ALPHA_VANTAGE_KEY, NEWSAPI_KEY) available
    // before the adapters are constructed.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let cfg = grounding_retriever::retrieval::config::load_default()
        .expect("Failed to load retrieval config");
    let metrics = grounding_retriever::metrics::Metrics::init(cfg.cache_ttl_secs);

    let router = grounding_retriever::app()
        .await
        .expect("Failed to build application router")
        .merge(metrics.router());

    Ok(router.into())
}
