// src/retrieval/mod.rs
pub mod cache;
pub mod config;
pub mod facade;
pub mod fallback;
pub mod format;
pub mod providers;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "retrieval_cache_hits_total",
            "Queries answered from the context cache."
        );
        describe_counter!(
            "retrieval_cache_misses_total",
            "Queries that had to walk the fallback chain."
        );
        describe_counter!(
            "retrieval_cache_evictions_total",
            "Entries evicted because the cache was full."
        );
        describe_counter!(
            "retrieval_adapter_errors_total",
            "Transient adapter failures (rate limited / unreachable)."
        );
        describe_counter!(
            "retrieval_adapter_config_errors_total",
            "Adapter failures indicating a configuration bug (unauthorized / malformed)."
        );
        describe_counter!(
            "retrieval_exhausted_total",
            "Fetches where every adapter in the chain failed."
        );
        describe_counter!(
            "retrieval_records_total",
            "Records returned by winning adapters."
        );
        describe_histogram!("retrieval_fetch_ms", "End-to-end fetch time in milliseconds.");
        describe_histogram!(
            "retrieval_parse_ms",
            "Provider payload parse time in milliseconds."
        );
        describe_gauge!("retrieval_cache_entries", "Current number of cached entries.");
    });
}

/// Normalize query text for cache keys and provider parameters:
/// lowercase, trim, collapse whitespace.
pub fn normalize_query(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a provider description: decode HTML entities, strip tags,
/// normalize typographic quotes, collapse whitespace.
pub fn normalize_description(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_query_lowercases_and_collapses() {
        assert_eq!(normalize_query("  Interest   RATES "), "interest rates");
        assert_eq!(normalize_query("Tesla"), "tesla");
    }

    #[test]
    fn normalize_description_strips_markup() {
        let s = "  Fed holds &amp; markets <b>rally</b>,\n\tsay “analysts” ";
        assert_eq!(
            normalize_description(s),
            "Fed holds & markets rally, say \"analysts\""
        );
    }

    #[test]
    fn normalize_description_empty_stays_empty() {
        assert_eq!(normalize_description("  \n "), "");
    }
}
