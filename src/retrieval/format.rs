//! # Context Formatter
//! Pure, testable rendering of a `ResultSet` into the text block fed to the
//! generation pipeline. No I/O; deterministic for a given input.

use crate::retrieval::types::{AllSourcesExhausted, Record, ResultSet};

/// Marker embedded in the degraded block so downstream consumers (and tests)
/// can detect a retrieval failure without parsing prose.
pub const DEGRADED_MARKER: &str = "[no grounding context available]";

/// Appended when a description is cut to the character budget.
const TRUNCATION_INDICATOR: &str = "...";

/// Render records in their existing order (no re-sorting), one numbered line
/// per record, descriptions truncated to `description_budget` characters.
pub fn format_context(set: &ResultSet, description_budget: usize) -> String {
    if set.records.is_empty() {
        return format!("RETRIEVED CONTEXT ({}): no matching items.\n", set.adapter);
    }

    let mut lines = Vec::with_capacity(set.records.len() + 2);
    lines.push(format!("RETRIEVED CONTEXT (live items from {}):\n", set.adapter));

    for (idx, r) in set.records.iter().enumerate() {
        lines.push(format_record(idx + 1, r, description_budget));
    }

    lines.push("\nUse this information as factual grounding for the generated content.\n".to_string());
    lines.join("\n")
}

fn format_record(n: usize, r: &Record, description_budget: usize) -> String {
    let desc = truncate_chars(&r.description, description_budget);
    format!(
        "{}. {} - {} ({}, {}, {})",
        n,
        r.title,
        desc,
        r.source,
        format_date(r.published_at),
        r.url
    )
}

/// Degraded empty-context block: the marker plus the ordered per-adapter
/// failure kinds, so total failure is still diagnosable from the output.
pub fn degraded_context(err: &AllSourcesExhausted) -> String {
    let failures = err
        .failures
        .iter()
        .map(|(name, kind)| format!("{name}: {kind}"))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{DEGRADED_MARKER}\nRetrieval failed across all sources ({failures}).\n")
}

/// Truncate at a char boundary and append the indicator when anything was cut.
fn truncate_chars(s: &str, budget: usize) -> String {
    if s.chars().count() <= budget {
        return s.to_string();
    }
    let mut out: String = s.chars().take(budget).collect();
    out.push_str(TRUNCATION_INDICATOR);
    out
}

/// Render a unix timestamp as a UTC calendar date; unknown timestamps (0)
/// render as a placeholder rather than the epoch.
fn format_date(unix: u64) -> String {
    if unix == 0 {
        return "date unknown".to_string();
    }
    match chrono::DateTime::from_timestamp(unix as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "date unknown".to_string(),
    }
}
