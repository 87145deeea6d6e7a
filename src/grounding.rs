//! # Grounding Assembly
//! Combines the scientific (arXiv) and market (news) retrieval chains into
//! the single grounding block handed to the generation pipeline, plus a
//! machine-readable summary of what grounded the output.

use crate::retrieval::facade::RetrievedContext;

/// Label prepended to the scientific section so the generation prompt can
/// tell paper content from market content.
pub const SCIENTIFIC_LABEL: &str = "SCIENTIFIC CONTEXT (from arXiv papers):";

/// Assemble the combined grounding block. Empty inputs contribute nothing;
/// both empty yields an empty string (pure LLM generation, no grounding).
pub fn assemble_grounding_context(scientific: &str, market: &str) -> String {
    let mut sections = Vec::with_capacity(2);
    if !scientific.trim().is_empty() {
        sections.push(format!("{SCIENTIFIC_LABEL}\n{scientific}"));
    }
    if !market.trim().is_empty() {
        sections.push(market.trim_end().to_string());
    }
    sections.join("\n\n")
}

/// Summary of which sources actually grounded a generation call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GroundingSummary {
    pub is_grounded: bool,
    pub scientific_enabled: bool,
    pub market_enabled: bool,
    pub scientific_record_count: usize,
    pub market_record_count: usize,
    pub sources_used: Vec<String>,
}

/// Derive the summary from the two chains' outcomes. A degraded or empty
/// chain does not count as grounding.
pub fn grounding_summary(
    scientific: Option<&RetrievedContext>,
    market: Option<&RetrievedContext>,
) -> GroundingSummary {
    let sci_on = scientific.is_some_and(|c| !c.degraded && c.record_count > 0);
    let mkt_on = market.is_some_and(|c| !c.degraded && c.record_count > 0);

    let mut sources_used = Vec::new();
    if sci_on {
        sources_used.push("arXiv scientific papers".to_string());
    }
    if mkt_on {
        let name = market
            .and_then(|c| c.source.clone())
            .unwrap_or_else(|| "unknown".to_string());
        sources_used.push(format!("Financial news ({name})"));
    }

    GroundingSummary {
        is_grounded: sci_on || mkt_on,
        scientific_enabled: sci_on,
        market_enabled: mkt_on,
        scientific_record_count: scientific.map_or(0, |c| c.record_count),
        market_record_count: market.map_or(0, |c| c.record_count),
        sources_used,
    }
}
