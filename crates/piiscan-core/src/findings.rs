//! Findings model: per-category summaries plus a position-ordered global list.
//!
//! Field names are part of the output contract and must not change; existing
//! consumers parse them verbatim. Per-category records deliberately omit the
//! detector identity (redundant under the category key); the global list
//! repeats it on every record.
use serde::Serialize;
use std::collections::BTreeMap;

/// One located occurrence of a detector's pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub value: String,
    /// 0-based byte offset of the match start in the source text.
    pub position: usize,
    /// Surrounding text window, clipped to the text bounds and trimmed.
    pub context: String,
}

/// Per-detector rollup; present in output only when at least one match exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub description: String,
    pub count: usize,
    pub matches: Vec<Match>,
}

/// A match annotated with its detector identity, for the flat global list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalMatchRecord {
    #[serde(rename = "type")]
    pub detector_id: String,
    #[serde(rename = "type_name")]
    pub detector_name: String,
    pub value: String,
    pub position: usize,
    pub context: String,
}

/// Aggregate result of one scan. Owned exclusively by the caller that
/// requested it; nothing is shared across scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Findings {
    pub has_pii: bool,
    /// Keyed by detector id; sorted map so serialization is deterministic.
    pub categories: BTreeMap<String, CategorySummary>,
    pub total_matches: usize,
    pub matches: Vec<GlobalMatchRecord>,
}

/// Stable sort of the global list by ascending start position. Ties keep the
/// order in which categories were flattened.
pub(crate) fn sort_matches_stable(matches: &mut [GlobalMatchRecord]) {
    matches.sort_by_key(|m| m.position);
}
