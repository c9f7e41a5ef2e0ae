//! Filtering and ordering for ledger queries.

use evidence_contracts::{EvidenceEntry, LedgerQuery};

/// True when `entry` satisfies every filter set on `query`.
///
/// The limit is not considered here; see `apply_query`.
pub fn matches(query: &LedgerQuery, entry: &EvidenceEntry) -> bool {
    if query.event_type.is_some_and(|t| t != entry.event_type) {
        return false;
    }
    if query.module_id.as_deref().is_some_and(|m| m != entry.module_id) {
        return false;
    }
    if query.originator.as_deref().is_some_and(|o| o != entry.originator) {
        return false;
    }
    if let Some(vessel) = query.vessel_id.as_deref() {
        if entry.vessel_id.as_deref() != Some(vessel) {
            return false;
        }
    }
    if query.start_date.is_some_and(|start| entry.timestamp < start) {
        return false;
    }
    if query.end_date.is_some_and(|end| entry.timestamp > end) {
        return false;
    }
    true
}

/// Run `query` over `blocks`.
///
/// Genesis is never returned. Matches come back newest first (block number
/// descending) and `limit` is applied after ordering. An inverted date
/// range yields no matches.
pub fn apply_query(blocks: &[EvidenceEntry], query: &LedgerQuery) -> Vec<EvidenceEntry> {
    if query.has_inverted_range() {
        return Vec::new();
    }

    let mut hits: Vec<EvidenceEntry> = blocks
        .iter()
        .filter(|block| !block.is_genesis() && matches(query, block))
        .cloned()
        .collect();

    hits.sort_by(|a, b| b.block_number.cmp(&a.block_number));

    if let Some(limit) = query.limit {
        hits.truncate(limit);
    }
    hits
}
