//! Ledger summary assembly.

use std::collections::BTreeMap;

use evidence_contracts::{EvidenceEntry, IntegrityReport, IntegrityStatus, LedgerQuery, LedgerSummary};

use crate::query::apply_query;

/// Build a `LedgerSummary` from a block snapshot and its integrity report.
///
/// `recent_limit` bounds `recent_entries`.
pub fn summarize(
    blocks: &[EvidenceEntry],
    report: &IntegrityReport,
    recent_limit: usize,
) -> LedgerSummary {
    let mut total_events = BTreeMap::new();
    for block in blocks.iter().filter(|b| !b.is_genesis()) {
        *total_events.entry(block.event_type).or_insert(0) += 1;
    }

    let first_block = blocks
        .iter()
        .filter(|b| !b.is_genesis())
        .min_by_key(|b| b.block_number)
        .cloned();
    let last_block = blocks.iter().max_by_key(|b| b.block_number).cloned();

    LedgerSummary {
        total_blocks: blocks.len(),
        integrity_status: IntegrityStatus::from(report),
        total_events,
        recent_entries: apply_query(blocks, &LedgerQuery::all().limit(recent_limit)),
        first_block,
        last_block,
    }
}
