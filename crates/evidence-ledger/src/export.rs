//! Ledger export and offline verification.
//!
//! The export document is a JSON array of block objects in ascending
//! block-number order, with the wire field names of `EvidenceEntry`. It is
//! the artifact an external auditor re-verifies without trusting the live
//! system: `verify_export` runs the same chain checks the ledger runs.

use evidence_contracts::{EvidenceEntry, IntegrityReport, LedgerError, LedgerResult};

use crate::chain::verify_chain;

/// Serialize every block, genesis included, in ascending order.
pub fn export_blocks(blocks: &[EvidenceEntry]) -> LedgerResult<String> {
    let mut ordered: Vec<&EvidenceEntry> = blocks.iter().collect();
    ordered.sort_by_key(|b| b.block_number);

    serde_json::to_string_pretty(&ordered).map_err(|e| LedgerError::Serialization {
        reason: format!("failed to encode ledger export: {}", e),
    })
}

/// Parse an export document back into blocks, preserving document order.
pub fn parse_export(text: &str) -> LedgerResult<Vec<EvidenceEntry>> {
    serde_json::from_str(text).map_err(|e| LedgerError::ExportFormat {
        reason: format!("failed to parse ledger export: {}", e),
    })
}

/// Parse and verify an export document.
///
/// Blocks are checked in document order, so a reordered export is reported
/// as corrupted rather than silently re-sorted.
pub fn verify_export(text: &str) -> LedgerResult<IntegrityReport> {
    let blocks = parse_export(text)?;
    Ok(verify_chain(&blocks))
}
