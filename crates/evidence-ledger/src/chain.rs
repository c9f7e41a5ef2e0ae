//! Hash-chain primitives: canonical hashing and chain verification.
//!
//! Hash input is the compact JSON encoding of `CanonicalBlock`, whose fields
//! are declared in lexicographic order of their wire names:
//!
//!   blockNumber, data, description, eventType, metadata, moduleId,
//!   moduleName, originator, previousHash, timestamp, vesselId
//!
//! `data` and `metadata` are `EvidenceValue`s whose maps are already
//! key-sorted, and `timestamp` is RFC 3339 in UTC with `Z` and the shortest
//! of 0/3/6/9 fractional digits. `id`, `hash`, and `signature` are not part
//! of the input.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use evidence_contracts::{
    BlockViolation, EventType, EvidenceEntry, EvidenceValue, IntegrityReport, LedgerError,
    LedgerResult, ViolationKind, GENESIS_PREVIOUS_HASH,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalBlock<'a> {
    block_number: u64,
    data: &'a EvidenceValue,
    description: &'a str,
    event_type: EventType,
    metadata: Option<&'a EvidenceValue>,
    module_id: &'a str,
    module_name: &'a str,
    originator: &'a str,
    previous_hash: &'a str,
    timestamp: String,
    vessel_id: Option<&'a str>,
}

impl<'a> CanonicalBlock<'a> {
    fn of(entry: &'a EvidenceEntry) -> Self {
        Self {
            block_number: entry.block_number,
            data: &entry.data,
            description: &entry.description,
            event_type: entry.event_type,
            metadata: entry.metadata.as_ref(),
            module_id: &entry.module_id,
            module_name: &entry.module_name,
            originator: &entry.originator,
            previous_hash: &entry.previous_hash,
            timestamp: canonical_timestamp(&entry.timestamp),
            vessel_id: entry.vessel_id.as_deref(),
        }
    }
}

/// The timestamp form that enters the hash.
pub fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// The exact bytes hashed for `entry`.
pub fn canonical_bytes(entry: &EvidenceEntry) -> LedgerResult<Vec<u8>> {
    serde_json::to_vec(&CanonicalBlock::of(entry)).map_err(|e| LedgerError::Serialization {
        reason: format!("block {} could not be canonicalized: {}", entry.block_number, e),
    })
}

/// Compute the SHA-256 hash of an entry's content.
///
/// The stored `hash` field is ignored, so this is also how verification
/// recomputes the expected value. Returns a lowercase 64-character hex
/// string.
pub fn hash_entry(entry: &EvidenceEntry) -> LedgerResult<String> {
    let bytes = canonical_bytes(entry)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Verify a sequence of blocks, genesis first.
///
/// Every block is checked, and every failure is collected:
///
/// 1. **Numbering**: the block number equals its position.
/// 2. **Content**: the stored `hash` equals the recomputed hash.
/// 3. **Linkage**: `previous_hash` equals the *stored* hash of the
///    preceding block, or `GENESIS_PREVIOUS_HASH` for position 0.
///
/// Violations are reported against the block's position, which is the
/// number it should carry. An empty slice is valid.
pub fn verify_chain(blocks: &[EvidenceEntry]) -> IntegrityReport {
    let mut violations = Vec::new();

    for (position, block) in blocks.iter().enumerate() {
        let expected_number = position as u64;

        if block.block_number != expected_number {
            violations.push(BlockViolation {
                block_number: expected_number,
                kind: ViolationKind::SequenceGap,
                detail: format!(
                    "block at position {} carries number {}",
                    position, block.block_number
                ),
            });
        }

        match hash_entry(block) {
            Ok(recomputed) if recomputed == block.hash => {}
            Ok(recomputed) => violations.push(BlockViolation {
                block_number: expected_number,
                kind: ViolationKind::ContentMismatch,
                detail: format!("stored hash {} but content hashes to {}", block.hash, recomputed),
            }),
            Err(e) => violations.push(BlockViolation {
                block_number: expected_number,
                kind: ViolationKind::ContentMismatch,
                detail: e.to_string(),
            }),
        }

        let expected_prev = match position.checked_sub(1) {
            Some(prev) => blocks[prev].hash.as_str(),
            None => GENESIS_PREVIOUS_HASH,
        };
        if block.previous_hash != expected_prev {
            violations.push(BlockViolation {
                block_number: expected_number,
                kind: ViolationKind::BrokenLink,
                detail: format!(
                    "previous hash {} does not match expected {}",
                    block.previous_hash, expected_prev
                ),
            });
        }
    }

    let mut corrupted_blocks: Vec<u64> = violations.iter().map(|v| v.block_number).collect();
    corrupted_blocks.dedup();

    let is_valid = violations.is_empty();
    let message = if blocks.is_empty() {
        "ledger is empty".to_string()
    } else if is_valid {
        format!("ledger verified: {} blocks intact", blocks.len())
    } else {
        format!("{} of {} blocks corrupted", corrupted_blocks.len(), blocks.len())
    };

    IntegrityReport {
        is_valid,
        corrupted_blocks,
        message,
        violations,
        blocks_checked: blocks.len(),
    }
}
