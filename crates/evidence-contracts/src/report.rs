//! Integrity reports and ledger summaries.
//!
//! These are the read-side results of the ledger. Corruption is always
//! described here as data; nothing in this module is an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entry::{EventType, EvidenceEntry};

/// Why a block failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The stored `hash` differs from the hash recomputed from the content.
    ContentMismatch,
    /// `previousHash` does not match the stored hash of the preceding block
    /// (or the genesis sentinel, for block 0).
    BrokenLink,
    /// The block number does not match the block's position in the chain.
    SequenceGap,
}

/// One failed check on one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockViolation {
    pub block_number: u64,
    pub kind: ViolationKind,
    pub detail: String,
}

/// Result of walking the chain from genesis to head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// True only when no block failed any check.
    pub is_valid: bool,
    /// Every block number with at least one violation, ascending, no duplicates.
    pub corrupted_blocks: Vec<u64>,
    /// Human-readable verdict, e.g. "2 of 128 blocks corrupted".
    pub message: String,
    /// Every individual failure, in chain order.
    pub violations: Vec<BlockViolation>,
    /// Number of blocks examined.
    pub blocks_checked: usize,
}

/// Condensed verdict carried in a `LedgerSummary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum IntegrityStatus {
    Verified,
    Compromised { corrupted_blocks: Vec<u64> },
}

impl IntegrityStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, IntegrityStatus::Verified)
    }
}

impl From<&IntegrityReport> for IntegrityStatus {
    fn from(report: &IntegrityReport) -> Self {
        if report.is_valid {
            IntegrityStatus::Verified
        } else {
            IntegrityStatus::Compromised {
                corrupted_blocks: report.corrupted_blocks.clone(),
            }
        }
    }
}

/// Diagnostic overview of the whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// All blocks, genesis included.
    pub total_blocks: usize,
    pub integrity_status: IntegrityStatus,
    /// Non-genesis blocks per event type. Types with no blocks are absent.
    pub total_events: BTreeMap<EventType, usize>,
    /// Most recent non-genesis blocks, newest first.
    pub recent_entries: Vec<EvidenceEntry>,
    /// Earliest non-genesis block.
    pub first_block: Option<EvidenceEntry>,
    /// Current head (genesis when nothing has been recorded).
    pub last_block: Option<EvidenceEntry>,
}

impl LedgerSummary {
    /// Count for one event type, zero when absent.
    pub fn events_of(&self, event_type: EventType) -> usize {
        self.total_events.get(&event_type).copied().unwrap_or(0)
    }
}

/// The most recently appended block, as tracked by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHead {
    pub block_number: u64,
    pub hash: String,
}

/// Lifecycle of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerState {
    /// No genesis block has been persisted yet.
    Uninitialized,
    /// Genesis present; appends allowed.
    Active,
}
