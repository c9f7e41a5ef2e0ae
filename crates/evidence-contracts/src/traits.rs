//! The seams the ledger calls through.
//!
//! - `LedgerStore`:    host-supplied persistence (append/read contract)
//! - `Clock`:          host-supplied time source
//! - `EvidenceSigner`: pluggable authenticity marker for each block
//!
//! The ledger never reaches past these traits: it does not know whether
//! blocks live in memory, on disk, or behind a network round-trip.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{entry::EvidenceEntry, error::LedgerResult};

/// Storage backend for ledger blocks.
///
/// Every method may suspend. The ledger holds its append guard across the
/// full `append_block` future, so implementations never see two appends
/// interleaved from the same ledger.
pub trait LedgerStore: Send + Sync {
    /// Return every stored block in ascending block-number order.
    fn load_all_blocks(&self) -> impl Future<Output = LedgerResult<Vec<EvidenceEntry>>> + Send;

    /// Persist one block after the current last block.
    ///
    /// Must be all-or-nothing from the ledger's point of view: on `Err` the
    /// block must not be visible to a later `load_all_blocks`.
    fn append_block(&self, block: &EvidenceEntry) -> impl Future<Output = LedgerResult<()>> + Send;

    /// Remove every stored block. Only used when resetting the ledger.
    fn clear_all(&self) -> impl Future<Output = LedgerResult<()>> + Send;
}

/// Source of the timestamps stamped onto new blocks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Produces the `signature` carried on every block.
///
/// The default implementations are digest-based and offer a lightweight
/// authenticity check, not non-repudiation. Hosts that need real signing
/// implement this trait over their own key material.
pub trait EvidenceSigner: Send + Sync {
    /// Short scheme name, recorded in logs.
    fn scheme(&self) -> &str;

    /// Derive the signature for a block from its hash and originator.
    fn sign(&self, hash: &str, originator: &str) -> String;

    /// Check a stored signature. The default re-signs and compares.
    fn verify(&self, hash: &str, originator: &str, signature: &str) -> bool {
        self.sign(hash, originator) == signature
    }
}
