//! In-memory implementation of `LedgerStore`.
//!
//! `MemoryLedgerStore` keeps all blocks in a `Vec` behind an
//! `Arc<Mutex<_>>`. Clones share the same blocks, so a host can keep a
//! handle to the store it gave the ledger and inspect what was persisted.

use std::sync::{Arc, Mutex, MutexGuard};

use evidence_contracts::{EvidenceEntry, LedgerError, LedgerResult, LedgerStore};

/// A process-local, append-only block store.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    pub(crate) blocks: Arc<Mutex<Vec<EvidenceEntry>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> LedgerResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    pub(crate) fn lock(&self) -> LedgerResult<MutexGuard<'_, Vec<EvidenceEntry>>> {
        self.blocks
            .lock()
            .map_err(|e| LedgerError::persistence(format!("memory store lock poisoned: {}", e)))
    }
}

impl LedgerStore for MemoryLedgerStore {
    async fn load_all_blocks(&self) -> LedgerResult<Vec<EvidenceEntry>> {
        Ok(self.lock()?.clone())
    }

    async fn append_block(&self, block: &EvidenceEntry) -> LedgerResult<()> {
        self.lock()?.push(block.clone());
        Ok(())
    }

    async fn clear_all(&self) -> LedgerResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}
