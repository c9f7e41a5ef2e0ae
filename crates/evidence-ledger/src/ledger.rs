//! The evidence ledger.
//!
//! `EvidenceLedger` owns a `LedgerStore`, a `Clock`, and an
//! `EvidenceSigner`, and is the only writer of its store. Hosts construct
//! one ledger and share it (usually behind an `Arc`) with every caller.
//!
//! # Concurrency
//!
//! The cached chain head lives in a `tokio::sync::RwLock`. Appends and
//! resets hold the write guard across the whole read-head / seal / persist /
//! advance sequence, including every store `.await`, so concurrent appends
//! are linearized into a gapless chain. Reads hold the read guard while they
//! load blocks, so they see the chain either before or after an append.

use std::fmt;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use evidence_contracts::{
    ChainHead, Clock, EventType, EvidenceEntry, EvidenceId, EvidenceSigner, IntegrityReport,
    LedgerError, LedgerQuery, LedgerResult, LedgerState, LedgerStore, LedgerSummary, NewEvidence,
    SystemClock, GENESIS_PREVIOUS_HASH,
};

use crate::{
    chain::{hash_entry, verify_chain},
    config::LedgerConfig,
    export::export_blocks,
    query::apply_query,
    summary::summarize,
};

/// An append-only, hash-chained evidence ledger over a host-supplied store.
pub struct EvidenceLedger<S, C = SystemClock> {
    store: S,
    clock: C,
    signer: Box<dyn EvidenceSigner>,
    config: LedgerConfig,
    /// `None` until the head has been loaded from, or written to, the store.
    head: RwLock<Option<ChainHead>>,
}

impl<S: LedgerStore> EvidenceLedger<S, SystemClock> {
    /// Create a ledger over `store` using wall-clock time and default config.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: LedgerStore, C: Clock> EvidenceLedger<S, C> {
    /// Create a ledger over `store` that stamps blocks with `clock`.
    pub fn with_clock(store: S, clock: C) -> Self {
        let config = LedgerConfig::default();
        Self {
            store,
            clock,
            signer: config.signer(),
            config,
            head: RwLock::new(None),
        }
    }

    /// Replace the configuration. The signer follows `config.signing_key`.
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.signer = config.signer();
        self.config = config;
        self
    }

    /// Replace the signer, e.g. with a host-supplied asymmetric signer.
    pub fn with_signer(mut self, signer: impl EvidenceSigner + 'static) -> Self {
        self.signer = Box::new(signer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ── Write side ──────────────────────────────────────────────────────────

    /// Ensure the ledger has a genesis block.
    ///
    /// With an empty store, or when `reset_existing` is true, the store is
    /// cleared and exactly one genesis block is written. Otherwise this is a
    /// no-op that only loads the current head.
    pub async fn initialize(&self, reset_existing: bool) -> LedgerResult<()> {
        let mut head = self.head.write().await;

        if reset_existing {
            // The cached head is stale from here on, even if genesis fails.
            *head = None;
            self.store.clear_all().await?;
            info!("evidence ledger reset");
            self.write_genesis(&mut head).await?;
            return Ok(());
        }

        self.ensure_head(&mut head).await?;
        Ok(())
    }

    /// Append one piece of evidence as the new chain head.
    ///
    /// Initializes the ledger first if no genesis block exists. The head only
    /// advances after the store confirms the append; on a store failure the
    /// error is returned and the next append reuses the same block number.
    pub async fn record_evidence(&self, evidence: NewEvidence) -> LedgerResult<EvidenceEntry> {
        if evidence.event_type == EventType::Genesis {
            return Err(LedgerError::InvalidEvidence {
                reason: "the genesis event type is reserved for block 0".to_string(),
            });
        }

        let mut head = self.head.write().await;
        let current = self.ensure_head(&mut head).await?;

        let entry = self.seal(current.block_number + 1, current.hash, evidence)?;

        if let Err(e) = self.store.append_block(&entry).await {
            error!(
                block_number = entry.block_number,
                error = %e,
                "failed to persist evidence block; head unchanged"
            );
            return Err(e);
        }

        *head = Some(ChainHead {
            block_number: entry.block_number,
            hash: entry.hash.clone(),
        });

        debug!(
            block_number = entry.block_number,
            event_type = %entry.event_type,
            module_id = %entry.module_id,
            hash = %entry.hash,
            "evidence recorded"
        );

        Ok(entry)
    }

    /// Return the cached head, loading it from the store (and writing
    /// genesis into an empty store) on first use. Caller holds the write
    /// guard.
    async fn ensure_head(&self, head: &mut Option<ChainHead>) -> LedgerResult<ChainHead> {
        if let Some(current) = head.as_ref() {
            return Ok(current.clone());
        }

        let blocks = self.store.load_all_blocks().await?;
        match blocks.iter().max_by_key(|b| b.block_number) {
            Some(last) => {
                let current = ChainHead {
                    block_number: last.block_number,
                    hash: last.hash.clone(),
                };
                debug!(
                    block_number = current.block_number,
                    blocks = blocks.len(),
                    "loaded chain head from store"
                );
                *head = Some(current.clone());
                Ok(current)
            }
            None => self.write_genesis(head).await,
        }
    }

    async fn write_genesis(&self, head: &mut Option<ChainHead>) -> LedgerResult<ChainHead> {
        let genesis = NewEvidence::new(
            EventType::Genesis,
            self.config.genesis_module_id.clone(),
            self.config.genesis_module_name.clone(),
            self.config.genesis_originator.clone(),
            "Genesis block",
        );
        let genesis = self.seal(0, GENESIS_PREVIOUS_HASH.to_string(), genesis)?;

        if let Err(e) = self.store.append_block(&genesis).await {
            error!(error = %e, "failed to persist genesis block");
            return Err(e);
        }

        let current = ChainHead {
            block_number: 0,
            hash: genesis.hash.clone(),
        };
        *head = Some(current.clone());

        info!(hash = %genesis.hash, signer = self.signer.scheme(), "genesis block created");
        Ok(current)
    }

    /// Stamp, hash, and sign a block.
    fn seal(
        &self,
        block_number: u64,
        previous_hash: String,
        evidence: NewEvidence,
    ) -> LedgerResult<EvidenceEntry> {
        let mut entry = EvidenceEntry {
            id: EvidenceId::new(),
            block_number,
            timestamp: self.clock.now(),
            event_type: evidence.event_type,
            module_id: evidence.module_id,
            module_name: evidence.module_name,
            originator: evidence.originator,
            description: evidence.description,
            data: evidence.data,
            vessel_id: evidence.vessel_id,
            metadata: evidence.metadata,
            hash: String::new(),
            previous_hash,
            signature: String::new(),
        };
        entry.hash = hash_entry(&entry)?;
        entry.signature = self.signer.sign(&entry.hash, &entry.originator);
        Ok(entry)
    }

    // ── Read side ───────────────────────────────────────────────────────────

    /// Load a consistent snapshot of every stored block.
    async fn snapshot(&self) -> LedgerResult<Vec<EvidenceEntry>> {
        let _guard = self.head.read().await;
        self.store.load_all_blocks().await
    }

    /// Whether a genesis block has been persisted.
    pub async fn state(&self) -> LedgerResult<LedgerState> {
        if self.head.read().await.is_some() {
            return Ok(LedgerState::Active);
        }
        let blocks = self.snapshot().await?;
        Ok(if blocks.is_empty() {
            LedgerState::Uninitialized
        } else {
            LedgerState::Active
        })
    }

    /// The head as last appended or loaded by this ledger, if any.
    pub async fn head(&self) -> Option<ChainHead> {
        self.head.read().await.clone()
    }

    /// Walk the stored chain from genesis to head and report every corrupted
    /// block. Corruption is never an error; only a failed store read is.
    pub async fn verify_ledger_integrity(&self) -> LedgerResult<IntegrityReport> {
        let blocks = self.snapshot().await?;
        let report = verify_chain(&blocks);

        if report.is_valid {
            debug!(blocks = report.blocks_checked, "ledger integrity verified");
        } else {
            for violation in &report.violations {
                warn!(
                    block_number = violation.block_number,
                    kind = ?violation.kind,
                    detail = %violation.detail,
                    "ledger integrity violation"
                );
            }
            info!(
                corrupted = report.corrupted_blocks.len(),
                blocks = report.blocks_checked,
                "ledger integrity check failed"
            );
        }

        Ok(report)
    }

    /// Non-genesis blocks matching `query`, newest first.
    pub async fn query_ledger(&self, query: &LedgerQuery) -> LedgerResult<Vec<EvidenceEntry>> {
        let blocks = self.snapshot().await?;
        Ok(apply_query(&blocks, query))
    }

    /// The block with exactly this number, or `None`.
    pub async fn get_evidence_entry(&self, block_number: u64) -> LedgerResult<Option<EvidenceEntry>> {
        let blocks = self.snapshot().await?;
        Ok(blocks.into_iter().find(|b| b.block_number == block_number))
    }

    /// Every block recorded for `module_id`, newest first.
    pub async fn get_module_evidence_chain(&self, module_id: &str) -> LedgerResult<Vec<EvidenceEntry>> {
        self.query_ledger(&LedgerQuery::all().module(module_id)).await
    }

    /// Totals, recent activity, and a fresh integrity verdict.
    pub async fn get_ledger_summary(&self) -> LedgerResult<LedgerSummary> {
        let blocks = self.snapshot().await?;
        let report = verify_chain(&blocks);
        Ok(summarize(&blocks, &report, self.config.summary_recent_limit))
    }

    /// Every block, genesis included, as a JSON array in ascending order.
    pub async fn export_ledger(&self) -> LedgerResult<String> {
        let blocks = self.snapshot().await?;
        export_blocks(&blocks)
    }

    /// Check an entry's signature with this ledger's signer.
    pub fn verify_entry_signature(&self, entry: &EvidenceEntry) -> bool {
        self.signer.verify(&entry.hash, &entry.originator, &entry.signature)
    }
}

impl<S: fmt::Debug, C> fmt::Debug for EvidenceLedger<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvidenceLedger")
            .field("store", &self.store)
            .field("signer", &self.signer.scheme())
            .finish_non_exhaustive()
    }
}
