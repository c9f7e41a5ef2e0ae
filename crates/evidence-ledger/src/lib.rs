//! # evidence-ledger
//!
//! Append-only, SHA-256 hash-chained evidence ledger for maritime compliance
//! records.
//!
//! ## Overview
//!
//! Every inspection, audit, correction, checklist, incident, or training
//! record is sealed into an `EvidenceEntry` that links to the previous block
//! through its hash. Editing any stored block, even a value nested deep in
//! its payload, breaks the chain and is reported by
//! `verify_ledger_integrity`. The JSON export can be re-verified offline
//! with `verify_export`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use evidence_contracts::{EventType, LedgerQuery, NewEvidence};
//! use evidence_ledger::{EvidenceLedger, MemoryLedgerStore};
//!
//! let ledger = EvidenceLedger::new(MemoryLedgerStore::new());
//! ledger.initialize(false).await?;
//! ledger
//!     .record_evidence(NewEvidence::new(
//!         EventType::Inspection,
//!         "ism",
//!         "ISM Code",
//!         "chief.officer@mv-aurora",
//!         "Monthly lifeboat inspection",
//!     ))
//!     .await?;
//!
//! assert!(ledger.verify_ledger_integrity().await?.is_valid);
//! let inspections = ledger
//!     .query_ledger(&LedgerQuery::all().event_type(EventType::Inspection))
//!     .await?;
//! ```

pub mod chain;
pub mod config;
pub mod export;
pub mod file;
pub mod ledger;
pub mod memory;
pub mod query;
pub mod signer;
pub mod summary;

pub use chain::{canonical_bytes, hash_entry, verify_chain};
pub use config::{LedgerConfig, StorageConfig};
pub use export::{export_blocks, parse_export, verify_export};
pub use file::JsonlLedgerStore;
pub use ledger::EvidenceLedger;
pub use memory::MemoryLedgerStore;
pub use signer::{DigestSigner, KeyedDigestSigner};

// ── Tests ─────────────────────────────────────────────────────────────────────
