//! # evidence-contracts
//!
//! Shared types, error taxonomy, and storage contracts for the evidence
//! ledger.
//!
//! Every crate in the workspace imports from here. No business logic lives
//! in this crate: only data definitions, errors, and the traits the ledger
//! calls through.

pub mod entry;
pub mod error;
pub mod query;
pub mod report;
pub mod traits;
pub mod value;

pub use entry::{EventType, EvidenceEntry, EvidenceId, NewEvidence, GENESIS_PREVIOUS_HASH};
pub use error::{LedgerError, LedgerResult};
pub use query::LedgerQuery;
pub use report::{
    BlockViolation, ChainHead, IntegrityReport, IntegrityStatus, LedgerState, LedgerSummary,
    ViolationKind,
};
pub use traits::{Clock, EvidenceSigner, LedgerStore, SystemClock};
pub use value::EvidenceValue;
