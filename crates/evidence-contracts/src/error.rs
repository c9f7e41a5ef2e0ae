//! Error types for the evidence ledger.
//!
//! All fallible ledger operations return `LedgerResult<T>`. Two outcomes are
//! deliberately absent from this enum: a missing block is `Option::None`,
//! and chain corruption is reported as an `IntegrityReport`, never raised.

use thiserror::Error;

/// The unified error type for the evidence ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The storage backend failed to read or write.
    ///
    /// On a failed append the chain head is left exactly where it was.
    #[error("persistence error: {reason}")]
    Persistence { reason: String },

    /// A block could not be encoded for hashing or export.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// The caller supplied evidence the ledger refuses to record.
    #[error("invalid evidence: {reason}")]
    InvalidEvidence { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// An exported ledger document could not be parsed back into blocks.
    #[error("export format error: {reason}")]
    ExportFormat { reason: String },
}

impl LedgerError {
    /// Shorthand for building a `Persistence` error from any displayable cause.
    pub fn persistence(reason: impl std::fmt::Display) -> Self {
        Self::Persistence {
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the ledger crates.
pub type LedgerResult<T> = Result<T, LedgerError>;
