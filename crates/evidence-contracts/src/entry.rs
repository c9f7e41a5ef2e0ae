//! Ledger block types.
//!
//! `EvidenceEntry` is one immutable block of the hash chain. `NewEvidence`
//! is what a caller hands to the ledger; the ledger fills in the numbering,
//! timestamp, identifier, hashes, and signature.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::EvidenceValue;

/// Sentinel `previousHash` of the genesis block: 68 zero characters.
///
/// It is longer than any hex SHA-256 digest, so no real block hash can ever
/// collide with it.
pub const GENESIS_PREVIOUS_HASH: &str =
    "00000000000000000000000000000000000000000000000000000000000000000000";

/// Globally unique identifier of a ledger block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceId(pub uuid::Uuid);

impl EvidenceId {
    /// Create a new, random identifier.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EvidenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The kind of compliance evidence a block records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Inspection,
    Audit,
    Correction,
    Checklist,
    Incident,
    Training,
    /// Reserved for block 0. Callers cannot record evidence of this type.
    Genesis,
}

impl EventType {
    /// Every type a caller may record, in declaration order.
    pub const RECORDABLE: [EventType; 6] = [
        EventType::Inspection,
        EventType::Audit,
        EventType::Correction,
        EventType::Checklist,
        EventType::Incident,
        EventType::Training,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Inspection => "inspection",
            EventType::Audit => "audit",
            EventType::Correction => "correction",
            EventType::Checklist => "checklist",
            EventType::Incident => "incident",
            EventType::Training => "training",
            EventType::Genesis => "genesis",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inspection" => Ok(EventType::Inspection),
            "audit" => Ok(EventType::Audit),
            "correction" => Ok(EventType::Correction),
            "checklist" => Ok(EventType::Checklist),
            "incident" => Ok(EventType::Incident),
            "training" => Ok(EventType::Training),
            "genesis" => Ok(EventType::Genesis),
            other => Err(format!("unknown event type '{other}'")),
        }
    }
}

/// A single block in the evidence hash chain.
///
/// Each block commits to its predecessor through `previous_hash`. Changing
/// any field that feeds the hash, including a value nested deep inside
/// `data`, invalidates `hash` and is reported by chain verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceEntry {
    pub id: EvidenceId,

    /// Position in the chain, 0 for genesis, contiguous thereafter.
    pub block_number: u64,

    /// Instant the ledger recorded this block (UTC).
    pub timestamp: DateTime<Utc>,

    pub event_type: EventType,

    /// Subsystem that produced the evidence, e.g. `"ism"` or `"mlc"`.
    pub module_id: String,
    pub module_name: String,

    /// Who recorded the evidence. The ledger does not authenticate this.
    pub originator: String,

    pub description: String,

    /// Caller payload, stored verbatim and covered by `hash`.
    pub data: EvidenceValue,

    /// Asset (vessel) the evidence concerns, if any.
    pub vessel_id: Option<String>,

    /// Free-form annotations, covered by `hash`.
    pub metadata: Option<EvidenceValue>,

    /// SHA-256 (lowercase hex) of the canonical block content.
    pub hash: String,

    /// `hash` of the preceding block, or `GENESIS_PREVIOUS_HASH` for block 0.
    pub previous_hash: String,

    /// Authenticity marker produced by the ledger's signer.
    pub signature: String,
}

impl EvidenceEntry {
    pub fn is_genesis(&self) -> bool {
        self.block_number == 0
    }

    /// One-line description for logs and the CLI.
    pub fn summary(&self) -> String {
        format!(
            "#{} {} [{}] {} by {}",
            self.block_number, self.event_type, self.module_id, self.description, self.originator
        )
    }
}

/// Caller-supplied content for a new block.
///
/// ```rust,ignore
/// let evidence = NewEvidence::new(
///     EventType::Inspection,
///     "ism",
///     "ISM Code",
///     "chief.officer@mv-aurora",
///     "Monthly lifeboat inspection",
/// )
/// .with_vessel("IMO9321483");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvidence {
    pub event_type: EventType,
    pub module_id: String,
    pub module_name: String,
    pub originator: String,
    pub description: String,
    pub data: EvidenceValue,
    pub vessel_id: Option<String>,
    pub metadata: Option<EvidenceValue>,
}

impl NewEvidence {
    /// Build evidence with an empty `data` map and no vessel or metadata.
    pub fn new(
        event_type: EventType,
        module_id: impl Into<String>,
        module_name: impl Into<String>,
        originator: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            module_id: module_id.into(),
            module_name: module_name.into(),
            originator: originator.into(),
            description: description.into(),
            data: EvidenceValue::empty_map(),
            vessel_id: None,
            metadata: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<EvidenceValue>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_vessel(mut self, vessel_id: impl Into<String>) -> Self {
        self.vessel_id = Some(vessel_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<EvidenceValue>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}
