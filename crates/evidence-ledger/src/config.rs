//! TOML ledger configuration.
//!
//! Every field has a default, so an empty document is a valid config.
//!
//! Example:
//! ```toml
//! genesis_originator = "fleet-compliance@operator"
//! summary_recent_limit = 10
//! signing_key = "change-me"
//!
//! [storage]
//! path = "/var/lib/fleet/evidence-ledger.jsonl"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use evidence_contracts::{EvidenceSigner, LedgerError, LedgerResult};

use crate::signer::{DigestSigner, KeyedDigestSigner};

/// Ledger settings loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// `moduleId` stamped on the genesis block.
    pub genesis_module_id: String,

    /// `moduleName` stamped on the genesis block.
    pub genesis_module_name: String,

    /// `originator` stamped on the genesis block.
    pub genesis_originator: String,

    /// Upper bound on `LedgerSummary::recent_entries`.
    pub summary_recent_limit: usize,

    /// When set, blocks are signed with `KeyedDigestSigner` over this secret
    /// instead of the unkeyed `DigestSigner`.
    pub signing_key: Option<String>,

    pub storage: StorageConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            genesis_module_id: "evidence-ledger".to_string(),
            genesis_module_name: "Evidence Ledger".to_string(),
            genesis_originator: "system".to_string(),
            summary_recent_limit: 5,
            signing_key: None,
            storage: StorageConfig::default(),
        }
    }
}

/// Where the file-backed store keeps its blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("evidence-ledger.jsonl"),
        }
    }
}

impl LedgerConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `LedgerError::ConfigError` if the TOML is malformed or a field
    /// has the wrong type.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        toml::from_str(s).map_err(|e| LedgerError::ConfigError {
            reason: format!("failed to parse ledger TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> LedgerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::ConfigError {
            reason: format!("failed to read ledger config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The signer this configuration selects.
    pub fn signer(&self) -> Box<dyn EvidenceSigner> {
        match &self.signing_key {
            Some(key) => Box::new(KeyedDigestSigner::new(key.as_bytes())),
            None => Box::new(DigestSigner),
        }
    }
}
