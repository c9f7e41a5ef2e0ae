//! Digest-based block signers.
//!
//! Both signers bind a block's hash to its originator with a second SHA-256
//! pass. They detect a signature copied onto a different block or
//! originator; they do not prove who wrote the block. `KeyedDigestSigner`
//! additionally requires a host secret to produce a matching signature.

use std::fmt;

use sha2::{Digest, Sha256};

use evidence_contracts::EvidenceSigner;

const SIGNATURE_DOMAIN: &[u8] = b"evidence-signature:v1";

fn digest_signature(key: &[u8], hash: &str, originator: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(SIGNATURE_DOMAIN);
    hasher.update(hash.as_bytes());
    hasher.update(b":");
    hasher.update(originator.as_bytes());
    hex::encode(hasher.finalize())
}

/// Unkeyed signer: `SHA-256("evidence-signature:v1" ‖ hash ‖ ":" ‖ originator)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestSigner;

impl EvidenceSigner for DigestSigner {
    fn scheme(&self) -> &str {
        "sha256-digest"
    }

    fn sign(&self, hash: &str, originator: &str) -> String {
        digest_signature(&[], hash, originator)
    }
}

/// Signer that prefixes a host-held secret to the digest input.
#[derive(Clone)]
pub struct KeyedDigestSigner {
    key: Vec<u8>,
}

impl KeyedDigestSigner {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Debug for KeyedDigestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedDigestSigner")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl EvidenceSigner for KeyedDigestSigner {
    fn scheme(&self) -> &str {
        "sha256-keyed-digest"
    }

    fn sign(&self, hash: &str, originator: &str) -> String {
        digest_signature(&self.key, hash, originator)
    }
}
