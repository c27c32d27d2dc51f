//! Deterministic fingerprints for operations, sequences and cache tags.
//!
//! Hashes are SHA-256 with domain separation and length prefixing, so the same
//! canonical bytes always produce the same digest across runs and platforms.
//!
//! # Citations
//! - SHA-256: NIST FIPS 180-4 (2015)
//! - Domain separation & length prefixing: Bernstein et al., "How to hash into elliptic curves" (2009)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain for whole-sequence fingerprints (version 0).
const DOMAIN_SEQUENCE_V0: &[u8] = b"OP_SEQUENCE_V0";

/// A 256‑bit hash value.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashValue(pub [u8; 32]);

impl HashValue {
    /// Creates a zero hash (all zeros).
    #[inline]
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns the raw byte array.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Computes SHA‑256 of the given data with domain separation.
    ///
    /// Layout: `b"MOP:" || domain || b":v1" || le64(len(data)) || data`.
    pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"MOP:");
        hasher.update(domain);
        hasher.update(b":v1");
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Short hex preview of the first four bytes, for logs and labels.
    pub fn short_hex(&self) -> String {
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl std::fmt::Display for HashValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HashValue({}…)", self.short_hex())
    }
}

/// Values with a stable byte encoding.
///
/// Implementations must be injective over the equality relation of the type:
/// equal values produce equal bytes and unequal values produce unequal bytes.
pub trait Canonicalizable {
    /// Serialize to canonical byte representation.
    fn to_canonical_bytes(&self) -> Vec<u8>;

    /// Compute domain-separated hash of canonical bytes.
    fn fingerprint(&self, domain: &[u8]) -> HashValue {
        HashValue::hash_with_domain(domain, &self.to_canonical_bytes())
    }
}

/// Order-sensitive fingerprint of a sequence of operations.
///
/// Each item is length-prefixed, so `[ab, c]` and `[a, bc]` hash differently.
/// Two sequences with equal fingerprints are strictly equal up to hash collisions.
pub fn fingerprint_sequence<I>(ops: I) -> HashValue
where
    I: IntoIterator,
    I::Item: Canonicalizable,
{
    let mut data = Vec::with_capacity(256);
    let mut count = 0u64;
    for op in ops {
        let bytes = op.to_canonical_bytes();
        data.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
        data.extend_from_slice(&bytes);
        count += 1;
    }
    data.extend_from_slice(&count.to_le_bytes());
    HashValue::hash_with_domain(DOMAIN_SEQUENCE_V0, &data)
}
