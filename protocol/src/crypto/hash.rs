// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Hashing Utilities
//!
//! Two hash functions, two jobs:
//!
//! - **SHA-256**: address derivation. The derivation preimage layout is a
//!   ledger convention, and the ledger speaks SHA-256.
//! - **BLAKE3**: everything Genesys-internal, notably instruction signing
//!   digests, where we want domain separation via `derive_key` mode.

use sha2::{Digest, Sha256};

/// SHA-256 over several byte slices fed in sequence, without concatenating.
///
/// `hashv(&[a, b])` equals `SHA-256(a || b)`.
pub fn hashv(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// SHA-256 of a single byte slice.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    hashv(&[data])
}

/// BLAKE3 of a single byte slice.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Domain-separated BLAKE3 using the built-in `derive_key` mode.
///
/// Digests computed under different contexts never collide, even over the
/// same data. Instruction signatures use this so a signature over a vault
/// instruction can't be replayed as anything else.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}
