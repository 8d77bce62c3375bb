// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Cryptographic Primitives
//!
//! Thin, type-safe wrappers around audited implementations:
//!
//! - **Ed25519** (ed25519-dalek) for identities and instruction signatures.
//! - **SHA-256** (sha2) for custody address derivation.
//! - **BLAKE3** for domain-separated signing digests.
//!
//! We don't roll our own. If you're tempted to optimize these functions,
//! reconsider.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{blake3_hash, domain_separated_hash, hashv, sha256};
pub use keys::{KeyError, Keypair, Pubkey, Signature};
pub use signatures::{sign, sign_domain, verify, verify_domain, SignatureError};
