// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Digital Signatures
//!
//! Proof-of-authority for vault instructions. A caller proves it speaks for
//! an identity by signing a digest; the vault checks that proof before it
//! looks at anything else. Wrapping ed25519-dalek here keeps every signing
//! path in one auditable place.

use thiserror::Error;

use super::hash::domain_separated_hash;
use super::keys::{Keypair, Pubkey, Signature};

/// Errors during signature operations.
///
/// Intentionally vague: "invalid signature" and "wrong key" look the same.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Sign a message.
pub fn sign(keypair: &Keypair, message: &[u8]) -> Signature {
    keypair.sign(message)
}

/// Verify a signature against a public key and message.
pub fn verify(public_key: &Pubkey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

/// Sign the domain-separated digest of `payload` under `domain`.
pub fn sign_domain(keypair: &Keypair, domain: &str, payload: &[u8]) -> Signature {
    keypair.sign(&domain_separated_hash(domain, payload))
}

/// Verify a signature produced by [`sign_domain`].
pub fn verify_domain(
    public_key: &Pubkey,
    domain: &str,
    payload: &[u8],
    signature: &Signature,
) -> Result<(), SignatureError> {
    let digest = domain_separated_hash(domain, payload);
    if public_key.verify(&digest, signature) {
        Ok(())
    } else {
        Err(SignatureError::VerificationFailed)
    }
}
