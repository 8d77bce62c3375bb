// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Custody Address Derivation
//!
//! Custody accounts (the vault registry, the reserve, each depositor's
//! record and custody account) have no private key. Their addresses are
//! *derived* from a namespace tag, an optional owner identity, and the
//! program's own id:
//!
//! ```text
//! candidate(bump) = SHA-256(seed_0 || .. || seed_n || [bump] || program_id || "ProgramDerivedAddress")
//! address         = candidate(b) for the highest b in 255..=0 that is NOT an Ed25519 point
//! ```
//!
//! Being off the curve is the whole trick: no secret key can sign for such
//! an address, so only the program (which can re-derive it) has authority
//! over it. The highest working bump is the *canonical* bump; verification
//! accepts nothing else, otherwise one seed set could name up to 256
//! distinct accounts.
//!
//! Everything here is pure and deterministic. Same inputs, same address,
//! every time.

use curve25519_dalek::edwards::CompressedEdwardsY;
use thiserror::Error;
use tracing::debug;

use crate::config::{MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER};
use crate::crypto::hash::hashv;
use crate::crypto::keys::Pubkey;

/// Errors from address derivation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// A seed is longer than [`MAX_SEED_LEN`].
    #[error("seed of {len} bytes exceeds the {max}-byte limit")]
    SeedTooLong { len: usize, max: usize },

    /// More seeds than [`MAX_SEEDS`] (the bump counts as one).
    #[error("{count} seeds exceed the limit of {max}")]
    TooManySeeds { count: usize, max: usize },

    /// The candidate for this exact bump lies on the curve.
    #[error("derived candidate lies on the ed25519 curve")]
    OnCurve,

    /// No bump in 0..=255 produced an off-curve address.
    #[error("no valid bump found in the derivation search space")]
    Exhausted,
}

/// Returns `true` if `bytes` decompress to a point on the Ed25519 curve.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

fn check_seeds(seeds: &[&[u8]], with_bump: bool) -> Result<(), DeriveError> {
    let count = seeds.len() + usize::from(with_bump);
    if count > MAX_SEEDS {
        return Err(DeriveError::TooManySeeds {
            count,
            max: MAX_SEEDS,
        });
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(DeriveError::SeedTooLong {
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }
    Ok(())
}

/// Hash `seeds` (the bump, if any, already appended by the caller) into an
/// address. Fails with [`DeriveError::OnCurve`] if the result is a valid point.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, DeriveError> {
    check_seeds(seeds, false)?;

    let mut parts: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 2);
    parts.extend_from_slice(seeds);
    parts.push(program_id.as_ref());
    parts.push(PDA_MARKER);

    let candidate = hashv(&parts);
    if is_on_curve(&candidate) {
        return Err(DeriveError::OnCurve);
    }
    Ok(Pubkey::new(candidate))
}

/// Find the canonical `(address, bump)` for a seed set.
///
/// Searches bumps from 255 downward and returns the first off-curve
/// candidate. Roughly half of all candidates are off-curve, so this almost
/// always succeeds on the first or second try.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), DeriveError> {
    check_seeds(seeds, true)?;

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);

        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(DeriveError::OnCurve) => continue,
            Err(other) => return Err(other),
        }
    }

    Err(DeriveError::Exhausted)
}

/// Derive the custody address for a namespace tag and optional owner.
///
/// This is the contract the vault builds on: `derive(tag, owner?) -> (address, bump)`.
pub fn derive_address(
    tag: &str,
    owner: Option<&Pubkey>,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), DeriveError> {
    let derived = match owner {
        Some(owner) => find_program_address(&[tag.as_bytes(), owner.as_ref()], program_id)?,
        None => find_program_address(&[tag.as_bytes()], program_id)?,
    };
    debug!(tag, owner = ?owner, address = %derived.0, bump = derived.1, "derived custody address");
    Ok(derived)
}
