// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Yield Index Arithmetic
//!
//! Yield is tracked as a cumulative per-unit index in fixed point
//! ([`YIELD_INDEX_SCALE`]). Refresh Reserve spreads the reserve surplus
//! across all locked principal. Deposit does the same over the principal
//! including the new deposit, with the newcomer's snapshot taken before the
//! step, so surplus already sitting in the reserve is never stranded:
//!
//! ```text
//! surplus   = reserve - total_principal - ceil(liability / SCALE)     (saturating)
//! delta     = floor(surplus * SCALE / total_principal)
//! index    += delta
//! liability += delta * total_principal                                  (scaled units)
//! ```
//!
//! A depositor's yield on withdrawal is `floor(principal * (index - snapshot) / SCALE)`.
//!
//! Everything rounds down on the payout side and up on the liability side,
//! so the vault can never promise more than the reserve physically holds.
//! The liability is kept in scaled units, so what is attributed and what is
//! later released match exactly and nothing is counted twice.

use genesys_protocol::config::YIELD_INDEX_SCALE;

use crate::error::VaultError;

/// Result of spreading a surplus over the locked principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    /// Amount added to the cumulative index.
    pub index_delta: u128,
    /// `index_delta * total_principal`, in scaled units.
    pub attributed_scaled: u128,
}

/// Outstanding yield liability in whole units, rounded up.
pub fn liability_units(liability_scaled: u128) -> u128 {
    liability_scaled.div_ceil(YIELD_INDEX_SCALE)
}

/// Reserve funds not already backing principal or attributed yield.
///
/// Zero if the reserve has fallen below what is committed: negative yield
/// is never distributed.
pub fn reserve_surplus(reserve_balance: u64, total_principal: u64, liability_scaled: u128) -> u64 {
    let committed = u128::from(total_principal).saturating_add(liability_units(liability_scaled));
    let surplus = u128::from(reserve_balance).saturating_sub(committed);
    // surplus <= reserve_balance, so this never truncates.
    u64::try_from(surplus).unwrap_or(0)
}

/// Spread `surplus` over `total_principal`.
///
/// `None` when there is nothing to do: no surplus, no principal, or a
/// surplus too small to move the index by one scaled unit.
pub fn accrue(surplus: u64, total_principal: u64) -> Option<Accrual> {
    if surplus == 0 || total_principal == 0 {
        return None;
    }
    let principal = u128::from(total_principal);
    // u64::MAX * 10^12 fits comfortably in u128.
    let index_delta = u128::from(surplus) * YIELD_INDEX_SCALE / principal;
    if index_delta == 0 {
        return None;
    }
    Some(Accrual {
        index_delta,
        attributed_scaled: index_delta * principal,
    })
}

/// Exact scaled entitlement of `principal` between `snapshot` and `index`.
pub fn accrued_scaled(principal: u64, index: u128, snapshot: u128) -> Result<u128, VaultError> {
    let delta = index
        .checked_sub(snapshot)
        .ok_or(VaultError::ArithmeticOverflow)?;
    u128::from(principal)
        .checked_mul(delta)
        .ok_or(VaultError::ArithmeticOverflow)
}

/// Whole units of yield owed, rounded down.
pub fn yield_owed(principal: u64, index: u128, snapshot: u128) -> Result<u64, VaultError> {
    let scaled = accrued_scaled(principal, index, snapshot)?;
    u64::try_from(scaled / YIELD_INDEX_SCALE).map_err(|_| VaultError::ArithmeticOverflow)
}
