// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Vault State
//!
//! The registry (one per vault) and the per-depositor deposit records.
//! Token balances are not stored here: the reserve and custody balances live
//! on the ledger and are read through [`TokenLedger`].

use std::collections::BTreeMap;

use genesys_protocol::config::{DEFAULT_MAX_LOCK_SECONDS, DEFAULT_MAX_USER_DEPOSIT};
use genesys_protocol::crypto::keys::Pubkey;
use genesys_protocol::ledger::{TokenLedger, UnixTimestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::yield_index;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Limits fixed at Initialize. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Largest single deposit, in the asset's smallest unit.
    pub max_deposit: Option<u64>,
    /// Longest lock, in seconds.
    pub max_lock_duration: Option<u64>,
}

impl VaultConfig {
    /// No caps at all.
    pub fn unlimited() -> Self {
        Self {
            max_deposit: None,
            max_lock_duration: None,
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_deposit: Some(DEFAULT_MAX_USER_DEPOSIT),
            max_lock_duration: Some(DEFAULT_MAX_LOCK_SECONDS),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Global vault state. Created once by Initialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRegistry {
    /// The only identity allowed to refresh the reserve. Immutable.
    pub admin: Pubkey,
    /// The single asset this vault accepts. Immutable.
    pub asset: Pubkey,
    /// The registry's own derived address.
    pub address: Pubkey,
    /// Reserve custody account. Immutable.
    pub reserve: Pubkey,
    pub registry_bump: u8,
    pub reserve_bump: u8,
    /// Cumulative yield per unit of principal, scaled by `YIELD_INDEX_SCALE`.
    /// Only Refresh Reserve moves it, and only upward.
    pub yield_index: u128,
    /// Sum of principal across open deposits.
    pub total_principal: u64,
    /// Yield attributed by the index but not yet paid, in scaled units.
    pub yield_liability: u128,
    pub open_deposits: u64,
    /// Lifetime yield paid out, in whole units.
    pub total_yield_paid: u64,
    pub config: VaultConfig,
    pub initialized_at: UnixTimestamp,
}

impl VaultRegistry {
    /// Outstanding liability in whole units (rounded up).
    pub fn liability_units(&self) -> u128 {
        yield_index::liability_units(self.yield_liability)
    }
}

// ---------------------------------------------------------------------------
// Deposit Records
// ---------------------------------------------------------------------------

/// One depositor's open deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDepositRecord {
    pub depositor: Pubkey,
    /// Custody account holding the principal.
    pub custody: Pubkey,
    /// Locked amount. Always > 0.
    pub principal: u64,
    /// Lock length in seconds. Always > 0.
    pub lock_duration: u64,
    /// Ledger time of the deposit.
    pub deposited_at: UnixTimestamp,
    /// `yield_index` at deposit time.
    pub index_snapshot: u128,
    pub record_bump: u8,
    pub custody_bump: u8,
}

impl UserDepositRecord {
    /// First instant at which the deposit may be withdrawn.
    ///
    /// Saturates; Deposit refuses durations that would overflow.
    pub fn unlocks_at(&self) -> UnixTimestamp {
        let duration = i64::try_from(self.lock_duration).unwrap_or(i64::MAX);
        self.deposited_at.saturating_add(duration)
    }

    /// Seconds since the deposit. Zero if the clock reads earlier.
    pub fn elapsed(&self, now: UnixTimestamp) -> u64 {
        u64::try_from(now.saturating_sub(self.deposited_at)).unwrap_or(0)
    }

    /// Seconds until the lock runs out. Zero once withdrawable.
    pub fn remaining(&self, now: UnixTimestamp) -> u64 {
        u64::try_from(self.unlocks_at().saturating_sub(now)).unwrap_or(0)
    }

    /// Locked until `unlocks_at`, withdrawable from that instant on.
    pub fn is_withdrawable(&self, now: UnixTimestamp) -> bool {
        now >= self.unlocks_at()
    }
}

// ---------------------------------------------------------------------------
// VaultState
// ---------------------------------------------------------------------------

/// A violated accounting invariant. Seeing one means a bug, not bad input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("total principal {recorded} != sum of open deposits {sum}")]
    PrincipalMismatch { recorded: u64, sum: u128 },

    #[error("open deposit counter {recorded} != {actual} records")]
    OpenDepositsMismatch { recorded: u64, actual: usize },

    #[error("custody of {depositor} holds {balance}, principal is {principal}")]
    CustodyMismatch {
        depositor: Pubkey,
        principal: u64,
        balance: u64,
    },

    #[error("deposit record exists but the vault is not initialized")]
    OrphanRecords,
}

/// Everything the vault program owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    /// `None` until Initialize.
    pub registry: Option<VaultRegistry>,
    /// Open deposits, keyed by deposit record address.
    pub records: BTreeMap<Pubkey, UserDepositRecord>,
    /// Instructions committed per signer. A signed instruction must carry
    /// its signer's current count, so each signature commits at most once.
    #[serde(default)]
    pub nonces: BTreeMap<Pubkey, u64>,
}

impl VaultState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.is_some()
    }

    /// Nonce the next instruction from `signer` must carry.
    pub fn next_nonce(&self, signer: &Pubkey) -> u64 {
        self.nonces.get(signer).copied().unwrap_or(0)
    }

    /// Record stored at `address`.
    pub fn record(&self, address: &Pubkey) -> Option<&UserDepositRecord> {
        self.records.get(address)
    }

    /// The open deposit belonging to `depositor`, if any.
    pub fn record_of(&self, depositor: &Pubkey) -> Option<&UserDepositRecord> {
        self.records.values().find(|r| r.depositor == *depositor)
    }

    /// Sum of open principal.
    pub fn open_principal(&self) -> u128 {
        self.records.values().map(|r| u128::from(r.principal)).sum()
    }

    /// Check the cross-entity invariants against the ledger.
    ///
    /// - `total_principal` equals the sum of open principal.
    /// - `open_deposits` equals the number of records.
    /// - Each custody account holds exactly its record's principal.
    pub fn check_invariants<L: TokenLedger>(&self, ledger: &L) -> Result<(), InvariantViolation> {
        let Some(registry) = &self.registry else {
            if self.records.is_empty() {
                return Ok(());
            }
            return Err(InvariantViolation::OrphanRecords);
        };

        let sum = self.open_principal();
        if u128::from(registry.total_principal) != sum {
            return Err(InvariantViolation::PrincipalMismatch {
                recorded: registry.total_principal,
                sum,
            });
        }
        if usize::try_from(registry.open_deposits).ok() != Some(self.records.len()) {
            return Err(InvariantViolation::OpenDepositsMismatch {
                recorded: registry.open_deposits,
                actual: self.records.len(),
            });
        }
        for record in self.records.values() {
            let balance = ledger.balance(&record.custody).unwrap_or(0);
            if balance != record.principal {
                return Err(InvariantViolation::CustodyMismatch {
                    depositor: record.depositor,
                    principal: record.principal,
                    balance,
                });
            }
        }
        Ok(())
    }
}
