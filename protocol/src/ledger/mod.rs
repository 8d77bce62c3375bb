// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Boundary
//!
//! The vault does not move tokens itself. It asks a ledger to: "transfer N
//! units of asset X from account A to account B, authorised by S". This
//! module defines that capability ([`TokenLedger`]), the ledger clock
//! ([`Clock`]), and the error taxonomy a transfer can fail with.
//!
//! ## Atomicity
//!
//! A vault instruction touches several accounts. The ledger must let the
//! caller treat those touches as one unit: [`TokenLedger::checkpoint`]
//! captures the state, [`TokenLedger::rollback`] restores it. The vault
//! runtime checkpoints before every instruction and rolls back on any
//! failure, so a half-applied instruction is never observable.
//!
//! ```text
//! clock.rs   Clock trait, wall clock, and a manually-driven test clock
//! memory.rs  InMemoryLedger: reference ledger for tests and the simulator
//! ```

pub mod clock;
pub mod memory;

pub use clock::{Clock, ManualClock, SystemClock, UnixTimestamp};
pub use memory::InMemoryLedger;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::keys::Pubkey;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a ledger operation was refused. Nothing is applied when these occur.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The asset (mint) does not exist on this ledger.
    #[error("unknown asset {0}")]
    UnknownAsset(Pubkey),

    /// No token account exists at this address.
    #[error("token account {0} not found")]
    AccountNotFound(Pubkey),

    /// A token account already exists at this address.
    #[error("token account {0} already exists")]
    AccountExists(Pubkey),

    /// The account holds a different asset than the operation names.
    #[error("account {account} holds asset {found}, expected {expected}")]
    AssetMismatch {
        account: Pubkey,
        expected: Pubkey,
        found: Pubkey,
    },

    /// The supplied authority does not control the account.
    #[error("{authority} is not the authority of account {account}")]
    AuthorityMismatch { account: Pubkey, authority: Pubkey },

    /// Not enough tokens in the source account.
    #[error("insufficient balance in {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        account: Pubkey,
        available: u64,
        requested: u64,
    },

    /// The account is frozen and cannot send or receive.
    #[error("account {0} is frozen")]
    AccountFrozen(Pubkey),

    /// Closing an account that still holds tokens.
    #[error("account {account} still holds {balance} units")]
    NonZeroBalance { account: Pubkey, balance: u64 },

    /// A credit would overflow `u64`.
    #[error("balance overflow on {0}")]
    Overflow(Pubkey),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A token account: a balance of one asset, controlled by one authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    /// The account's own address.
    pub address: Pubkey,
    /// The asset this account holds.
    pub asset: Pubkey,
    /// Who may debit this account. For custody accounts, a derived address.
    pub authority: Pubkey,
    /// Balance in the asset's smallest unit.
    pub balance: u64,
    /// Frozen accounts can neither send nor receive.
    pub frozen: bool,
}

// ---------------------------------------------------------------------------
// TokenLedger
// ---------------------------------------------------------------------------

/// The fungible-token capability the vault calls into.
///
/// Implementations must validate every operation fully before applying it:
/// an `Err` means nothing changed.
pub trait TokenLedger {
    /// Opaque saved state for [`rollback`](Self::rollback).
    type Checkpoint;

    /// Balance of a token account.
    fn balance(&self, account: &Pubkey) -> Result<u64, TransferError>;

    /// A copy of the token account at `address`, if one exists.
    fn account(&self, address: &Pubkey) -> Option<TokenAccount>;

    /// Open an empty token account for `asset` controlled by `authority`.
    fn open_account(
        &mut self,
        address: Pubkey,
        asset: Pubkey,
        authority: Pubkey,
    ) -> Result<(), TransferError>;

    /// Close an empty account. Only its authority may close it.
    fn close_account(&mut self, address: &Pubkey, authority: &Pubkey) -> Result<(), TransferError>;

    /// Move `amount` of `asset` from `from` to `to`, authorised by `authority`.
    fn transfer(
        &mut self,
        asset: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
        authority: &Pubkey,
    ) -> Result<(), TransferError>;

    /// Capture the current state.
    fn checkpoint(&self) -> Self::Checkpoint;

    /// Restore a state captured by [`checkpoint`](Self::checkpoint).
    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}
