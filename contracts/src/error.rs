// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Error taxonomy for the vault program.
//!
//! Every precondition failure maps to exactly one variant so callers can
//! branch on it. None of these are retried internally; the runtime rolls the
//! ledger back and hands the error to the caller.

use genesys_protocol::address::DeriveError;
use genesys_protocol::crypto::keys::Pubkey;
use genesys_protocol::ledger::{TransferError, UnixTimestamp};
use thiserror::Error;

use crate::accounts::AccountKind;

/// Errors that can occur while processing a vault instruction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Initialize was called on a vault that already has a registry.
    #[error("vault is already initialized")]
    AlreadyInitialized,

    /// Any instruction other than Initialize before Initialize.
    #[error("vault is not initialized")]
    NotInitialized,

    /// Bad signature, or a non-admin signer on an admin instruction.
    #[error("signer {signer} is not authorized for this instruction")]
    Unauthorized {
        /// Identity that signed the envelope.
        signer: Pubkey,
    },

    /// The envelope's nonce is not the signer's next one: a replay, or an
    /// instruction signed against an older state.
    #[error("stale nonce from {signer}: expected {expected}, got {provided}")]
    StaleNonce {
        signer: Pubkey,
        expected: u64,
        provided: u64,
    },

    /// A supplied bump does not reproduce the canonical derived address.
    #[error("{account} address mismatch: canonical bump {expected}, supplied {provided}")]
    AddressMismatch {
        /// Which account failed the check.
        account: AccountKind,
        /// The canonical bump.
        expected: u8,
        /// The bump the caller supplied.
        provided: u8,
    },

    /// Deposit amount of zero.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Lock duration of zero.
    #[error("lock duration must be greater than zero")]
    InvalidDuration,

    /// The depositor already has an open deposit.
    #[error("depositor {depositor} already has an open deposit")]
    DepositAlreadyOpen { depositor: Pubkey },

    /// Withdraw without an open deposit.
    #[error("depositor {depositor} has no open deposit")]
    NoOpenDeposit { depositor: Pubkey },

    /// Withdraw before the lock has run out.
    #[error("deposit is locked until {unlocks_at}, now is {now}")]
    LockNotExpired {
        unlocks_at: UnixTimestamp,
        now: UnixTimestamp,
    },

    /// The depositor's source account can't cover the deposit.
    #[error("insufficient funds in {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: Pubkey,
        available: u64,
        requested: u64,
    },

    /// The reserve can't cover the yield a withdrawal is owed.
    #[error("reserve holds {available}, withdrawal is owed {owed} in yield")]
    InsufficientReserve { available: u64, owed: u64 },

    /// No bump in the search space yields an off-curve address.
    #[error("address derivation exhausted for tag {tag}")]
    DerivationExhausted { tag: &'static str },

    /// Malformed seeds. Unreachable with the built-in tags.
    #[error("address derivation failed: {0}")]
    Derivation(DeriveError),

    /// Deposit above the configured per-deposit cap.
    #[error("deposit of {amount} exceeds the limit of {max}")]
    DepositLimitExceeded { amount: u64, max: u64 },

    /// Lock duration above the configured cap.
    #[error("lock of {duration}s exceeds the limit of {max}s")]
    LockTooLong { duration: u64, max: u64 },

    /// A checked arithmetic step overflowed.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// The token ledger refused a transfer for a reason other than balance.
    #[error("token transfer failed: {0}")]
    Transfer(TransferError),

    /// The instruction envelope could not be encoded.
    #[error("instruction encoding failed: {0}")]
    Encoding(String),
}

impl From<TransferError> for VaultError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InsufficientBalance {
                account,
                available,
                requested,
            } => VaultError::InsufficientFunds {
                account,
                available,
                requested,
            },
            other => VaultError::Transfer(other),
        }
    }
}

impl From<bincode::Error> for VaultError {
    fn from(err: bincode::Error) -> Self {
        VaultError::Encoding(err.to_string())
    }
}

impl VaultError {
    /// Map a derivation failure for `tag` into the vault taxonomy.
    pub fn from_derive(tag: &'static str, err: DeriveError) -> Self {
        match err {
            DeriveError::Exhausted => VaultError::DerivationExhausted { tag },
            other => VaultError::Derivation(other),
        }
    }
}
