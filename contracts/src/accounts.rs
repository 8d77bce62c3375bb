// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Vault Account Addresses
//!
//! The vault owns four kinds of accounts, all at derived addresses:
//!
//! | Kind           | Tag                 | Keyed by  |
//! |----------------|---------------------|-----------|
//! | Registry       | `vault-info`        | none      |
//! | Reserve        | `token-vault`       | none      |
//! | Deposit record | `user-deposit-info` | depositor |
//! | Custody        | `user-vault`        | depositor |
//!
//! Callers pass bumps, never addresses. The processor re-derives every
//! address and rejects any bump that isn't the canonical one.

use std::fmt;

use genesys_protocol::address::derive_address;
use genesys_protocol::config::{
    TOKEN_VAULT_SEED, USER_DEPOSIT_INFO_SEED, USER_VAULT_SEED, VAULT_INFO_SEED,
};
use genesys_protocol::crypto::keys::Pubkey;
use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Which vault account an address or bump refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Registry,
    Reserve,
    DepositRecord,
    Custody,
}

impl AccountKind {
    /// Namespace tag this kind derives from.
    pub fn tag(self) -> &'static str {
        match self {
            AccountKind::Registry => VAULT_INFO_SEED,
            AccountKind::Reserve => TOKEN_VAULT_SEED,
            AccountKind::DepositRecord => USER_DEPOSIT_INFO_SEED,
            AccountKind::Custody => USER_VAULT_SEED,
        }
    }

    /// Whether the derivation includes the depositor's identity.
    pub fn is_owner_keyed(self) -> bool {
        matches!(self, AccountKind::DepositRecord | AccountKind::Custody)
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Registry => write!(f, "registry"),
            AccountKind::Reserve => write!(f, "reserve"),
            AccountKind::DepositRecord => write!(f, "deposit record"),
            AccountKind::Custody => write!(f, "custody"),
        }
    }
}

/// A derived address with its canonical bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAccount {
    pub kind: AccountKind,
    pub address: Pubkey,
    pub bump: u8,
}

impl DerivedAccount {
    /// Derive the canonical address for `kind`. Owner-keyed kinds need `owner`.
    pub fn derive(
        kind: AccountKind,
        owner: Option<&Pubkey>,
        program_id: &Pubkey,
    ) -> Result<Self, VaultError> {
        let owner = if kind.is_owner_keyed() { owner } else { None };
        let (address, bump) = derive_address(kind.tag(), owner, program_id)
            .map_err(|e| VaultError::from_derive(kind.tag(), e))?;
        Ok(Self {
            kind,
            address,
            bump,
        })
    }

    /// Accept `provided` only if it is the canonical bump.
    pub fn check_bump(&self, provided: u8) -> Result<Pubkey, VaultError> {
        if provided != self.bump {
            return Err(VaultError::AddressMismatch {
                account: self.kind,
                expected: self.bump,
                provided,
            });
        }
        Ok(self.address)
    }
}

/// The vault's two singleton accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultAddresses {
    pub registry: DerivedAccount,
    pub reserve: DerivedAccount,
}

impl VaultAddresses {
    pub fn derive(program_id: &Pubkey) -> Result<Self, VaultError> {
        Ok(Self {
            registry: DerivedAccount::derive(AccountKind::Registry, None, program_id)?,
            reserve: DerivedAccount::derive(AccountKind::Reserve, None, program_id)?,
        })
    }
}

/// One depositor's record and custody accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositorAddresses {
    pub record: DerivedAccount,
    pub custody: DerivedAccount,
}

impl DepositorAddresses {
    pub fn derive(program_id: &Pubkey, depositor: &Pubkey) -> Result<Self, VaultError> {
        Ok(Self {
            record: DerivedAccount::derive(AccountKind::DepositRecord, Some(depositor), program_id)?,
            custody: DerivedAccount::derive(AccountKind::Custody, Some(depositor), program_id)?,
        })
    }
}
