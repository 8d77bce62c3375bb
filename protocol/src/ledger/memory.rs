// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # In-Memory Ledger
//!
//! A complete, deterministic token ledger living in two `BTreeMap`s. It's
//! what the tests and the local node run against. Every mutating call
//! validates everything first and only then writes, so a returned `Err`
//! never leaves a partial update behind.
//!
//! Beyond the [`TokenLedger`] capability the vault needs, this ledger also
//! exposes the administrative knobs a real token program has: creating an
//! asset, minting, burning, and freezing accounts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{TokenAccount, TokenLedger, TransferError};
use crate::crypto::keys::Pubkey;

/// An asset definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    /// Who may mint new units.
    pub authority: Pubkey,
    /// Units currently in existence.
    pub supply: u64,
    /// Display precision. Purely informational.
    pub decimals: u8,
}

/// Saved state for [`InMemoryLedger::rollback`].
#[derive(Debug, Clone)]
pub struct LedgerCheckpoint {
    mints: BTreeMap<Pubkey, Mint>,
    accounts: BTreeMap<Pubkey, TokenAccount>,
}

/// Reference [`TokenLedger`] implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryLedger {
    mints: BTreeMap<Pubkey, Mint>,
    accounts: BTreeMap<Pubkey, TokenAccount>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Asset administration
    // -----------------------------------------------------------------------

    /// Register a new asset.
    pub fn create_mint(
        &mut self,
        mint: Pubkey,
        authority: Pubkey,
        decimals: u8,
    ) -> Result<(), TransferError> {
        if self.mints.contains_key(&mint) {
            return Err(TransferError::AccountExists(mint));
        }
        self.mints.insert(
            mint,
            Mint {
                authority,
                supply: 0,
                decimals,
            },
        );
        Ok(())
    }

    /// Look up an asset.
    pub fn mint(&self, mint: &Pubkey) -> Option<&Mint> {
        self.mints.get(mint)
    }

    /// Create `amount` new units into `account`. Only the mint authority may.
    pub fn mint_to(
        &mut self,
        asset: &Pubkey,
        account: &Pubkey,
        amount: u64,
        authority: &Pubkey,
    ) -> Result<(), TransferError> {
        let mint = self
            .mints
            .get(asset)
            .ok_or(TransferError::UnknownAsset(*asset))?;
        if mint.authority != *authority {
            return Err(TransferError::AuthorityMismatch {
                account: *asset,
                authority: *authority,
            });
        }
        let target = self.checked_account(account, asset)?;
        let new_supply = mint
            .supply
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*asset))?;
        let new_balance = target
            .balance
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*account))?;

        if let Some(mint) = self.mints.get_mut(asset) {
            mint.supply = new_supply;
        }
        if let Some(target) = self.accounts.get_mut(account) {
            target.balance = new_balance;
        }
        trace!(asset = %asset, account = %account, amount, "minted");
        Ok(())
    }

    /// Destroy `amount` units held in `account`. The account's authority signs.
    pub fn burn(
        &mut self,
        account: &Pubkey,
        amount: u64,
        authority: &Pubkey,
    ) -> Result<(), TransferError> {
        let source = self
            .accounts
            .get(account)
            .ok_or(TransferError::AccountNotFound(*account))?;
        if source.authority != *authority {
            return Err(TransferError::AuthorityMismatch {
                account: *account,
                authority: *authority,
            });
        }
        if source.frozen {
            return Err(TransferError::AccountFrozen(*account));
        }
        if source.balance < amount {
            return Err(TransferError::InsufficientBalance {
                account: *account,
                available: source.balance,
                requested: amount,
            });
        }
        let asset = source.asset;

        if let Some(source) = self.accounts.get_mut(account) {
            source.balance -= amount;
        }
        if let Some(mint) = self.mints.get_mut(&asset) {
            mint.supply = mint.supply.saturating_sub(amount);
        }
        trace!(account = %account, amount, "burned");
        Ok(())
    }

    /// Freeze an account. Frozen accounts can't send or receive.
    pub fn freeze(&mut self, account: &Pubkey) -> Result<(), TransferError> {
        self.set_frozen(account, true)
    }

    /// Undo [`freeze`](Self::freeze).
    pub fn thaw(&mut self, account: &Pubkey) -> Result<(), TransferError> {
        self.set_frozen(account, false)
    }

    fn set_frozen(&mut self, account: &Pubkey, frozen: bool) -> Result<(), TransferError> {
        let acct = self
            .accounts
            .get_mut(account)
            .ok_or(TransferError::AccountNotFound(*account))?;
        acct.frozen = frozen;
        Ok(())
    }

    /// All accounts, ordered by address.
    pub fn accounts(&self) -> impl Iterator<Item = &TokenAccount> {
        self.accounts.values()
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Fetch an account and check that it holds `asset` and isn't frozen.
    fn checked_account(
        &self,
        address: &Pubkey,
        asset: &Pubkey,
    ) -> Result<&TokenAccount, TransferError> {
        let acct = self
            .accounts
            .get(address)
            .ok_or(TransferError::AccountNotFound(*address))?;
        if acct.asset != *asset {
            return Err(TransferError::AssetMismatch {
                account: *address,
                expected: *asset,
                found: acct.asset,
            });
        }
        if acct.frozen {
            return Err(TransferError::AccountFrozen(*address));
        }
        Ok(acct)
    }
}

impl TokenLedger for InMemoryLedger {
    type Checkpoint = LedgerCheckpoint;

    fn balance(&self, account: &Pubkey) -> Result<u64, TransferError> {
        self.accounts
            .get(account)
            .map(|a| a.balance)
            .ok_or(TransferError::AccountNotFound(*account))
    }

    fn account(&self, address: &Pubkey) -> Option<TokenAccount> {
        self.accounts.get(address).cloned()
    }

    fn open_account(
        &mut self,
        address: Pubkey,
        asset: Pubkey,
        authority: Pubkey,
    ) -> Result<(), TransferError> {
        if !self.mints.contains_key(&asset) {
            return Err(TransferError::UnknownAsset(asset));
        }
        if self.accounts.contains_key(&address) {
            return Err(TransferError::AccountExists(address));
        }
        self.accounts.insert(
            address,
            TokenAccount {
                address,
                asset,
                authority,
                balance: 0,
                frozen: false,
            },
        );
        trace!(account = %address, asset = %asset, "opened token account");
        Ok(())
    }

    fn close_account(&mut self, address: &Pubkey, authority: &Pubkey) -> Result<(), TransferError> {
        let acct = self
            .accounts
            .get(address)
            .ok_or(TransferError::AccountNotFound(*address))?;
        if acct.authority != *authority {
            return Err(TransferError::AuthorityMismatch {
                account: *address,
                authority: *authority,
            });
        }
        if acct.balance != 0 {
            return Err(TransferError::NonZeroBalance {
                account: *address,
                balance: acct.balance,
            });
        }
        self.accounts.remove(address);
        trace!(account = %address, "closed token account");
        Ok(())
    }

    fn transfer(
        &mut self,
        asset: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
        authority: &Pubkey,
    ) -> Result<(), TransferError> {
        if !self.mints.contains_key(asset) {
            return Err(TransferError::UnknownAsset(*asset));
        }
        let source = self.checked_account(from, asset)?;
        if source.authority != *authority {
            return Err(TransferError::AuthorityMismatch {
                account: *from,
                authority: *authority,
            });
        }
        if source.balance < amount {
            return Err(TransferError::InsufficientBalance {
                account: *from,
                available: source.balance,
                requested: amount,
            });
        }
        let dest = self.checked_account(to, asset)?;

        // Self-transfer: validated, nothing to move.
        if from == to {
            return Ok(());
        }
        let new_dest = dest
            .balance
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*to))?;

        if let Some(source) = self.accounts.get_mut(from) {
            source.balance -= amount;
        }
        if let Some(dest) = self.accounts.get_mut(to) {
            dest.balance = new_dest;
        }
        trace!(asset = %asset, from = %from, to = %to, amount, "transfer");
        Ok(())
    }

    fn checkpoint(&self) -> LedgerCheckpoint {
        LedgerCheckpoint {
            mints: self.mints.clone(),
            accounts: self.accounts.clone(),
        }
    }

    fn rollback(&mut self, checkpoint: LedgerCheckpoint) {
        self.mints = checkpoint.mints;
        self.accounts = checkpoint.accounts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    struct Fixture {
        ledger: InMemoryLedger,
        asset: Pubkey,
        mint_authority: Pubkey,
        alice: Pubkey,
        bob: Pubkey,
        alice_acct: Pubkey,
        bob_acct: Pubkey,
    }

    fn fixture() -> Fixture {
        let mut ledger = InMemoryLedger::new();
        let asset = Keypair::from_seed(&[1; 32]).pubkey();
        let mint_authority = Keypair::from_seed(&[2; 32]).pubkey();
        let alice = Keypair::from_seed(&[3; 32]).pubkey();
        let bob = Keypair::from_seed(&[4; 32]).pubkey();
        let alice_acct = Keypair::from_seed(&[5; 32]).pubkey();
        let bob_acct = Keypair::from_seed(&[6; 32]).pubkey();

        ledger.create_mint(asset, mint_authority, 6).unwrap();
        ledger.open_account(alice_acct, asset, alice).unwrap();
        ledger.open_account(bob_acct, asset, bob).unwrap();
        ledger.mint_to(&asset, &alice_acct, 1_000, &mint_authority).unwrap();

        Fixture {
            ledger,
            asset,
            mint_authority,
            alice,
            bob,
            alice_acct,
            bob_acct,
        }
    }

    #[test]
    fn transfer_moves_balance() {
        let mut f = fixture();
        f.ledger
            .transfer(&f.asset, &f.alice_acct, &f.bob_acct, 400, &f.alice)
            .unwrap();
        assert_eq!(f.ledger.balance(&f.alice_acct).unwrap(), 600);
        assert_eq!(f.ledger.balance(&f.bob_acct).unwrap(), 400);
    }

    #[test]
    fn transfer_requires_authority() {
        let mut f = fixture();
        let err = f
            .ledger
            .transfer(&f.asset, &f.alice_acct, &f.bob_acct, 1, &f.bob)
            .unwrap_err();
        assert!(matches!(err, TransferError::AuthorityMismatch { .. }));
    }

    #[test]
    fn transfer_rejects_overdraft_without_side_effects() {
        let mut f = fixture();
        let before = f.ledger.clone();
        let err = f
            .ledger
            .transfer(&f.asset, &f.alice_acct, &f.bob_acct, 1_001, &f.alice)
            .unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientBalance {
                account: f.alice_acct,
                available: 1_000,
                requested: 1_001
            }
        );
        assert_eq!(f.ledger, before);
    }

    #[test]
    fn frozen_accounts_cannot_receive() {
        let mut f = fixture();
        f.ledger.freeze(&f.bob_acct).unwrap();
        let err = f
            .ledger
            .transfer(&f.asset, &f.alice_acct, &f.bob_acct, 1, &f.alice)
            .unwrap_err();
        assert_eq!(err, TransferError::AccountFrozen(f.bob_acct));

        f.ledger.thaw(&f.bob_acct).unwrap();
        f.ledger
            .transfer(&f.asset, &f.alice_acct, &f.bob_acct, 1, &f.alice)
            .unwrap();
    }

    #[test]
    fn asset_mismatch_is_rejected() {
        let mut f = fixture();
        let other = Keypair::from_seed(&[9; 32]).pubkey();
        f.ledger.create_mint(other, f.mint_authority, 0).unwrap();
        let err = f
            .ledger
            .transfer(&other, &f.alice_acct, &f.bob_acct, 1, &f.alice)
            .unwrap_err();
        assert!(matches!(err, TransferError::AssetMismatch { .. }));
    }

    #[test]
    fn close_requires_empty_account() {
        let mut f = fixture();
        let err = f.ledger.close_account(&f.alice_acct, &f.alice).unwrap_err();
        assert!(matches!(err, TransferError::NonZeroBalance { balance: 1_000, .. }));

        f.ledger.close_account(&f.bob_acct, &f.bob).unwrap();
        assert!(f.ledger.account(&f.bob_acct).is_none());
    }

    #[test]
    fn burn_reduces_supply() {
        let mut f = fixture();
        f.ledger.burn(&f.alice_acct, 250, &f.alice).unwrap();
        assert_eq!(f.ledger.balance(&f.alice_acct).unwrap(), 750);
        assert_eq!(f.ledger.mint(&f.asset).unwrap().supply, 750);
    }

    #[test]
    fn only_mint_authority_mints() {
        let mut f = fixture();
        let err = f
            .ledger
            .mint_to(&f.asset, &f.alice_acct, 1, &f.alice)
            .unwrap_err();
        assert!(matches!(err, TransferError::AuthorityMismatch { .. }));
    }

    #[test]
    fn rollback_restores_checkpoint() {
        let mut f = fixture();
        let cp = f.ledger.checkpoint();
        let before = f.ledger.clone();
        f.ledger
            .transfer(&f.asset, &f.alice_acct, &f.bob_acct, 500, &f.alice)
            .unwrap();
        f.ledger.close_account(&f.bob_acct, &f.bob).unwrap_err();
        f.ledger.rollback(cp);
        assert_eq!(f.ledger, before);
    }

    #[test]
    fn ledger_serializes() {
        let f = fixture();
        let json = serde_json::to_string(&f.ledger).unwrap();
        let back: InMemoryLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f.ledger);
    }
}
