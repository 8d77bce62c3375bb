// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Client-side instruction builders.
//!
//! Callers never compute bumps by hand: the builders derive the canonical
//! ones for the signer, fill them in, and sign. The nonce comes from the
//! vault state the instruction is built against, so an instruction built
//! from a stale state is rejected rather than applied twice.

use genesys_protocol::crypto::keys::{Keypair, Pubkey};

use crate::accounts::{DepositorAddresses, VaultAddresses};
use crate::error::VaultError;
use crate::instruction::{SignedInstruction, VaultInstruction};
use crate::state::{VaultConfig, VaultState};

/// Builds signed instructions for one vault.
#[derive(Debug, Clone, Copy)]
pub struct VaultClient {
    program_id: Pubkey,
}

impl VaultClient {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Registry and reserve addresses for this vault.
    pub fn vault_addresses(&self) -> Result<VaultAddresses, VaultError> {
        VaultAddresses::derive(&self.program_id)
    }

    /// Record and custody addresses for `depositor`.
    pub fn depositor_addresses(&self, depositor: &Pubkey) -> Result<DepositorAddresses, VaultError> {
        DepositorAddresses::derive(&self.program_id, depositor)
    }

    pub fn initialize(
        &self,
        state: &VaultState,
        admin: &Keypair,
        asset: Pubkey,
        config: VaultConfig,
    ) -> Result<SignedInstruction, VaultError> {
        let vault = self.vault_addresses()?;
        self.sign(
            state,
            admin,
            VaultInstruction::Initialize {
                asset,
                reserve_bump: vault.reserve.bump,
                registry_bump: vault.registry.bump,
                config,
            },
        )
    }

    pub fn refresh_reserve(
        &self,
        state: &VaultState,
        admin: &Keypair,
    ) -> Result<SignedInstruction, VaultError> {
        let vault = self.vault_addresses()?;
        self.sign(
            state,
            admin,
            VaultInstruction::RefreshReserve {
                registry_bump: vault.registry.bump,
                reserve_bump: vault.reserve.bump,
            },
        )
    }

    pub fn deposit(
        &self,
        state: &VaultState,
        depositor: &Keypair,
        source: Pubkey,
        amount: u64,
        lock_duration_secs: u64,
    ) -> Result<SignedInstruction, VaultError> {
        let vault = self.vault_addresses()?;
        let user = self.depositor_addresses(&depositor.pubkey())?;
        self.sign(
            state,
            depositor,
            VaultInstruction::Deposit {
                registry_bump: vault.registry.bump,
                reserve_bump: vault.reserve.bump,
                record_bump: user.record.bump,
                custody_bump: user.custody.bump,
                lock_duration_secs,
                amount,
                source,
            },
        )
    }

    pub fn withdraw(
        &self,
        state: &VaultState,
        depositor: &Keypair,
        destination: Pubkey,
    ) -> Result<SignedInstruction, VaultError> {
        let vault = self.vault_addresses()?;
        let user = self.depositor_addresses(&depositor.pubkey())?;
        self.sign(
            state,
            depositor,
            VaultInstruction::Withdraw {
                registry_bump: vault.registry.bump,
                reserve_bump: vault.reserve.bump,
                record_bump: user.record.bump,
                custody_bump: user.custody.bump,
                destination,
            },
        )
    }

    /// Sign an arbitrary instruction with the signer's next nonce in `state`.
    pub fn sign(
        &self,
        state: &VaultState,
        signer: &Keypair,
        instruction: VaultInstruction,
    ) -> Result<SignedInstruction, VaultError> {
        let nonce = state.next_nonce(&signer.pubkey());
        SignedInstruction::sign(&self.program_id, signer, nonce, instruction)
    }
}
