// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Vault Runtime
//!
//! Wraps the pure processor with whole-or-nothing execution:
//!
//! 1. Checkpoint the ledger.
//! 2. Run [`process`] against the current state.
//! 3. On success, swap in the returned state. On failure, roll the ledger
//!    back to the checkpoint and keep the old state.
//!
//! Exclusive access is `&mut self`. Instructions are applied one at a time,
//! in the order they are submitted, so no two ever interleave.

use genesys_protocol::crypto::keys::Pubkey;
use genesys_protocol::ledger::{Clock, TokenLedger};
use tracing::{info, warn};

use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::instruction::SignedInstruction;
use crate::processor::process;
use crate::state::{UserDepositRecord, VaultRegistry, VaultState};

/// A vault bound to a ledger and a clock.
#[derive(Debug)]
pub struct Vault<L: TokenLedger, C: Clock> {
    program_id: Pubkey,
    state: VaultState,
    ledger: L,
    clock: C,
}

impl<L: TokenLedger, C: Clock> Vault<L, C> {
    /// A fresh, uninitialized vault.
    pub fn new(program_id: Pubkey, ledger: L, clock: C) -> Self {
        Self::from_parts(program_id, VaultState::new(), ledger, clock)
    }

    /// Resume a vault from previously persisted state.
    pub fn from_parts(program_id: Pubkey, state: VaultState, ledger: L, clock: C) -> Self {
        Self {
            program_id,
            state,
            ledger,
            clock,
        }
    }

    /// Execute one instruction atomically.
    pub fn execute(&mut self, ix: &SignedInstruction) -> Result<VaultEvent, VaultError> {
        let checkpoint = self.ledger.checkpoint();
        match process(&self.program_id, &self.state, &mut self.ledger, &self.clock, ix) {
            Ok((next, event)) => {
                self.state = next;
                info!(
                    instruction = ix.instruction.name(),
                    signer = %ix.signer,
                    %event,
                    "instruction committed"
                );
                Ok(event)
            }
            Err(err) => {
                self.ledger.rollback(checkpoint);
                warn!(
                    instruction = ix.instruction.name(),
                    signer = %ix.signer,
                    error = %err,
                    "instruction rejected"
                );
                Err(err)
            }
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn state(&self) -> &VaultState {
        &self.state
    }

    pub fn registry(&self) -> Option<&VaultRegistry> {
        self.state.registry.as_ref()
    }

    /// The open deposit of `depositor`, if any.
    pub fn deposit_of(&self, depositor: &Pubkey) -> Option<&UserDepositRecord> {
        self.state.record_of(depositor)
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access for funding and test setup. Bypasses the vault.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Current reserve balance, or `None` before Initialize.
    pub fn reserve_balance(&self) -> Option<u64> {
        let registry = self.registry()?;
        self.ledger.balance(&registry.reserve).ok()
    }

    pub fn into_parts(self) -> (VaultState, L, C) {
        (self.state, self.ledger, self.clock)
    }
}
