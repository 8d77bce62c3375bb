// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Genesys Vault Program
//!
//! A custodial vault for time-locked deposits with admin-driven yield:
//!
//! - **Initialize**: the admin creates the registry and opens the reserve.
//! - **Refresh Reserve**: the admin spreads whatever the reserve holds
//!   beyond locked principal and already-promised yield across depositors,
//!   by raising a cumulative yield index. No funds move.
//! - **Deposit**: a depositor locks tokens in a per-depositor custody
//!   account for a fixed number of seconds.
//! - **Withdraw**: once the lock runs out, principal comes back from
//!   custody and the depositor's share of yield comes out of the reserve.
//!
//! ## Design Principles
//!
//! 1. All monetary operations are checked. `checked_add` and `checked_sub`
//!    everywhere; yield is computed in `u128` fixed point and rounded down.
//! 2. Addresses are re-derived on every instruction. Callers supply bumps;
//!    only canonical bumps are accepted.
//! 3. Signatures gate everything. The admin alone may refresh.
//! 4. Instructions are whole-or-nothing: the processor is pure over vault
//!    state and the runtime rolls the ledger back on any error.

pub mod accounts;
pub mod client;
pub mod error;
pub mod events;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod vault;
pub mod yield_index;

pub use client::VaultClient;
pub use error::VaultError;
pub use events::VaultEvent;
pub use instruction::{SignedInstruction, VaultInstruction};
pub use state::{UserDepositRecord, VaultConfig, VaultRegistry, VaultState};
pub use vault::Vault;
