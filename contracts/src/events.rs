// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Events emitted by committed instructions.

use std::fmt;

use genesys_protocol::crypto::keys::Pubkey;
use genesys_protocol::ledger::UnixTimestamp;
use serde::{Deserialize, Serialize};

/// What a successful instruction did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    Initialized {
        admin: Pubkey,
        asset: Pubkey,
        registry: Pubkey,
        reserve: Pubkey,
    },
    ReserveRefreshed {
        reserve_balance: u64,
        surplus: u64,
        /// Zero for a no-op refresh.
        index_delta: u128,
        yield_index: u128,
    },
    Deposited {
        depositor: Pubkey,
        amount: u64,
        lock_duration: u64,
        unlocks_at: UnixTimestamp,
        index_snapshot: u128,
        /// Unattributed surplus spread at deposit time, zero if none.
        index_delta: u128,
    },
    Withdrawn {
        depositor: Pubkey,
        destination: Pubkey,
        principal: u64,
        yield_paid: u64,
    },
}

impl fmt::Display for VaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultEvent::Initialized {
                admin,
                asset,
                reserve,
                ..
            } => write!(f, "vault initialized: admin {admin}, asset {asset}, reserve {reserve}"),
            VaultEvent::ReserveRefreshed {
                reserve_balance,
                surplus,
                index_delta,
                yield_index,
            } => write!(
                f,
                "reserve refreshed: balance {reserve_balance}, surplus {surplus}, index +{index_delta} -> {yield_index}"
            ),
            VaultEvent::Deposited {
                depositor,
                amount,
                unlocks_at,
                ..
            } => write!(f, "{depositor} deposited {amount}, unlocks at {unlocks_at}"),
            VaultEvent::Withdrawn {
                depositor,
                principal,
                yield_paid,
                ..
            } => write!(f, "{depositor} withdrew {principal} principal + {yield_paid} yield"),
        }
    }
}
