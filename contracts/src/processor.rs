// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Vault Processor
//!
//! The state machine. [`process`] takes the current state by reference and
//! returns the next state; it never mutates vault state in place. Ledger
//! effects happen through the [`TokenLedger`] capability, and every
//! precondition is checked before the first ledger call. The runtime in
//! [`crate::vault`] still checkpoints the ledger around each call, so a
//! failure halfway through the effects leaves nothing behind.
//!
//! Per depositor:
//!
//! ```text
//! NoDeposit --Deposit--> Locked --(clock >= unlocks_at)--> Withdrawable --Withdraw--> NoDeposit
//! ```
//!
//! Locked vs Withdrawable is not stored anywhere. It is read off the clock at
//! Withdraw time.

use genesys_protocol::crypto::keys::Pubkey;
use genesys_protocol::ledger::{Clock, TokenLedger};
use tracing::debug;

use crate::accounts::{DepositorAddresses, VaultAddresses};
use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::instruction::{SignedInstruction, VaultInstruction};
use crate::state::{UserDepositRecord, VaultConfig, VaultRegistry, VaultState};
use crate::yield_index;

/// Apply one signed instruction.
///
/// Returns the next state and the event describing what happened. On `Err`
/// the input state is untouched; ledger effects may need rolling back.
pub fn process<L, C>(
    program_id: &Pubkey,
    state: &VaultState,
    ledger: &mut L,
    clock: &C,
    ix: &SignedInstruction,
) -> Result<(VaultState, VaultEvent), VaultError>
where
    L: TokenLedger,
    C: Clock,
{
    ix.verify(program_id)?;
    let expected = state.next_nonce(&ix.signer);
    if ix.nonce != expected {
        return Err(VaultError::StaleNonce {
            signer: ix.signer,
            expected,
            provided: ix.nonce,
        });
    }

    let (mut next, event) = match &ix.instruction {
        VaultInstruction::Initialize {
            asset,
            reserve_bump,
            registry_bump,
            config,
        } => initialize(
            program_id,
            state,
            ledger,
            clock,
            &ix.signer,
            asset,
            *registry_bump,
            *reserve_bump,
            config,
        ),
        VaultInstruction::RefreshReserve {
            registry_bump,
            reserve_bump,
        } => refresh_reserve(program_id, state, ledger, &ix.signer, *registry_bump, *reserve_bump),
        VaultInstruction::Deposit {
            registry_bump,
            reserve_bump,
            record_bump,
            custody_bump,
            lock_duration_secs,
            amount,
            source,
        } => deposit(
            program_id,
            state,
            ledger,
            clock,
            &ix.signer,
            Bumps {
                registry: *registry_bump,
                reserve: *reserve_bump,
                record: *record_bump,
                custody: *custody_bump,
            },
            *lock_duration_secs,
            *amount,
            source,
        ),
        VaultInstruction::Withdraw {
            registry_bump,
            reserve_bump,
            record_bump,
            custody_bump,
            destination,
        } => withdraw(
            program_id,
            state,
            ledger,
            clock,
            &ix.signer,
            Bumps {
                registry: *registry_bump,
                reserve: *reserve_bump,
                record: *record_bump,
                custody: *custody_bump,
            },
            destination,
        ),
    }?;

    let nonce = expected.checked_add(1).ok_or(VaultError::ArithmeticOverflow)?;
    next.nonces.insert(ix.signer, nonce);
    Ok((next, event))
}

/// Caller-supplied bumps for a depositor instruction.
#[derive(Debug, Clone, Copy)]
struct Bumps {
    registry: u8,
    reserve: u8,
    record: u8,
    custody: u8,
}

// ---------------------------------------------------------------------------
// Initialize
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn initialize<L: TokenLedger, C: Clock>(
    program_id: &Pubkey,
    state: &VaultState,
    ledger: &mut L,
    clock: &C,
    admin: &Pubkey,
    asset: &Pubkey,
    registry_bump: u8,
    reserve_bump: u8,
    config: &VaultConfig,
) -> Result<(VaultState, VaultEvent), VaultError> {
    if state.is_initialized() {
        return Err(VaultError::AlreadyInitialized);
    }
    if config.max_deposit == Some(0) {
        return Err(VaultError::InvalidAmount);
    }
    if config.max_lock_duration == Some(0) {
        return Err(VaultError::InvalidDuration);
    }

    let addrs = VaultAddresses::derive(program_id)?;
    let registry_address = addrs.registry.check_bump(registry_bump)?;
    let reserve_address = addrs.reserve.check_bump(reserve_bump)?;

    // The reserve is controlled by the registry address, which has no key.
    ledger.open_account(reserve_address, *asset, registry_address)?;

    let registry = VaultRegistry {
        admin: *admin,
        asset: *asset,
        address: registry_address,
        reserve: reserve_address,
        registry_bump,
        reserve_bump,
        yield_index: 0,
        total_principal: 0,
        yield_liability: 0,
        open_deposits: 0,
        total_yield_paid: 0,
        config: *config,
        initialized_at: clock.unix_timestamp(),
    };

    let next = VaultState {
        registry: Some(registry),
        records: state.records.clone(),
        nonces: state.nonces.clone(),
    };
    let event = VaultEvent::Initialized {
        admin: *admin,
        asset: *asset,
        registry: registry_address,
        reserve: reserve_address,
    };
    Ok((next, event))
}

// ---------------------------------------------------------------------------
// Refresh Reserve
// ---------------------------------------------------------------------------

fn refresh_reserve<L: TokenLedger>(
    program_id: &Pubkey,
    state: &VaultState,
    ledger: &mut L,
    signer: &Pubkey,
    registry_bump: u8,
    reserve_bump: u8,
) -> Result<(VaultState, VaultEvent), VaultError> {
    let registry = state.registry.as_ref().ok_or(VaultError::NotInitialized)?;
    if *signer != registry.admin {
        return Err(VaultError::Unauthorized { signer: *signer });
    }
    check_singletons(program_id, registry, registry_bump, reserve_bump)?;

    let reserve_balance = ledger.balance(&registry.reserve)?;
    let mut next_registry = registry.clone();
    let (surplus, index_delta) = attribute_surplus(&mut next_registry, reserve_balance)?;
    if index_delta == 0 {
        debug!(
            reserve_balance,
            surplus,
            total_principal = registry.total_principal,
            "refresh is a no-op"
        );
    }

    let event = VaultEvent::ReserveRefreshed {
        reserve_balance,
        surplus,
        index_delta,
        yield_index: next_registry.yield_index,
    };
    let next = VaultState {
        registry: Some(next_registry),
        records: state.records.clone(),
        nonces: state.nonces.clone(),
    };
    Ok((next, event))
}

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn deposit<L: TokenLedger, C: Clock>(
    program_id: &Pubkey,
    state: &VaultState,
    ledger: &mut L,
    clock: &C,
    depositor: &Pubkey,
    bumps: Bumps,
    lock_duration: u64,
    amount: u64,
    source: &Pubkey,
) -> Result<(VaultState, VaultEvent), VaultError> {
    let registry = state.registry.as_ref().ok_or(VaultError::NotInitialized)?;

    if amount == 0 {
        return Err(VaultError::InvalidAmount);
    }
    if lock_duration == 0 {
        return Err(VaultError::InvalidDuration);
    }
    if let Some(max) = registry.config.max_deposit {
        if amount > max {
            return Err(VaultError::DepositLimitExceeded { amount, max });
        }
    }
    if let Some(max) = registry.config.max_lock_duration {
        if lock_duration > max {
            return Err(VaultError::LockTooLong {
                duration: lock_duration,
                max,
            });
        }
    }

    check_singletons(program_id, registry, bumps.registry, bumps.reserve)?;
    let user = DepositorAddresses::derive(program_id, depositor)?;
    let record_address = user.record.check_bump(bumps.record)?;
    let custody_address = user.custody.check_bump(bumps.custody)?;

    if state.records.contains_key(&record_address) {
        return Err(VaultError::DepositAlreadyOpen {
            depositor: *depositor,
        });
    }

    let reserve_balance = ledger.balance(&registry.reserve)?;
    let available = ledger.balance(source)?;
    if available < amount {
        return Err(VaultError::InsufficientFunds {
            account: *source,
            available,
            requested: amount,
        });
    }

    let now = clock.unix_timestamp();
    let unlocks_at = i64::try_from(lock_duration)
        .ok()
        .and_then(|d| now.checked_add(d))
        .ok_or(VaultError::ArithmeticOverflow)?;

    let mut next_registry = registry.clone();
    next_registry.total_principal = registry
        .total_principal
        .checked_add(amount)
        .ok_or(VaultError::ArithmeticOverflow)?;
    next_registry.open_deposits = registry
        .open_deposits
        .checked_add(1)
        .ok_or(VaultError::ArithmeticOverflow)?;

    // Surplus that reached the reserve since the last refresh is spread over
    // the principal including this deposit. The snapshot is taken before it,
    // so the new depositor shares in it.
    let (_, index_delta) = attribute_surplus(&mut next_registry, reserve_balance)?;

    // Effects. The custody account is controlled by the registry address.
    ledger.open_account(custody_address, registry.asset, registry.address)?;
    ledger.transfer(&registry.asset, source, &custody_address, amount, depositor)?;

    let record = UserDepositRecord {
        depositor: *depositor,
        custody: custody_address,
        principal: amount,
        lock_duration,
        deposited_at: now,
        index_snapshot: registry.yield_index,
        record_bump: bumps.record,
        custody_bump: bumps.custody,
    };

    let mut records = state.records.clone();
    records.insert(record_address, record);

    let event = VaultEvent::Deposited {
        depositor: *depositor,
        amount,
        lock_duration,
        unlocks_at,
        index_snapshot: registry.yield_index,
        index_delta,
    };
    let next = VaultState {
        registry: Some(next_registry),
        records,
        nonces: state.nonces.clone(),
    };
    Ok((next, event))
}

// ---------------------------------------------------------------------------
// Withdraw
// ---------------------------------------------------------------------------

fn withdraw<L: TokenLedger, C: Clock>(
    program_id: &Pubkey,
    state: &VaultState,
    ledger: &mut L,
    clock: &C,
    depositor: &Pubkey,
    bumps: Bumps,
    destination: &Pubkey,
) -> Result<(VaultState, VaultEvent), VaultError> {
    let registry = state.registry.as_ref().ok_or(VaultError::NotInitialized)?;
    check_singletons(program_id, registry, bumps.registry, bumps.reserve)?;

    let user = DepositorAddresses::derive(program_id, depositor)?;
    let record_address = user.record.check_bump(bumps.record)?;
    let custody_address = user.custody.check_bump(bumps.custody)?;

    let record = state
        .records
        .get(&record_address)
        .ok_or(VaultError::NoOpenDeposit {
            depositor: *depositor,
        })?;

    let now = clock.unix_timestamp();
    if !record.is_withdrawable(now) {
        return Err(VaultError::LockNotExpired {
            unlocks_at: record.unlocks_at(),
            now,
        });
    }

    let owed_scaled =
        yield_index::accrued_scaled(record.principal, registry.yield_index, record.index_snapshot)?;
    let yield_owed =
        yield_index::yield_owed(record.principal, registry.yield_index, record.index_snapshot)?;

    let reserve_balance = ledger.balance(&registry.reserve)?;
    if reserve_balance < yield_owed {
        return Err(VaultError::InsufficientReserve {
            available: reserve_balance,
            owed: yield_owed,
        });
    }

    let mut next_registry = registry.clone();
    next_registry.total_principal = registry
        .total_principal
        .checked_sub(record.principal)
        .ok_or(VaultError::ArithmeticOverflow)?;
    next_registry.yield_liability = registry
        .yield_liability
        .checked_sub(owed_scaled)
        .ok_or(VaultError::ArithmeticOverflow)?;
    next_registry.open_deposits = registry
        .open_deposits
        .checked_sub(1)
        .ok_or(VaultError::ArithmeticOverflow)?;
    next_registry.total_yield_paid = registry
        .total_yield_paid
        .checked_add(yield_owed)
        .ok_or(VaultError::ArithmeticOverflow)?;

    // Effects.
    ledger.transfer(
        &registry.asset,
        &custody_address,
        destination,
        record.principal,
        &registry.address,
    )?;
    if yield_owed > 0 {
        ledger.transfer(
            &registry.asset,
            &registry.reserve,
            destination,
            yield_owed,
            &registry.address,
        )?;
    }
    ledger.close_account(&custody_address, &registry.address)?;

    let event = VaultEvent::Withdrawn {
        depositor: *depositor,
        destination: *destination,
        principal: record.principal,
        yield_paid: yield_owed,
    };

    let mut records = state.records.clone();
    records.remove(&record_address);

    let next = VaultState {
        registry: Some(next_registry),
        records,
        nonces: state.nonces.clone(),
    };
    Ok((next, event))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Spread the reserve surplus over `registry.total_principal`, raising the
/// index and the liability together. Returns `(surplus, index_delta)`;
/// the delta is zero when nothing could be attributed.
fn attribute_surplus(
    registry: &mut VaultRegistry,
    reserve_balance: u64,
) -> Result<(u64, u128), VaultError> {
    let surplus = yield_index::reserve_surplus(
        reserve_balance,
        registry.total_principal,
        registry.yield_liability,
    );
    let Some(accrual) = yield_index::accrue(surplus, registry.total_principal) else {
        return Ok((surplus, 0));
    };
    registry.yield_index = registry
        .yield_index
        .checked_add(accrual.index_delta)
        .ok_or(VaultError::ArithmeticOverflow)?;
    registry.yield_liability = registry
        .yield_liability
        .checked_add(accrual.attributed_scaled)
        .ok_or(VaultError::ArithmeticOverflow)?;
    Ok((surplus, accrual.index_delta))
}

/// Re-derive the registry and reserve and compare against both the supplied
/// bumps and the bumps recorded at Initialize.
fn check_singletons(
    program_id: &Pubkey,
    registry: &VaultRegistry,
    registry_bump: u8,
    reserve_bump: u8,
) -> Result<(), VaultError> {
    let addrs = VaultAddresses::derive(program_id)?;
    let registry_address = addrs.registry.check_bump(registry_bump)?;
    let reserve_address = addrs.reserve.check_bump(reserve_bump)?;

    if registry_address != registry.address || registry_bump != registry.registry_bump {
        return Err(VaultError::AddressMismatch {
            account: addrs.registry.kind,
            expected: registry.registry_bump,
            provided: registry_bump,
        });
    }
    if reserve_address != registry.reserve || reserve_bump != registry.reserve_bump {
        return Err(VaultError::AddressMismatch {
            account: addrs.reserve.kind,
            expected: registry.reserve_bump,
            provided: reserve_bump,
        });
    }
    Ok(())
}
