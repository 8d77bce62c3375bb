//! Integration tests for reserve refresh and yield distribution.
//!
//! Covers the end-to-end deposit/withdraw scenario, surplus spread at
//! deposit time, proportional shares, idempotent refresh, reserve shortfalls, and a seeded random
//! operation sequence checked against the accounting invariants after every
//! step.

use genesys_contracts::{Vault, VaultClient, VaultConfig, VaultError, VaultEvent};
use genesys_protocol::config::YIELD_INDEX_SCALE;
use genesys_protocol::crypto::keys::{Keypair, Pubkey};
use genesys_protocol::ledger::{InMemoryLedger, ManualClock, TokenLedger};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const START: i64 = 1_700_000_000;

struct Setup {
    vault: Vault<InMemoryLedger, ManualClock>,
    client: VaultClient,
    admin: Keypair,
    asset: Pubkey,
}

/// Helper: initialized vault over a fresh ledger.
fn setup(config: VaultConfig) -> Setup {
    let program = Keypair::from_seed(&[90; 32]).pubkey();
    let admin = Keypair::from_seed(&[91; 32]);
    let asset = Keypair::from_seed(&[92; 32]).pubkey();

    let mut ledger = InMemoryLedger::new();
    ledger.create_mint(asset, admin.pubkey(), 0).unwrap();

    let client = VaultClient::new(program);
    let mut vault = Vault::new(program, ledger, ManualClock::new(START));
    vault
        .execute(&client.initialize(vault.state(), &admin, asset, config).unwrap())
        .unwrap();
    Setup {
        vault,
        client,
        admin,
        asset,
    }
}

/// Helper: a depositor with a funded token account.
fn depositor(s: &mut Setup, seed: u8, balance: u64) -> (Keypair, Pubkey) {
    let user = Keypair::from_seed(&[seed; 32]);
    let account = Keypair::from_seed(&[seed.wrapping_add(50); 32]).pubkey();
    let (asset, admin) = (s.asset, s.admin.pubkey());
    let ledger = s.vault.ledger_mut();
    ledger.open_account(account, asset, user.pubkey()).unwrap();
    ledger.mint_to(&asset, &account, balance, &admin).unwrap();
    (user, account)
}

fn fund_reserve(s: &mut Setup, amount: u64) {
    let reserve = s.vault.registry().unwrap().reserve;
    let (asset, admin) = (s.asset, s.admin.pubkey());
    s.vault
        .ledger_mut()
        .mint_to(&asset, &reserve, amount, &admin)
        .unwrap();
}

fn refresh(s: &mut Setup) -> VaultEvent {
    let ix = s.client.refresh_reserve(s.vault.state(), &s.admin).unwrap();
    s.vault.execute(&ix).unwrap()
}

fn balance(s: &Setup, account: &Pubkey) -> u64 {
    s.vault.ledger().balance(account).unwrap_or(0)
}

fn index(s: &Setup) -> u128 {
    s.vault.registry().unwrap().yield_index
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn end_to_end_with_surplus_pays_yield() {
    let mut s = setup(VaultConfig::default());
    fund_reserve(&mut s, 10_000_000);

    // No depositors yet: the refresh is a no-op.
    let event = refresh(&mut s);
    assert!(matches!(event, VaultEvent::ReserveRefreshed { index_delta: 0, .. }));
    assert_eq!(index(&s), 0);

    // Surplus = 10_000_000 - 100_000, spread over the incoming deposit.
    let (user, account) = depositor(&mut s, 1, 100_000);
    let event = s
        .vault
        .execute(&s.client.deposit(s.vault.state(), &user, account, 100_000, 3).unwrap())
        .unwrap();
    assert!(matches!(
        event,
        VaultEvent::Deposited {
            index_snapshot: 0,
            index_delta,
            ..
        } if index_delta == 99 * YIELD_INDEX_SCALE
    ));

    let err = s
        .vault
        .execute(&s.client.withdraw(s.vault.state(), &user, account).unwrap())
        .unwrap_err();
    assert!(matches!(err, VaultError::LockNotExpired { .. }));

    s.vault.clock_mut().advance(3);
    let event = s
        .vault
        .execute(&s.client.withdraw(s.vault.state(), &user, account).unwrap())
        .unwrap();
    assert!(matches!(event, VaultEvent::Withdrawn { yield_paid: 9_900_000, .. }));

    let paid = balance(&s, &account);
    assert!(paid > 100_000);
    assert_eq!(paid, 10_000_000);
    assert_eq!(s.vault.reserve_balance(), Some(100_000));
    assert_eq!(s.vault.registry().unwrap().yield_liability, 0);
    assert_eq!(s.vault.registry().unwrap().total_yield_paid, 9_900_000);
}

#[test]
fn funding_after_deposit_needs_a_refresh() {
    let mut s = setup(VaultConfig::default());
    let (user, account) = depositor(&mut s, 1, 100_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &user, account, 100_000, 3).unwrap())
        .unwrap();
    fund_reserve(&mut s, 10_000_000);
    assert_eq!(index(&s), 0);

    refresh(&mut s);
    assert_eq!(index(&s), 99 * YIELD_INDEX_SCALE);

    s.vault.clock_mut().advance(3);
    s.vault
        .execute(&s.client.withdraw(s.vault.state(), &user, account).unwrap())
        .unwrap();
    assert_eq!(balance(&s, &account), 10_000_000);
}

#[test]
fn surplus_before_a_deposit_goes_to_existing_and_new_principal() {
    let mut s = setup(VaultConfig::default());
    let (alice, alice_acct) = depositor(&mut s, 1, 100_000);
    let (bob, bob_acct) = depositor(&mut s, 2, 100_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &alice, alice_acct, 100_000, 5).unwrap())
        .unwrap();

    // Enough to back both principals plus 2_000 of surplus, not yet refreshed.
    fund_reserve(&mut s, 200_000 + 2_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &bob, bob_acct, 100_000, 5).unwrap())
        .unwrap();
    assert_eq!(index(&s), 2_000 * YIELD_INDEX_SCALE / 200_000);
    assert_eq!(s.vault.deposit_of(&bob.pubkey()).unwrap().index_snapshot, 0);

    s.vault.clock_mut().advance(5);
    for (user, acct) in [(&alice, alice_acct), (&bob, bob_acct)] {
        s.vault
            .execute(&s.client.withdraw(s.vault.state(), user, acct).unwrap())
            .unwrap();
    }
    assert_eq!(balance(&s, &alice_acct), 101_000);
    assert_eq!(balance(&s, &bob_acct), 101_000);
}

#[test]
fn end_to_end_without_surplus_returns_principal_exactly() {
    let mut s = setup(VaultConfig::default());
    refresh(&mut s);

    let (user, account) = depositor(&mut s, 1, 100_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &user, account, 100_000, 3).unwrap())
        .unwrap();
    assert!(matches!(
        s.vault.execute(&s.client.withdraw(s.vault.state(), &user, account).unwrap()),
        Err(VaultError::LockNotExpired { .. })
    ));

    // Empty reserve: nothing to attribute.
    refresh(&mut s);
    assert_eq!(index(&s), 0);

    s.vault.clock_mut().advance(3);
    s.vault
        .execute(&s.client.withdraw(s.vault.state(), &user, account).unwrap())
        .unwrap();
    assert_eq!(balance(&s, &account), 100_000);
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

#[test]
fn refresh_never_moves_funds() {
    let mut s = setup(VaultConfig::default());
    let (user, account) = depositor(&mut s, 1, 50_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &user, account, 50_000, 10).unwrap())
        .unwrap();
    fund_reserve(&mut s, 80_000);

    let before = s.vault.ledger().clone();
    refresh(&mut s);
    assert_eq!(s.vault.ledger(), &before);
    assert!(index(&s) > 0);
}

#[test]
fn refresh_is_idempotent_at_zero_surplus() {
    let mut s = setup(VaultConfig::default());
    let (user, account) = depositor(&mut s, 1, 50_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &user, account, 50_000, 10).unwrap())
        .unwrap();
    fund_reserve(&mut s, 50_300);

    refresh(&mut s);
    let after_first = s.vault.registry().unwrap().clone();
    assert!(after_first.yield_index > 0);

    // The surplus is already attributed; further refreshes change nothing.
    for _ in 0..5 {
        let event = refresh(&mut s);
        assert!(matches!(
            event,
            VaultEvent::ReserveRefreshed {
                surplus: 0,
                index_delta: 0,
                ..
            }
        ));
        assert_eq!(s.vault.registry().unwrap(), &after_first);
    }
}

#[test]
fn refresh_with_reserve_below_principal_is_a_noop() {
    let mut s = setup(VaultConfig::default());
    let (user, account) = depositor(&mut s, 1, 50_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &user, account, 50_000, 10).unwrap())
        .unwrap();
    fund_reserve(&mut s, 10_000);

    let event = refresh(&mut s);
    assert!(matches!(
        event,
        VaultEvent::ReserveRefreshed {
            reserve_balance: 10_000,
            surplus: 0,
            index_delta: 0,
            ..
        }
    ));
    assert_eq!(index(&s), 0);
}

#[test]
fn later_funding_is_attributed_incrementally() {
    let mut s = setup(VaultConfig::default());
    let (user, account) = depositor(&mut s, 1, 100_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &user, account, 100_000, 10).unwrap())
        .unwrap();

    fund_reserve(&mut s, 100_000 + 1_000);
    refresh(&mut s);
    let first = index(&s);

    fund_reserve(&mut s, 500);
    refresh(&mut s);
    let second = index(&s);
    assert_eq!(second - first, 500 * YIELD_INDEX_SCALE / 100_000);

    s.vault.clock_mut().advance(10);
    s.vault
        .execute(&s.client.withdraw(s.vault.state(), &user, account).unwrap())
        .unwrap();
    assert_eq!(balance(&s, &account), 100_000 + 1_500);
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

#[test]
fn yield_is_proportional_to_principal() {
    let mut s = setup(VaultConfig::default());
    let (alice, alice_acct) = depositor(&mut s, 1, 100_000);
    let (bob, bob_acct) = depositor(&mut s, 2, 50_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &alice, alice_acct, 100_000, 5).unwrap())
        .unwrap();
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &bob, bob_acct, 50_000, 5).unwrap())
        .unwrap();

    fund_reserve(&mut s, 150_000 + 300);
    refresh(&mut s);

    s.vault.clock_mut().advance(5);
    s.vault
        .execute(&s.client.withdraw(s.vault.state(), &alice, alice_acct).unwrap())
        .unwrap();
    s.vault
        .execute(&s.client.withdraw(s.vault.state(), &bob, bob_acct).unwrap())
        .unwrap();

    assert_eq!(balance(&s, &alice_acct), 100_200);
    assert_eq!(balance(&s, &bob_acct), 50_100);
}

#[test]
fn late_depositor_earns_nothing_from_earlier_refresh() {
    let mut s = setup(VaultConfig::default());
    let (alice, alice_acct) = depositor(&mut s, 1, 100_000);
    let (bob, bob_acct) = depositor(&mut s, 2, 100_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &alice, alice_acct, 100_000, 5).unwrap())
        .unwrap();
    fund_reserve(&mut s, 100_000 + 1_000);
    refresh(&mut s);

    // Bob's snapshot is taken after the refresh.
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &bob, bob_acct, 100_000, 5).unwrap())
        .unwrap();
    assert_eq!(
        s.vault.deposit_of(&bob.pubkey()).unwrap().index_snapshot,
        index(&s)
    );

    s.vault.clock_mut().advance(5);
    s.vault
        .execute(&s.client.withdraw(s.vault.state(), &bob, bob_acct).unwrap())
        .unwrap();
    s.vault
        .execute(&s.client.withdraw(s.vault.state(), &alice, alice_acct).unwrap())
        .unwrap();
    assert_eq!(balance(&s, &bob_acct), 100_000);
    assert_eq!(balance(&s, &alice_acct), 101_000);
}

#[test]
fn rounding_never_overpays() {
    let mut s = setup(VaultConfig::default());
    let (a, a_acct) = depositor(&mut s, 1, 1);
    let (b, b_acct) = depositor(&mut s, 2, 1);
    let (c, c_acct) = depositor(&mut s, 3, 1);
    for (user, acct) in [(&a, a_acct), (&b, b_acct), (&c, c_acct)] {
        s.vault
            .execute(&s.client.deposit(s.vault.state(), user, acct, 1, 1).unwrap())
            .unwrap();
    }
    // 3 principal + 10 surplus: each unit of principal is owed 3.33...
    fund_reserve(&mut s, 13);
    refresh(&mut s);

    s.vault.clock_mut().advance(1);
    let mut paid = 0;
    for (user, acct) in [(&a, a_acct), (&b, b_acct), (&c, c_acct)] {
        let event = s
            .vault
            .execute(&s.client.withdraw(s.vault.state(), user, acct).unwrap())
            .unwrap();
        if let VaultEvent::Withdrawn { yield_paid, .. } = event {
            assert_eq!(yield_paid, 3);
            paid += yield_paid;
        }
    }
    assert!(paid <= 10);
    assert_eq!(s.vault.reserve_balance(), Some(13 - paid));
}

// ---------------------------------------------------------------------------
// Reserve shortfall
// ---------------------------------------------------------------------------

#[test]
fn insufficient_reserve_leaves_balances_unchanged() {
    let mut s = setup(VaultConfig::default());
    fund_reserve(&mut s, 10_000_000);
    let (user, account) = depositor(&mut s, 1, 100_000);
    s.vault
        .execute(&s.client.deposit(s.vault.state(), &user, account, 100_000, 3).unwrap())
        .unwrap();
    refresh(&mut s);

    // Drain the reserve out from under the vault.
    let registry = s.vault.registry().unwrap().clone();
    s.vault
        .ledger_mut()
        .burn(&registry.reserve, 9_950_000, &registry.address)
        .unwrap();

    s.vault.clock_mut().advance(3);
    let ledger_before = s.vault.ledger().clone();
    let state_before = s.vault.state().clone();

    let err = s
        .vault
        .execute(&s.client.withdraw(s.vault.state(), &user, account).unwrap())
        .unwrap_err();
    assert_eq!(
        err,
        VaultError::InsufficientReserve {
            available: 50_000,
            owed: 9_900_000
        }
    );
    assert_eq!(s.vault.ledger(), &ledger_before);
    assert_eq!(s.vault.state(), &state_before);
    assert_eq!(balance(&s, &account), 0);

    // Topping the reserve back up lets the withdrawal through.
    fund_reserve(&mut s, 9_850_000);
    s.vault
        .execute(&s.client.withdraw(s.vault.state(), &user, account).unwrap())
        .unwrap();
    assert_eq!(balance(&s, &account), 10_000_000);
}

// ---------------------------------------------------------------------------
// Randomized invariants
// ---------------------------------------------------------------------------

#[test]
fn random_operations_preserve_invariants() {
    let mut rng = StdRng::seed_from_u64(0x6e5e_5ea1);
    let mut s = setup(VaultConfig::unlimited());
    let users: Vec<(Keypair, Pubkey)> = (1..=6u8)
        .map(|seed| depositor(&mut s, seed, 1_000_000))
        .collect();

    let mut last_index = index(&s);
    for step in 0..400 {
        match rng.gen_range(0..5) {
            0 => {
                let (user, acct) = &users[rng.gen_range(0..users.len())];
                let amount = rng.gen_range(1..=100_000);
                let lock = rng.gen_range(1..=20);
                let ix = s.client.deposit(s.vault.state(), user, *acct, amount, lock).unwrap();
                match s.vault.execute(&ix) {
                    Ok(_)
                    | Err(VaultError::DepositAlreadyOpen { .. })
                    | Err(VaultError::InsufficientFunds { .. }) => {}
                    Err(other) => panic!("step {step}: unexpected deposit error {other}"),
                }
            }
            1 => {
                let (user, acct) = &users[rng.gen_range(0..users.len())];
                let ix = s.client.withdraw(s.vault.state(), user, *acct).unwrap();
                match s.vault.execute(&ix) {
                    Ok(_)
                    | Err(VaultError::NoOpenDeposit { .. })
                    | Err(VaultError::LockNotExpired { .. }) => {}
                    Err(other) => panic!("step {step}: unexpected withdraw error {other}"),
                }
            }
            2 => {
                refresh(&mut s);
            }
            3 => {
                let amount = rng.gen_range(0..50_000);
                fund_reserve(&mut s, amount);
            }
            _ => {
                let secs = rng.gen_range(0..8);
                s.vault.clock_mut().advance(secs);
            }
        }

        s.vault
            .state()
            .check_invariants(s.vault.ledger())
            .unwrap_or_else(|e| panic!("step {step}: {e}"));

        let registry = s.vault.registry().unwrap();
        assert!(registry.yield_index >= last_index, "step {step}: index decreased");
        last_index = registry.yield_index;

        // Everything promised is still in the reserve.
        let reserve = s.vault.reserve_balance().unwrap();
        assert!(
            u128::from(reserve) >= registry.liability_units(),
            "step {step}: reserve {reserve} below liability"
        );
        let owed: u128 = s
            .vault
            .state()
            .records
            .values()
            .map(|r| {
                genesys_contracts::yield_index::yield_owed(
                    r.principal,
                    registry.yield_index,
                    r.index_snapshot,
                )
                .unwrap() as u128
            })
            .sum();
        assert!(owed <= registry.liability_units(), "step {step}: owed exceeds liability");
    }
}
