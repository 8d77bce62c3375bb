// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Local Vault Simulator
//!
//! Each command loads the snapshot from the data directory, runs against a
//! [`Vault`] over the in-memory ledger, and saves the snapshot back only if
//! the command succeeded.
//!
//! Wallet token accounts live at the owner's own public key, so `alice`'s
//! tokens are at `alice`'s address. The asset's mint authority is the admin.

use std::fmt;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use genesys_contracts::yield_index::yield_owed;
use genesys_contracts::{SignedInstruction, Vault, VaultClient, VaultEvent, VaultState};
use genesys_protocol::crypto::keys::{Keypair, Pubkey};
use genesys_protocol::ledger::{Clock, InMemoryLedger, TokenLedger, UnixTimestamp};
use serde::Serialize;
use tracing::info;

use crate::config::{NodeConfig, CONFIG_FILE};
use crate::store::{Snapshot, Store, ADMIN_KEY, ASSET_KEY, PROGRAM_KEY};

/// Decimals of the simulated asset. Display only.
const ASSET_DECIMALS: u8 = 6;

/// Drives the vault stored in one data directory.
#[derive(Debug)]
pub struct Simulator<C: Clock> {
    store: Store,
    config: NodeConfig,
    clock: C,
}

/// What `init` created.
#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub program_id: Pubkey,
    pub admin: Pubkey,
    pub asset: Pubkey,
    pub registry: Pubkey,
    pub reserve: Pubkey,
}

/// Vault overview for `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub program_id: Pubkey,
    pub asset: Pubkey,
    pub admin: Pubkey,
    pub reserve: Pubkey,
    pub reserve_balance: u64,
    pub yield_index: u128,
    pub total_principal: u64,
    pub yield_liability: u128,
    pub open_deposits: u64,
    pub total_yield_paid: u64,
    pub now: UnixTimestamp,
    pub wallets: Vec<WalletStatus>,
    pub deposits: Vec<DepositStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletStatus {
    pub name: String,
    pub address: Pubkey,
    pub balance: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepositStatus {
    pub name: Option<String>,
    pub depositor: Pubkey,
    pub principal: u64,
    pub deposited_at: UnixTimestamp,
    pub unlocks_at: UnixTimestamp,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    pub withdrawable: bool,
    pub accrued_yield: u64,
}

impl<C: Clock> Simulator<C> {
    pub fn new(store: Store, config: NodeConfig, clock: C) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Create the data directory, keys, asset, and an initialized vault.
    pub fn init(&self) -> Result<InitReport> {
        if self.store.has_state() {
            bail!(
                "{} already holds a vault; remove it to start over",
                self.store.root().display()
            );
        }
        self.store.create_dirs()?;

        let config_path = self.store.root().join(CONFIG_FILE);
        if !config_path.exists() {
            std::fs::write(&config_path, self.config.to_toml_string()?)
                .with_context(|| format!("failed to write {}", config_path.display()))?;
        }

        let program = Keypair::generate();
        let admin = Keypair::generate();
        let asset = Keypair::generate();
        self.store.write_key(PROGRAM_KEY, &program)?;
        self.store.write_key(ADMIN_KEY, &admin)?;
        self.store.write_key(ASSET_KEY, &asset)?;

        let program_id = program.pubkey();
        let mut ledger = InMemoryLedger::new();
        ledger.create_mint(asset.pubkey(), admin.pubkey(), ASSET_DECIMALS)?;
        ledger.open_account(admin.pubkey(), asset.pubkey(), admin.pubkey())?;

        let client = VaultClient::new(program_id);
        let mut vault = Vault::from_parts(program_id, VaultState::new(), ledger, &self.clock);
        let ix = client.initialize(
            vault.state(),
            &admin,
            asset.pubkey(),
            self.config.vault.to_vault_config(),
        )?;
        let event = vault.execute(&ix)?;

        let (registry, reserve) = match event {
            VaultEvent::Initialized {
                registry, reserve, ..
            } => (registry, reserve),
            other => bail!("unexpected event from initialize: {other}"),
        };

        let (state, ledger, _) = vault.into_parts();
        self.store.save(&Snapshot {
            program_id,
            asset: asset.pubkey(),
            ledger,
            vault: state,
            saved_at: Utc::now(),
        })?;

        info!(program_id = %program_id, admin = %admin.pubkey(), "vault created");
        Ok(InitReport {
            program_id,
            admin: admin.pubkey(),
            asset: asset.pubkey(),
            registry,
            reserve,
        })
    }

    /// Create a named wallet with an empty token account.
    pub fn keygen(&self, name: &str) -> Result<Pubkey> {
        let mut snapshot = self.store.load()?;
        let keypair = Keypair::generate();
        let owner = keypair.pubkey();
        snapshot
            .ledger
            .open_account(owner, snapshot.asset, owner)
            .context("failed to open wallet token account")?;
        self.store.write_key(name, &keypair)?;
        self.save(snapshot)?;
        info!(name, address = %owner, "wallet created");
        Ok(owner)
    }

    /// Mint test tokens into a wallet. Returns the new balance.
    pub fn airdrop(&self, name: &str, amount: u64) -> Result<u64> {
        let mut snapshot = self.store.load()?;
        let admin = self.store.read_key(ADMIN_KEY)?;
        let wallet = self.store.read_key(name)?.pubkey();
        snapshot
            .ledger
            .mint_to(&snapshot.asset, &wallet, amount, &admin.pubkey())?;
        let balance = snapshot.ledger.balance(&wallet)?;
        self.save(snapshot)?;
        info!(name, amount, balance, "airdrop");
        Ok(balance)
    }

    /// Mint into the reserve. Without an amount, tops up to `max_reserve`.
    ///
    /// Funding is external to the vault; the next refresh or deposit picks it up.
    pub fn fund(&self, amount: Option<u64>) -> Result<u64> {
        let mut snapshot = self.store.load()?;
        let admin = self.store.read_key(ADMIN_KEY)?;
        let reserve = snapshot
            .vault
            .registry
            .as_ref()
            .map(|r| r.reserve)
            .context("vault is not initialized")?;

        let current = snapshot.ledger.balance(&reserve)?;
        let amount = amount.unwrap_or_else(|| self.config.reserve.max_reserve.saturating_sub(current));
        if amount == 0 {
            info!(reserve_balance = current, "reserve already at target");
            return Ok(0);
        }
        snapshot
            .ledger
            .mint_to(&snapshot.asset, &reserve, amount, &admin.pubkey())?;
        self.save(snapshot)?;
        info!(amount, reserve_balance = current.saturating_add(amount), "reserve funded");
        Ok(amount)
    }

    pub fn refresh(&self) -> Result<VaultEvent> {
        let admin = self.store.read_key(ADMIN_KEY)?;
        self.execute(|client, state| Ok(client.refresh_reserve(state, &admin)?))
    }

    pub fn deposit(&self, name: &str, amount: u64, lock_secs: u64) -> Result<VaultEvent> {
        let user = self.store.read_key(name)?;
        let source = user.pubkey();
        self.execute(|client, state| Ok(client.deposit(state, &user, source, amount, lock_secs)?))
    }

    /// Withdraw `name`'s deposit into `to`'s wallet (default: their own).
    pub fn withdraw(&self, name: &str, to: Option<&str>) -> Result<VaultEvent> {
        let user = self.store.read_key(name)?;
        let destination = match to {
            Some(other) => self.store.read_key(other)?.pubkey(),
            None => user.pubkey(),
        };
        self.execute(|client, state| Ok(client.withdraw(state, &user, destination)?))
    }

    pub fn status(&self) -> Result<StatusReport> {
        let snapshot = self.store.load()?;
        let registry = snapshot
            .vault
            .registry
            .as_ref()
            .context("vault is not initialized")?;
        let now = self.clock.unix_timestamp();

        let mut wallets = Vec::new();
        let mut names = Vec::new();
        for name in self.store.key_names()? {
            let address = self.store.read_key(&name)?.pubkey();
            names.push((address, name.clone()));
            if name == PROGRAM_KEY || name == ASSET_KEY {
                continue;
            }
            wallets.push(WalletStatus {
                name,
                address,
                balance: snapshot.ledger.balance(&address).ok(),
            });
        }

        let deposits = snapshot
            .vault
            .records
            .values()
            .map(|r| {
                Ok(DepositStatus {
                    name: names
                        .iter()
                        .find(|(addr, _)| *addr == r.depositor)
                        .map(|(_, n)| n.clone()),
                    depositor: r.depositor,
                    principal: r.principal,
                    deposited_at: r.deposited_at,
                    unlocks_at: r.unlocks_at(),
                    elapsed_secs: r.elapsed(now),
                    remaining_secs: r.remaining(now),
                    withdrawable: r.is_withdrawable(now),
                    accrued_yield: yield_owed(r.principal, registry.yield_index, r.index_snapshot)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(StatusReport {
            program_id: snapshot.program_id,
            asset: snapshot.asset,
            admin: registry.admin,
            reserve: registry.reserve,
            reserve_balance: snapshot.ledger.balance(&registry.reserve)?,
            yield_index: registry.yield_index,
            total_principal: registry.total_principal,
            yield_liability: registry.liability_units(),
            open_deposits: registry.open_deposits,
            total_yield_paid: registry.total_yield_paid,
            now,
            wallets,
            deposits,
        })
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Load, build one instruction, execute it, save on success.
    fn execute<F>(&self, build: F) -> Result<VaultEvent>
    where
        F: FnOnce(&VaultClient, &VaultState) -> Result<SignedInstruction>,
    {
        let snapshot = self.store.load()?;
        let client = VaultClient::new(snapshot.program_id);
        let ix = build(&client, &snapshot.vault)?;

        let mut vault = Vault::from_parts(snapshot.program_id, snapshot.vault, snapshot.ledger, &self.clock);
        let event = vault.execute(&ix)?;

        let (state, ledger, _) = vault.into_parts();
        self.save(Snapshot {
            program_id: snapshot.program_id,
            asset: snapshot.asset,
            ledger,
            vault: state,
            saved_at: Utc::now(),
        })?;
        Ok(event)
    }

    fn save(&self, mut snapshot: Snapshot) -> Result<()> {
        snapshot.saved_at = Utc::now();
        self.store.save(&snapshot)
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vault")?;
        writeln!(f, "  Program         : {}", self.program_id)?;
        writeln!(f, "  Asset           : {}", self.asset)?;
        writeln!(f, "  Admin           : {}", self.admin)?;
        writeln!(f, "  Reserve         : {} ({} units)", self.reserve, self.reserve_balance)?;
        writeln!(f, "  Yield index     : {}", self.yield_index)?;
        writeln!(f, "  Total principal : {}", self.total_principal)?;
        writeln!(f, "  Yield liability : {}", self.yield_liability)?;
        writeln!(f, "  Yield paid      : {}", self.total_yield_paid)?;
        writeln!(f, "  Open deposits   : {}", self.open_deposits)?;

        if !self.wallets.is_empty() {
            writeln!(f, "Wallets")?;
            for w in &self.wallets {
                match w.balance {
                    Some(balance) => writeln!(f, "  {:<12} {} {}", w.name, w.address, balance)?,
                    None => writeln!(f, "  {:<12} {} (no token account)", w.name, w.address)?,
                }
            }
        }

        if !self.deposits.is_empty() {
            writeln!(f, "Deposits")?;
            for d in &self.deposits {
                let who = d.name.clone().unwrap_or_else(|| d.depositor.to_string());
                let state = if d.withdrawable {
                    "withdrawable".to_string()
                } else {
                    format!("locked, {}s left", d.remaining_secs)
                };
                writeln!(
                    f,
                    "  {:<12} {} principal, {} yield accrued, {}",
                    who, d.principal, d.accrued_yield, state
                )?;
            }
        }
        Ok(())
    }
}
