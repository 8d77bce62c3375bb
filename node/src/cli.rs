// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CLI Interface
//!
//! Command-line structure for `genesys-node` using `clap` derive. Every
//! subcommand operates on one data directory.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Genesys time-locked vault simulator.
///
/// Runs the vault program against a local in-memory ledger persisted in a
/// data directory: create a vault, make wallets, deposit, refresh the
/// reserve, and withdraw.
#[derive(Parser, Debug)]
#[command(
    name = "genesys-node",
    about = "Genesys time-locked vault simulator",
    version,
    propagate_version = true
)]
pub struct GenesysCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Data directory holding state, keys, and config.
    #[arg(long, short = 'd', global = true, env = "GENESYS_DATA_DIR", default_value = ".genesys")]
    pub data_dir: PathBuf,

    /// Config file (TOML). Defaults to `config.toml` in the data directory.
    #[arg(long, short = 'c', global = true, env = "GENESYS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory, admin and asset keys, and initialize the vault.
    Init,
    /// Create a named wallet with an empty token account.
    Keygen(NameArgs),
    /// Mint test tokens into a wallet.
    Airdrop(AirdropArgs),
    /// Add funds to the reserve. Without --amount, tops up to `reserve.max_reserve`.
    Fund(FundArgs),
    /// Spread the reserve surplus over locked deposits (admin).
    Refresh,
    /// Lock tokens from a wallet.
    Deposit(DepositArgs),
    /// Withdraw principal and yield once the lock has run out.
    Withdraw(WithdrawArgs),
    /// Show the vault, wallets, and open deposits.
    Status(StatusArgs),
    /// Refresh the reserve periodically until interrupted.
    Keeper(KeeperArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Wallet name.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct AirdropArgs {
    /// Wallet name.
    pub name: String,
    /// Amount in the asset's smallest unit.
    #[arg(long, short = 'a')]
    pub amount: u64,
}

#[derive(Args, Debug)]
pub struct FundArgs {
    /// Amount to add. Omit to top up to the configured target.
    #[arg(long, short = 'a')]
    pub amount: Option<u64>,
}

#[derive(Args, Debug)]
pub struct DepositArgs {
    /// Wallet name.
    pub name: String,
    /// Amount to lock.
    #[arg(long, short = 'a')]
    pub amount: u64,
    /// Lock duration in seconds.
    #[arg(long, short = 'l')]
    pub lock_secs: u64,
}

#[derive(Args, Debug)]
pub struct WithdrawArgs {
    /// Wallet name of the depositor.
    pub name: String,
    /// Pay out to this wallet instead of the depositor's own.
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct KeeperArgs {
    /// Seconds between refreshes. Overrides `keeper.interval_secs`.
    #[arg(long, short = 'i')]
    pub interval_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        GenesysCli::command().debug_assert();
    }

    #[test]
    fn parses_deposit() {
        let cli = GenesysCli::try_parse_from([
            "genesys-node",
            "--data-dir",
            "/tmp/v",
            "deposit",
            "alice",
            "--amount",
            "100000",
            "--lock-secs",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.global.data_dir, PathBuf::from("/tmp/v"));
        match cli.command {
            Commands::Deposit(args) => {
                assert_eq!(args.name, "alice");
                assert_eq!(args.amount, 100_000);
                assert_eq!(args.lock_secs, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = GenesysCli::try_parse_from(["genesys-node", "status", "--json", "-d", "x"]).unwrap();
        assert_eq!(cli.global.data_dir, PathBuf::from("x"));
        assert!(matches!(cli.command, Commands::Status(StatusArgs { json: true })));
    }
}
