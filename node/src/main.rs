// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Genesys Vault Simulator
//!
//! Entry point for the `genesys-node` binary. Parses CLI arguments, loads
//! the config, initializes logging, and runs one command against the vault
//! stored in the data directory.
//!
//! - `init`:      create keys, the asset, and an initialized vault
//! - `keygen`:    create a named wallet
//! - `airdrop`:   mint test tokens into a wallet
//! - `fund`:      add to the reserve
//! - `refresh`:   spread the reserve surplus (admin)
//! - `deposit`:   lock tokens
//! - `withdraw`:  collect principal and yield
//! - `status`:    print the vault
//! - `keeper`:    refresh on an interval until Ctrl+C
//! - `version`:   print build version information

mod cli;
mod config;
mod logging;
mod simulator;
mod store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use genesys_protocol::ledger::SystemClock;
use tokio::signal;

use cli::{Commands, GenesysCli};
use config::NodeConfig;
use simulator::Simulator;
use store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = GenesysCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let config = NodeConfig::resolve(cli.global.config.as_deref(), &cli.global.data_dir)?;
    logging::init_logging(&config.logging.level, config.logging.format);

    let store = Store::new(&cli.global.data_dir);
    let sim = Simulator::new(store, config, SystemClock);

    match cli.command {
        Commands::Init => {
            let report = sim.init()?;
            println!("Vault initialized.");
            println!("  Data directory : {}", cli.global.data_dir.display());
            println!("  Program id     : {}", report.program_id);
            println!("  Admin          : {}", report.admin);
            println!("  Asset          : {}", report.asset);
            println!("  Registry       : {}", report.registry);
            println!("  Reserve        : {}", report.reserve);
        }
        Commands::Keygen(args) => {
            let address = sim.keygen(&args.name)?;
            println!("{}: {}", args.name, address);
        }
        Commands::Airdrop(args) => {
            let balance = sim.airdrop(&args.name, args.amount)?;
            println!("{} balance: {}", args.name, balance);
        }
        Commands::Fund(args) => {
            let funded = sim.fund(args.amount)?;
            println!("reserve funded with {funded}");
        }
        Commands::Refresh => println!("{}", sim.refresh()?),
        Commands::Deposit(args) => println!("{}", sim.deposit(&args.name, args.amount, args.lock_secs)?),
        Commands::Withdraw(args) => println!("{}", sim.withdraw(&args.name, args.to.as_deref())?),
        Commands::Status(args) => {
            let status = sim.status()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print!("{status}");
            }
        }
        Commands::Keeper(args) => {
            let interval = args.interval_secs.unwrap_or(sim.config().keeper.interval_secs);
            if interval == 0 {
                bail!("keeper interval must be greater than zero");
            }
            run_keeper(sim, Duration::from_secs(interval)).await;
        }
        Commands::Version => print_version(),
    }

    Ok(())
}

/// Submit Refresh Reserve every `interval` until interrupted.
///
/// Each refresh reads and rewrites the state file, so it runs on the blocking
/// pool. A failed refresh is logged and retried on the next tick.
async fn run_keeper(sim: Simulator<SystemClock>, interval: Duration) {
    tracing::info!(interval_secs = interval.as_secs(), "keeper started");
    let sim = Arc::new(sim);
    let mut ticker = tokio::time::interval(interval);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let sim = Arc::clone(&sim);
                match tokio::task::spawn_blocking(move || sim.refresh()).await {
                    Ok(Ok(event)) => tracing::info!(%event, "keeper refresh"),
                    Ok(Err(err)) => tracing::warn!(error = %err, "keeper refresh failed"),
                    Err(err) => tracing::error!(error = %err, "keeper refresh task failed"),
                }
            }
            _ = &mut shutdown => {
                tracing::info!("shutdown signal received");
                break;
            }
        }
    }

    tracing::info!("keeper stopped");
}

/// Prints version information to stdout.
fn print_version() {
    println!("genesys-node {}", env!("CARGO_PKG_VERSION"));
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
