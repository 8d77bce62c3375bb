// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Genesys Protocol: Core Primitives
//!
//! Everything the Genesys vault program needs from the world around it, and
//! nothing it doesn't. The vault itself lives in `genesys-contracts`; this
//! crate supplies the pieces it is built on:
//!
//! - **crypto**: Ed25519 identities and signatures, SHA-256 and BLAKE3.
//! - **address**: deterministic custody address derivation (seeds + bump).
//! - **ledger**: the token ledger and clock boundary traits, plus in-memory
//!   implementations used by tests and the local simulator.
//! - **config**: seed tags, fixed-point scale, and default limits.
//!
//! ## Design Philosophy
//!
//! 1. Amounts are `u64` in the asset's smallest unit. No floating point.
//! 2. Every arithmetic step on money is checked.
//! 3. Addresses are derived, never trusted.
//! 4. If it touches money, it has tests. Plural.

pub mod address;
pub mod config;
pub mod crypto;
pub mod ledger;

pub use address::{derive_address, find_program_address, DeriveError};
pub use crypto::keys::{Keypair, Pubkey, Signature};
pub use ledger::{Clock, TokenLedger, TransferError, UnixTimestamp};
