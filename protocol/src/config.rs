// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Protocol Configuration & Constants
//!
//! Every magic number in Genesys lives here. Seed tags in particular are
//! part of the on-ledger address layout: changing one moves every account
//! derived from it, so treat them as frozen once a vault exists.

// ---------------------------------------------------------------------------
// Namespace Tags
// ---------------------------------------------------------------------------

/// Seed tag for the vault registry (the singleton holding global state).
pub const VAULT_INFO_SEED: &str = "vault-info";

/// Seed tag for the pooled reserve custody account.
pub const TOKEN_VAULT_SEED: &str = "token-vault";

/// Seed tag for per-depositor deposit records. Owner-keyed.
pub const USER_DEPOSIT_INFO_SEED: &str = "user-deposit-info";

/// Seed tag for per-depositor custody accounts. Owner-keyed.
pub const USER_VAULT_SEED: &str = "user-vault";

// ---------------------------------------------------------------------------
// Address Derivation
// ---------------------------------------------------------------------------

/// Maximum length of a single derivation seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds (including the bump) per derivation.
pub const MAX_SEEDS: usize = 16;

/// Marker appended to every derivation preimage so derived addresses can
/// never collide with hashes produced for other purposes.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Domain tag for instruction signing digests.
pub const INSTRUCTION_DOMAIN: &str = "genesys-vault 2026 instruction v1";

// ---------------------------------------------------------------------------
// Yield Accounting
// ---------------------------------------------------------------------------

/// Fixed-point scale of the cumulative yield index. An index value of
/// `YIELD_INDEX_SCALE` means one unit of yield per unit of principal.
///
/// 10^12 keeps twelve decimal digits of per-unit precision while leaving
/// room in a `u128` for `principal * index_delta` on any realistic balance.
pub const YIELD_INDEX_SCALE: u128 = 1_000_000_000_000;

// ---------------------------------------------------------------------------
// Default Limits
// ---------------------------------------------------------------------------

/// Default cap on a single deposit, in the asset's smallest unit.
pub const DEFAULT_MAX_USER_DEPOSIT: u64 = 100_000;

/// Default reserve top-up target used by the simulator's `fund` command.
pub const DEFAULT_MAX_RESERVE: u64 = 10_000_000;

/// Default cap on a lock duration: one year.
pub const DEFAULT_MAX_LOCK_SECONDS: u64 = 365 * 24 * 60 * 60;
