// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Data Directory
//!
//! ```text
//! <data_dir>/
//!   config.toml     node configuration
//!   state.json      ledger + vault state snapshot
//!   keys/<name>.key hex-encoded Ed25519 secrets (0600 on Unix)
//! ```
//!
//! Snapshots are written to a temp file and renamed into place, so a crash
//! mid-write leaves the previous snapshot intact.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use genesys_contracts::VaultState;
use genesys_protocol::crypto::keys::{Keypair, Pubkey};
use genesys_protocol::ledger::InMemoryLedger;
use serde::{Deserialize, Serialize};

const STATE_FILE: &str = "state.json";
const KEYS_DIR: &str = "keys";

/// Names of the keys the node creates at `init`.
pub const PROGRAM_KEY: &str = "program";
pub const ADMIN_KEY: &str = "admin";
pub const ASSET_KEY: &str = "asset";

/// Everything the simulator persists between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub program_id: Pubkey,
    pub asset: Pubkey,
    pub ledger: InMemoryLedger,
    pub vault: VaultState,
    pub saved_at: DateTime<Utc>,
}

/// Handle on a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.root.join(KEYS_DIR)
    }

    /// Create the directory layout.
    pub fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.keys_dir())
            .with_context(|| format!("failed to create {}", self.keys_dir().display()))
    }

    pub fn has_state(&self) -> bool {
        self.state_path().exists()
    }

    pub fn load(&self) -> Result<Snapshot> {
        let path = self.state_path();
        let raw = fs::read_to_string(&path).with_context(|| {
            format!(
                "failed to read {} (run `genesys-node init` first)",
                path.display()
            )
        })?;
        serde_json::from_str(&raw).with_context(|| format!("corrupt state file {}", path.display()))
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.state_path();
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(snapshot).context("failed to serialize state")?;
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("failed to move {} into place", path.display()))?;
        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }

    fn key_path(&self, name: &str) -> Result<PathBuf> {
        validate_key_name(name)?;
        Ok(self.keys_dir().join(format!("{name}.key")))
    }

    /// Write a new key file. Refuses to overwrite.
    pub fn write_key(&self, name: &str, keypair: &Keypair) -> Result<PathBuf> {
        let path = self.key_path(name)?;
        if path.exists() {
            bail!("key {name:?} already exists at {}", path.display());
        }
        fs::write(&path, keypair.to_hex())
            .with_context(|| format!("failed to write key to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(path)
    }

    pub fn read_key(&self, name: &str) -> Result<Keypair> {
        let path = self.key_path(name)?;
        let hex = fs::read_to_string(&path)
            .with_context(|| format!("no key named {name:?} ({})", path.display()))?;
        Keypair::from_hex(hex.trim()).with_context(|| format!("invalid key file {}", path.display()))
    }

    /// Names of all stored keys, sorted.
    pub fn key_names(&self) -> Result<Vec<String>> {
        let dir = self.keys_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("failed to list {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("key") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Key names become file names: keep them boring.
fn validate_key_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        bail!("invalid key name {name:?}: use letters, digits, '-' or '_'");
    }
    Ok(())
}
