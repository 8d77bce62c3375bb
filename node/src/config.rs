// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Node Configuration
//!
//! TOML file with one table per concern. Every field has a default, so an
//! empty (or missing) file is a valid configuration.
//!
//! ```toml
//! [vault]
//! max_deposit = 100000      # 0 = unlimited
//! max_lock_secs = 31536000  # 0 = unlimited
//!
//! [reserve]
//! max_reserve = 10000000    # `fund` tops the reserve up to this
//!
//! [keeper]
//! interval_secs = 60
//!
//! [logging]
//! level = "info"
//! format = "pretty"         # or "json"
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use genesys_contracts::VaultConfig;
use genesys_protocol::config::{DEFAULT_MAX_LOCK_SECONDS, DEFAULT_MAX_RESERVE, DEFAULT_MAX_USER_DEPOSIT};
use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub vault: VaultSection,
    #[serde(default)]
    pub reserve: ReserveSection,
    #[serde(default)]
    pub keeper: KeeperSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Limits applied when the vault is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultSection {
    /// Largest single deposit. 0 = unlimited.
    #[serde(default = "default_max_deposit")]
    pub max_deposit: u64,
    /// Longest lock in seconds. 0 = unlimited.
    #[serde(default = "default_max_lock_secs")]
    pub max_lock_secs: u64,
}

/// Reserve funding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSection {
    /// Target balance for `fund` without an explicit amount.
    #[serde(default = "default_max_reserve")]
    pub max_reserve: u64,
}

/// Periodic refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeeperSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

// Default value functions

fn default_max_deposit() -> u64 {
    DEFAULT_MAX_USER_DEPOSIT
}

fn default_max_lock_secs() -> u64 {
    DEFAULT_MAX_LOCK_SECONDS
}

fn default_max_reserve() -> u64 {
    DEFAULT_MAX_RESERVE
}

fn default_interval_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "genesys_node=info,genesys_contracts=info,genesys_protocol=warn".to_string()
}

impl Default for VaultSection {
    fn default() -> Self {
        Self {
            max_deposit: default_max_deposit(),
            max_lock_secs: default_max_lock_secs(),
        }
    }
}

impl Default for ReserveSection {
    fn default() -> Self {
        Self {
            max_reserve: default_max_reserve(),
        }
    }
}

impl Default for KeeperSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl VaultSection {
    /// The limits as the vault program sees them.
    pub fn to_vault_config(&self) -> VaultConfig {
        VaultConfig {
            max_deposit: (self.max_deposit != 0).then_some(self.max_deposit),
            max_lock_duration: (self.max_lock_secs != 0).then_some(self.max_lock_secs),
        }
    }
}

impl NodeConfig {
    /// Parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: NodeConfig = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise `<data_dir>/config.toml` if it exists,
    /// otherwise defaults.
    pub fn resolve(path: Option<&Path>, data_dir: &Path) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = data_dir.join(CONFIG_FILE);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.keeper.interval_secs == 0 {
            bail!("keeper.interval_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}
