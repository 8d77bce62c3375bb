// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Logging
//!
//! `tracing` subscriber for the simulator. Logs go to stderr; stdout carries
//! command output only (`status --json | jq` must stay parseable).
//!
//! `RUST_LOG` replaces `[logging] level` when set:
//!
//! ```text
//! RUST_LOG=genesys_contracts=debug genesys-node refresh
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `[logging] format` in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event, for piping into log tooling.
    Json,
}

/// Install the global subscriber. Must run once, before the first event.
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    tracing::debug!(?format, "logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        format: LogFormat,
    }

    #[test]
    fn format_names_are_lowercase() {
        let w: Wrapper = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(w.format, LogFormat::Json);
        let w: Wrapper = toml::from_str("format = \"pretty\"").unwrap();
        assert_eq!(w.format, LogFormat::Pretty);
        assert!(toml::from_str::<Wrapper>("format = \"xml\"").is_err());
    }
}
