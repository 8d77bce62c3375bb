// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! Ledger clock. Unix seconds, like the ledger's own clock sysvar.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
pub type UnixTimestamp = i64;

/// Source of the current ledger time.
pub trait Clock {
    /// The current ledger time.
    fn unix_timestamp(&self) -> UnixTimestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn unix_timestamp(&self) -> UnixTimestamp {
        (**self).unix_timestamp()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> UnixTimestamp {
        Utc::now().timestamp()
    }
}

/// A clock that only moves when told to. Tests use it to walk a deposit
/// up to (and across) its unlock time without sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualClock {
    now: UnixTimestamp,
}

impl ManualClock {
    /// Start the clock at `now`.
    pub fn new(now: UnixTimestamp) -> Self {
        Self { now }
    }

    /// Move forward (or, with a negative value, backward) by `seconds`.
    pub fn advance(&mut self, seconds: i64) {
        self.now = self.now.saturating_add(seconds);
    }

    /// Jump to an absolute time.
    pub fn set(&mut self, now: UnixTimestamp) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn unix_timestamp(&self) -> UnixTimestamp {
        self.now
    }
}
