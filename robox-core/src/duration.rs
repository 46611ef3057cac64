//! Stable duration type for config fields and wire/log records.
//!
//! [`RobotDuration`] serializes as a plain integer (milliseconds), not as
//! serde's internal `{"secs": N, "nanos": N}` format. Modeled directly on
//! the teacher's `DurationMs` — a stable, portable, human-readable wire
//! format that survives serde's internal `Duration` representation changing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Duration in milliseconds with a stable JSON serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RobotDuration(u64);

impl RobotDuration {
    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Create from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Create from seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Create from minutes.
    pub fn from_mins(mins: u64) -> Self {
        Self::from_secs(mins.saturating_mul(60))
    }

    /// Get the value in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Convert to `std::time::Duration`.
    pub fn to_std(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl From<Duration> for RobotDuration {
    fn from(d: Duration) -> Self {
        Self(d.as_millis() as u64)
    }
}

impl From<RobotDuration> for Duration {
    fn from(d: RobotDuration) -> Self {
        Duration::from_millis(d.0)
    }
}

impl Default for RobotDuration {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::fmt::Display for RobotDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
