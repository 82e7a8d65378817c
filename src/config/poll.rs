use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Timing parameters of the convergence checks
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PollConfig {
    /// Deadline for the registration-integrity check (milliseconds)
    #[serde(default = "default_integrity_timeout_ms")]
    pub integrity_timeout_ms: u64,

    /// Deadline for the post-cleanup drain check (milliseconds)
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Sleep between two poll iterations (milliseconds)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Accept a uniform zero registration count as converged.
    /// Needed for artifacts that only run a batch and register nothing.
    #[serde(default)]
    pub allow_empty_registrations: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            integrity_timeout_ms: default_integrity_timeout_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
            interval_ms: default_interval_ms(),
            allow_empty_registrations: false,
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<()> {
        if self.integrity_timeout_ms == 0 || self.drain_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "poll timeouts must be greater than 0".into(),
            ));
        }

        if self.interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "poll.interval_ms must be greater than 0".into(),
            ));
        }

        let shortest = self.integrity_timeout_ms.min(self.drain_timeout_ms);
        if self.interval_ms >= shortest {
            return Err(Error::InvalidConfig(format!(
                "poll.interval_ms ({}) must be shorter than every poll timeout ({})",
                self.interval_ms, shortest
            )));
        }

        Ok(())
    }

    pub fn integrity_timeout(&self) -> Duration {
        Duration::from_millis(self.integrity_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_integrity_timeout_ms() -> u64 {
    1000
}
fn default_drain_timeout_ms() -> u64 {
    1000
}
fn default_interval_ms() -> u64 {
    100
}
