//! Session configuration types for chatvault.
//!
//! `SessionConfig` represents the `config.toml` that controls autosave timing
//! and where session slots are stored.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum autosave delay in seconds (safety floor).
pub const MIN_INACTIVITY_TIMEOUT_SECS: u64 = 1;

/// Top-level configuration for a session controller.
///
/// Loaded from `~/.chatvault/config.toml`. All fields have defaults.
/// The encryption key is deliberately absent: it is sourced from the
/// environment or the command line, never from a plaintext file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds of quiet after the last update before an autosave fires.
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout: u64,

    /// Seconds after which a session counts as long-inactive.
    ///
    /// Tracked as metadata only; nothing is triggered by it.
    #[serde(default = "default_long_inactivity_threshold")]
    pub long_inactivity_threshold: u64,

    /// Directory holding the encrypted session slots.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_inactivity_timeout() -> u64 {
    300
}

fn default_long_inactivity_threshold() -> u64 {
    600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: default_inactivity_timeout(),
            long_inactivity_threshold: default_long_inactivity_threshold(),
            data_dir: None,
        }
    }
}

impl SessionConfig {
    /// Autosave delay, never shorter than [`MIN_INACTIVITY_TIMEOUT_SECS`].
    pub fn autosave_after(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout.max(MIN_INACTIVITY_TIMEOUT_SECS))
    }

    pub fn long_inactivity(&self) -> Duration {
        Duration::from_secs(self.long_inactivity_threshold)
    }
}
