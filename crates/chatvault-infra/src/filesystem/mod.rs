//! Filesystem adapters for chatvault.
//!
//! Implements the `ContextStore` trait from `chatvault-core` on top of a
//! data directory, plus the data directory resolution shared with the CLI.

pub mod store;

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CHATVAULT_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `CHATVAULT_DATA_DIR` environment variable
/// 2. `~/.chatvault`
/// 3. `./.chatvault`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".chatvault");
    }

    PathBuf::from(".chatvault")
}
