//! Session configuration loader for chatvault.
//!
//! Reads `config.toml` from the data directory (`~/.chatvault/` in production)
//! and deserializes it into [`SessionConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use chatvault_types::config::SessionConfig;

/// Load session configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`SessionConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_session_config(data_dir: &Path) -> SessionConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return SessionConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return SessionConfig::default();
        }
    };

    match toml::from_str::<SessionConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            SessionConfig::default()
        }
    }
}

/// Directory holding the session slots.
///
/// `data_dir` from the config wins; otherwise slots live next to the config
/// file. A relative override is resolved against `data_dir`.
pub fn resolve_slot_dir(data_dir: &Path, config: &SessionConfig) -> PathBuf {
    match &config.data_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => data_dir.join(dir),
        None => data_dir.to_path_buf(),
    }
}
