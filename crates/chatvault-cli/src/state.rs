//! Application state wiring the session controller together.
//!
//! AppState resolves the data directory and configuration, turns the key
//! material into a cipher, and pins `ContextManager` to the concrete infra
//! codec and file store.

use std::path::PathBuf;

use anyhow::Context;
use secrecy::SecretString;

use chatvault_core::ContextManager;
use chatvault_infra::codec::EncryptedJsonCodec;
use chatvault_infra::config::{load_session_config, resolve_slot_dir};
use chatvault_infra::crypto::key::KeySource;
use chatvault_infra::filesystem::resolve_data_dir;
use chatvault_infra::filesystem::store::FileContextStore;

/// Concrete type alias for the controller pinned to infra implementations.
pub type SessionManager = ContextManager<EncryptedJsonCodec, FileContextStore>;

/// Startup inputs taken from the command line.
pub struct StartupOptions {
    pub user_id: String,
    pub data_dir: Option<PathBuf>,
    pub encryption_key: Option<SecretString>,
    pub passphrase: Option<SecretString>,
}

/// Shared application state for one chat run.
pub struct AppState {
    pub manager: SessionManager,
    pub slot_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: resolve paths, config and key.
    ///
    /// A missing or malformed key is fatal. A missing or broken config file
    /// is not.
    pub async fn init(options: StartupOptions) -> anyhow::Result<Self> {
        let key = KeySource::select(options.encryption_key, options.passphrase)?;
        let cipher = key
            .into_cipher()
            .context("Failed to initialize session encryption")?;

        let data_dir = options.data_dir.unwrap_or_else(resolve_data_dir);
        let config = load_session_config(&data_dir).await;
        let slot_dir = resolve_slot_dir(&data_dir, &config);

        tracing::debug!(
            data_dir = %data_dir.display(),
            slot_dir = %slot_dir.display(),
            inactivity_timeout = config.inactivity_timeout,
            "Session storage resolved"
        );

        let manager = ContextManager::new(
            options.user_id,
            EncryptedJsonCodec::new(cipher),
            FileContextStore::new(slot_dir.clone()),
            config,
        );

        Ok(Self { manager, slot_dir })
    }
}
