//! File-backed session slots.
//!
//! Each user owns one file, `session_context_{user_id}.bin`, in the data
//! directory. Writes go to a sibling temp file that is synced and renamed
//! over the slot, so a reader sees either the old blob or the new one.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use chatvault_core::session::store::ContextStore;
use chatvault_types::error::StoreError;

use crate::crypto::hash::sha256_hex;

const SLOT_PREFIX: &str = "session_context_";
const SLOT_EXTENSION: &str = "bin";

/// [`ContextStore`] keeping one encrypted blob per user in a directory.
#[derive(Debug, Clone)]
pub struct FileContextStore {
    dir: PathBuf,
}

impl FileContextStore {
    /// Store slots under `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the slot owned by `user_id`.
    ///
    /// Ids made only of ASCII letters, digits, `_` and `-` are used as-is.
    /// Anything else is replaced by its SHA-256 so the id can never name a
    /// path outside the directory. Hashed names use `.` as the separator,
    /// which plain names cannot contain, so the two forms never collide.
    pub fn slot_path(&self, user_id: &str) -> PathBuf {
        let file_name = if is_plain_id(user_id) {
            format!("{SLOT_PREFIX}{user_id}.{SLOT_EXTENSION}")
        } else {
            format!("{SLOT_PREFIX}.{}.{SLOT_EXTENSION}", sha256_hex(user_id))
        };
        self.dir.join(file_name)
    }
}

fn is_plain_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl ContextStore for FileContextStore {
    async fn save(&self, user_id: &str, blob: &[u8]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let slot = self.slot_path(user_id);
        let mut tmp = slot.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(blob).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, &slot).await
        }
        .await;

        if let Err(err) = written {
            // Best effort; the slot itself is untouched.
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        tracing::debug!(path = %slot.display(), bytes = blob.len(), "session slot written");
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let slot = self.slot_path(user_id);
        match tokio::fs::read(&slot).await {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %slot.display(), "no saved session slot");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
