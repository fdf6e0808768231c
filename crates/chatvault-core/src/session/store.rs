//! ContextStore trait definition.
//!
//! Provides the single durable slot per user that session blobs are written
//! to and read from. Follows the RPITIT pattern used by the other ports.

use chatvault_types::error::StoreError;

/// Repository trait for encrypted session blobs, one slot per `user_id`.
///
/// Implementations live in chatvault-infra (e.g., `FileContextStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ContextStore: Send + Sync {
    /// Write a blob to the user's slot, replacing any previous one.
    ///
    /// A concurrent or later reader must never observe a half-written blob.
    fn save(
        &self,
        user_id: &str,
        blob: &[u8],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Read the user's slot. `Ok(None)` means nothing has been saved yet.
    fn load(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;
}
