//! SessionCodec trait definition.
//!
//! A codec turns a [`SessionContext`] into an opaque encrypted blob and back.
//! The implementation (serialization + authenticated encryption) lives in
//! chatvault-infra.

use chatvault_types::error::CodecError;
use chatvault_types::session::SessionContext;

/// Encodes and decodes persisted session contexts.
///
/// Contract: `decode(encode(ctx)) == ctx` for every valid context. Decoding
/// a blob that was not produced by this codec with the matching key must
/// fail with [`CodecError::Crypto`] or [`CodecError::Format`], never yield a
/// partially-populated context. Encodings of equal contexts need not be
/// byte-identical.
pub trait SessionCodec: Send + Sync {
    /// Serialize and encrypt a context.
    fn encode(&self, context: &SessionContext) -> Result<Vec<u8>, CodecError>;

    /// Decrypt and deserialize a blob produced by [`SessionCodec::encode`].
    fn decode(&self, blob: &[u8]) -> Result<SessionContext, CodecError>;
}
