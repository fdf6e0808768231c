//! Encrypted JSON codec for persisted session contexts.
//!
//! A context is serialized to JSON and sealed with [`SessionCipher`]. On the
//! way back, authentication runs before parsing, so a tampered or foreign
//! blob is reported as [`CodecError::Crypto`] and never reaches the parser.

use chatvault_core::session::codec::SessionCodec;
use chatvault_types::error::CodecError;
use chatvault_types::session::SessionContext;

use crate::crypto::cipher::SessionCipher;

/// [`SessionCodec`] backed by serde_json and AES-256-GCM.
pub struct EncryptedJsonCodec {
    cipher: SessionCipher,
}

impl EncryptedJsonCodec {
    pub fn new(cipher: SessionCipher) -> Self {
        Self { cipher }
    }
}

impl SessionCodec for EncryptedJsonCodec {
    fn encode(&self, context: &SessionContext) -> Result<Vec<u8>, CodecError> {
        let plaintext = serde_json::to_vec(context).map_err(format_error)?;
        self.cipher
            .encrypt(&plaintext)
            .map_err(|_| CodecError::Crypto)
    }

    fn decode(&self, blob: &[u8]) -> Result<SessionContext, CodecError> {
        let plaintext = self.cipher.decrypt(blob).map_err(|_| CodecError::Crypto)?;
        serde_json::from_slice(&plaintext).map_err(format_error)
    }
}

/// Describe a JSON failure by category and position only. serde_json
/// messages can quote fragments of the input, which is user content.
fn format_error(err: serde_json::Error) -> CodecError {
    CodecError::Format(format!(
        "{:?} error at line {} column {}",
        err.classify(),
        err.line(),
        err.column()
    ))
}
