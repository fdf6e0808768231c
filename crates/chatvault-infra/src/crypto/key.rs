//! Encryption key resolution.
//!
//! The key is supplied either as 64 hex characters (a raw 32-byte key) or
//! as a passphrase stretched with Argon2id. There is no built-in default:
//! running without a key is a startup error.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use super::cipher::{KEY_SIZE, SessionCipher};

/// Errors from turning configured key material into a cipher.
///
/// Display output never echoes the supplied key or passphrase.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no encryption key configured (set CHATVAULT_ENCRYPTION_KEY or CHATVAULT_PASSPHRASE)")]
    Missing,

    #[error("encryption key is not valid hex")]
    BadHex,

    #[error("encryption key must be {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("key derivation from passphrase failed")]
    Derivation,
}

/// Where the session key comes from.
pub enum KeySource {
    /// 64 hex characters.
    Hex(SecretString),
    /// Free-form passphrase, run through Argon2id.
    Passphrase(SecretString),
}

impl KeySource {
    /// Pick a key source from explicit values, preferring the raw key.
    ///
    /// Blank values count as absent.
    pub fn select(
        key: Option<SecretString>,
        passphrase: Option<SecretString>,
    ) -> Result<Self, KeyError> {
        let present = |s: &SecretString| !s.expose_secret().trim().is_empty();
        if let Some(key) = key.filter(present) {
            return Ok(KeySource::Hex(key));
        }
        if let Some(passphrase) = passphrase.filter(present) {
            return Ok(KeySource::Passphrase(passphrase));
        }
        Err(KeyError::Missing)
    }

    /// Build the cipher for this source.
    pub fn into_cipher(self) -> Result<SessionCipher, KeyError> {
        match self {
            KeySource::Hex(hex) => {
                let bytes = hex_decode(hex.expose_secret().trim())?;
                let key: [u8; KEY_SIZE] =
                    bytes.try_into().map_err(|bytes: Vec<u8>| KeyError::WrongLength {
                        expected: KEY_SIZE,
                        actual: bytes.len(),
                    })?;
                Ok(SessionCipher::new(&key))
            }
            KeySource::Passphrase(passphrase) => {
                SessionCipher::from_passphrase(passphrase.expose_secret())
                    .map_err(|_| KeyError::Derivation)
            }
        }
    }
}

/// Hex-decode a string to bytes.
fn hex_decode(s: &str) -> Result<Vec<u8>, KeyError> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return Err(KeyError::BadHex);
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| KeyError::BadHex))
        .collect()
}
