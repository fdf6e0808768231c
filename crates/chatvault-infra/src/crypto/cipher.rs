//! AES-256-GCM encryption for session blobs at rest.
//!
//! SessionCipher provides authenticated symmetric encryption with random
//! nonces. The key can come from:
//! - A raw 32-byte key (usually supplied as 64 hex characters)
//! - A passphrase (Argon2id key derivation)
//!
//! Encrypted format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
//!
//! SECURITY: Error types never contain plaintext or key material.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use thiserror::Error;

/// Nonce size for AES-256-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// Authentication tag size appended by AES-GCM.
const TAG_SIZE: usize = 16;

/// Key length in bytes.
pub const KEY_SIZE: usize = 32;

/// Salt for passphrase-derived keys. Deterministic so the same passphrase
/// always opens the same slots.
const PASSPHRASE_SALT: &[u8] = b"chatvault-session-v1";

/// Errors from session encryption operations.
///
/// IMPORTANT: These errors never include plaintext, key material, or
/// ciphertext in their Display/Debug output.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("key derivation failed")]
    KeyDerivationFailed,
}

/// AES-256-GCM cipher for persisted session contexts.
///
/// Each encryption call generates a random 12-byte nonce, prepended to the
/// ciphertext, so encrypting the same context twice produces different
/// output. Any change to the blob is caught by the GCM tag on decryption.
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl SessionCipher {
    /// Create a new SessionCipher from a raw 32-byte key.
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Derive a 32-byte key from a passphrase using Argon2id.
    ///
    /// Uses OWASP recommended parameters:
    /// - 19 MiB memory (19456 KiB)
    /// - 2 iterations
    /// - 1 parallelism degree
    pub fn from_passphrase(passphrase: &str) -> Result<Self, CipherError> {
        use argon2::{Algorithm, Argon2, Params, Version};

        let params = Params::new(19456, 2, 1, Some(KEY_SIZE))
            .map_err(|_| CipherError::KeyDerivationFailed)?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = [0u8; KEY_SIZE];
        argon2
            .hash_password_into(passphrase.as_bytes(), PASSPHRASE_SALT, &mut key)
            .map_err(|_| CipherError::KeyDerivationFailed)?;

        Ok(Self::new(&key))
    }

    /// Encrypt plaintext using AES-256-GCM with a random nonce.
    ///
    /// Returns `nonce (12 bytes) || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt data produced by `encrypt()`.
    ///
    /// Fails on a wrong key, truncation, or any modified byte.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CipherError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CipherError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; KEY_SIZE] {
        // Deterministic key for testing only
        let mut key = [0u8; KEY_SIZE];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = SessionCipher::new(&test_key());
        let plaintext = br#"{"user_id":"user123","history":[]}"#;

        let encrypted = cipher.encrypt(plaintext).unwrap();
        let decrypted = cipher.decrypt(&encrypted).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let cipher1 = SessionCipher::new(&test_key());
        let mut wrong_key = test_key();
        wrong_key[0] = 0xFF;
        let cipher2 = SessionCipher::new(&wrong_key);

        let encrypted = cipher1.encrypt(b"session data").unwrap();
        let result = cipher2.decrypt(&encrypted);

        assert!(matches!(result.unwrap_err(), CipherError::DecryptionFailed));
    }

    #[test]
    fn test_every_flipped_byte_is_detected() {
        let cipher = SessionCipher::new(&test_key());
        let encrypted = cipher.encrypt(b"hello, tamper detection").unwrap();

        for i in 0..encrypted.len() {
            let mut tampered = encrypted.clone();
            tampered[i] ^= 0x01;
            assert!(cipher.decrypt(&tampered).is_err(), "byte {i} flip went unnoticed");
        }
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let cipher = SessionCipher::new(&test_key());
        let encrypted = cipher.encrypt(b"some context").unwrap();

        let result = cipher.decrypt(&encrypted[..encrypted.len() - 1]);
        assert!(matches!(result.unwrap_err(), CipherError::DecryptionFailed));

        let result = cipher.decrypt(&[0u8; 5]);
        assert!(matches!(result.unwrap_err(), CipherError::CiphertextTooShort));
    }

    #[test]
    fn test_random_nonce_produces_different_ciphertexts() {
        let cipher = SessionCipher::new(&test_key());
        let encrypted1 = cipher.encrypt(b"same plaintext").unwrap();
        let encrypted2 = cipher.encrypt(b"same plaintext").unwrap();

        assert_ne!(encrypted1, encrypted2);
        assert_eq!(cipher.decrypt(&encrypted1).unwrap(), b"same plaintext");
        assert_eq!(cipher.decrypt(&encrypted2).unwrap(), b"same plaintext");
    }

    #[test]
    fn test_from_passphrase_is_deterministic() {
        let cipher1 = SessionCipher::from_passphrase("correct horse battery staple").unwrap();
        let cipher2 = SessionCipher::from_passphrase("correct horse battery staple").unwrap();
        let other = SessionCipher::from_passphrase("another passphrase").unwrap();

        let encrypted = cipher1.encrypt(b"test data").unwrap();
        assert_eq!(cipher2.decrypt(&encrypted).unwrap(), b"test data");
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_cipher_error_never_contains_secrets() {
        let test_secret = "user said something private";
        let errors = [
            CipherError::EncryptionFailed,
            CipherError::DecryptionFailed,
            CipherError::CiphertextTooShort,
            CipherError::KeyDerivationFailed,
        ];

        for err in &errors {
            let msg = err.to_string();
            assert!(!msg.contains(test_secret), "Error leaks plaintext: {msg}");
        }
    }
}
