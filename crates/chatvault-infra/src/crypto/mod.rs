//! Cryptographic operations for chatvault.
//!
//! - `cipher`: AES-256-GCM encryption for session blobs at rest
//! - `key`: key material resolution (hex key or Argon2id passphrase)
//! - `hash`: SHA-256 digests for slot file names

pub mod cipher;
pub mod hash;
pub mod key;
