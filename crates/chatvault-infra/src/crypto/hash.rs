//! SHA-256 digests used to derive file names from arbitrary user ids.

use sha2::{Digest, Sha256};

/// Lowercase hex-encoded SHA-256 digest of `content`.
pub fn sha256_hex(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{:x}", digest)
}
