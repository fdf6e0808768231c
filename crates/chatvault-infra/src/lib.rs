//! Infrastructure layer for chatvault.
//!
//! Contains implementations of the ports defined in `chatvault-core`:
//! the encrypted JSON codec, the file-backed session store, key material
//! resolution and the TOML configuration loader.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod filesystem;
