use std::fmt;

use thiserror::Error;

/// Errors from turning a context into a persisted blob and back.
///
/// Display output never contains plaintext, key material, or ciphertext.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The plaintext did not parse into the expected schema.
    #[error("malformed session content: {0}")]
    Format(String),

    /// Encryption failed, or decryption/authentication rejected the blob.
    #[error("session blob failed authentication")]
    Crypto,
}

/// Errors from the durable slot. A missing slot is not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Errors surfaced by the session controller.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("malformed session content: {0}")]
    Format(String),

    #[error("session blob failed authentication")]
    Crypto,

    #[error("storage unavailable: {0}")]
    Io(String),

    #[error("session is closed")]
    SessionClosed,

    #[error("session context has not been loaded")]
    NotLoaded,
}

impl ContextError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContextError::Format(_) => ErrorKind::Format,
            ContextError::Crypto => ErrorKind::Crypto,
            ContextError::Io(_) => ErrorKind::Io,
            ContextError::SessionClosed => ErrorKind::SessionClosed,
            ContextError::NotLoaded => ErrorKind::NotLoaded,
        }
    }
}

impl From<CodecError> for ContextError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Format(msg) => ContextError::Format(msg),
            CodecError::Crypto => ContextError::Crypto,
        }
    }
}

impl From<StoreError> for ContextError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(msg) => ContextError::Io(msg),
        }
    }
}

/// Failure kind of a [`ContextError`], used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    Crypto,
    Io,
    SessionClosed,
    NotLoaded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Format => write!(f, "format"),
            ErrorKind::Crypto => write!(f, "crypto"),
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::SessionClosed => write!(f, "session_closed"),
            ErrorKind::NotLoaded => write!(f, "not_loaded"),
        }
    }
}
