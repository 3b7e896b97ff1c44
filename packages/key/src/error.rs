//! Error handling for key container loading

use thiserror::Error;

/// Key container errors
#[derive(Debug, Error)]
pub enum KeyError {
    /// Container text is malformed: bad magic, unknown field, bad line
    /// syntax, or a value of the wrong length or content
    #[error("Invalid key format: {0}")]
    InvalidFormat(String),

    /// A fully parsed record does not describe a usable key
    #[error("Inconsistent key record: {0}")]
    Inconsistent(String),

    /// Password declined, password buffer overrun, or checksum mismatch
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An encrypted key was loaded without a password source
    #[error("A password source is required for an encrypted key")]
    PasswordRequired,

    /// Key derivation error occurred
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Secure buffer could not be allocated
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`KeyError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Parsing failed
    Format,
    /// Sanity check failed
    Consistency,
    /// Password or integrity check failed
    Authentication,
    /// Caller did not supply what the key requires
    Configuration,
    /// Memory could not be allocated
    Allocation,
    /// Reading the container failed
    Io,
}

impl KeyError {
    /// Create an `InvalidFormat` error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create an `Inconsistent` error
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::Inconsistent(msg.into())
    }

    /// Create an `Authentication` error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat(_) => ErrorKind::Format,
            Self::Inconsistent(_) => ErrorKind::Consistency,
            Self::Authentication(_) | Self::KeyDerivation(_) => ErrorKind::Authentication,
            Self::PasswordRequired => ErrorKind::Configuration,
            Self::Allocation(_) => ErrorKind::Allocation,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type for key operations
pub type Result<T> = std::result::Result<T, KeyError>;
